//! Option names shared by the host configuration and the adapters.
//!
//! Adapters read their options from a string-keyed mapping; keeping the names
//! here means the env loader and the validators cannot drift apart.

pub const ACCESS_KEY_ID: &str = "accessKeyId";
pub const SECRET_ACCESS_KEY: &str = "secretAccessKey";
pub const REGION: &str = "region";
pub const BUCKET: &str = "bucket";
pub const EXPIRATION: &str = "expiration";
pub const ENDPOINT: &str = "endpoint";
pub const TIMEOUT: &str = "timeout";

pub const LOCAL_DIR: &str = "localDir";
pub const WEB_DIR: &str = "webDir";
