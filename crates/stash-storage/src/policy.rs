//! Access-control policy derived from the expiration option.
//!
//! S3 has no notion of a temporary public link: time-limited access is granted
//! with a presigned URL, and objects meant for that must not also be publicly
//! readable. Visibility and expiration are therefore one decision.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::NonZeroU32;
use std::time::Duration;

/// Canned ACL attached to an object at write time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectAcl {
    PublicRead,
    Private,
}

impl ObjectAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::PublicRead => "public-read",
            ObjectAcl::Private => "private",
        }
    }
}

impl Display for ObjectAcl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// How stored objects are exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Publicly readable, canonical URL, no expiry
    Public,
    /// Private; URIs are presigned and valid for `expires_in` minutes
    Private { expires_in: NonZeroU32 },
}

impl AccessPolicy {
    /// Policy for an expiration given in minutes, where 0 means "never expires".
    pub fn from_expiration(minutes: u32) -> Self {
        match NonZeroU32::new(minutes) {
            Some(expires_in) => AccessPolicy::Private { expires_in },
            None => AccessPolicy::Public,
        }
    }

    pub fn acl(&self) -> ObjectAcl {
        match self {
            AccessPolicy::Public => ObjectAcl::PublicRead,
            AccessPolicy::Private { .. } => ObjectAcl::Private,
        }
    }

    /// Expiration in minutes, 0 for public objects
    pub fn expiration(&self) -> u32 {
        match self {
            AccessPolicy::Public => 0,
            AccessPolicy::Private { expires_in } => expires_in.get(),
        }
    }

    /// Lifetime of a presigned URL, `None` for public objects
    pub fn url_ttl(&self) -> Option<Duration> {
        match self {
            AccessPolicy::Public => None,
            AccessPolicy::Private { expires_in } => {
                Some(Duration::from_secs(u64::from(expires_in.get()) * 60))
            }
        }
    }
}
