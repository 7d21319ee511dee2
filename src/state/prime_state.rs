//! Outcome definitions for priming a single URL
use std::fmt;

/// What happened when a URL was primed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimeOutcome {
    /// A cached artifact already exists locally; no request was made
    CacheHit,

    /// The page was requested and answered with 200
    Primed { status: u16 },

    /// The page was requested but answered with a non-200 status
    BadStatus { status: u16 },

    /// The request failed at the transport level
    Failed { error: String },

    /// The uncached-page limit was reached before this page was requested
    NotAttempted,
}

impl PrimeOutcome {
    /// Returns true if a network request was issued for the page
    ///
    /// Every such request counts toward the uncached-page limit, whether or
    /// not it succeeded.
    pub fn is_network_attempt(&self) -> bool {
        matches!(
            self,
            Self::Primed { .. } | Self::BadStatus { .. } | Self::Failed { .. }
        )
    }

    /// Returns true if the page was requested but not primed successfully
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::BadStatus { .. } | Self::Failed { .. })
    }

    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Primed { status } | Self::BadStatus { status } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for PrimeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheHit => write!(f, "cached"),
            Self::Primed { status } => write!(f, "primed ({})", status),
            Self::BadStatus { status } => write!(f, "bad response ({})", status),
            Self::Failed { error } => write!(f, "failed: {}", error),
            Self::NotAttempted => write!(f, "not attempted"),
        }
    }
}
