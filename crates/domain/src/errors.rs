use thiserror::Error;

/// Errors surfaced by the resolution core.
///
/// `Clone` is required: a deduplicated wire request hands the same outcome to
/// every caller that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Query timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Question section mismatch: expected '{expected}', got '{actual}'")]
    ProtocolMismatch { expected: String, actual: String },

    #[error("Invalid DNS response: {0}")]
    Protocol(String),

    #[error("Remote server failure")]
    ServerFailure,

    #[error("No usable name server left")]
    NoUsableNameServer,

    #[error("CNAME chain exceeds {0} hops")]
    CnameChainTooLong(usize),

    #[error("Delegation exceeds {0} referrals")]
    ReferralLimitExceeded(usize),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid name server address: {0}")]
    InvalidAddress(String),

    /// Internal marker for an abandoned query. The public entry points turn it
    /// into `Ok(None)` and never return it.
    #[error("Query cancelled")]
    Cancelled,
}

impl ResolveError {
    /// Per-address failures that demote the server and move on to the next
    /// candidate.
    pub fn is_server_failure(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Transport(_) | Self::ProtocolMismatch { .. } | Self::ServerFailure
        )
    }
}
