use thiserror::Error;

use crate::api::ApiError;
use crate::bidding::GateError;
use crate::utils::AmountParseError;

/// Broad class of a failure, used to pick log level and wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    LockConflict,
    Unauthenticated,
    Forbidden,
    Stale,
    Network,
}

/// Every failure a console action can end in
///
/// None of these are fatal: the action is abandoned, local state stays as it
/// was, and the message is shown to the user.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Amount(#[from] AmountParseError),

    #[error("Only admins can {0}.")]
    Forbidden(&'static str),

    #[error("No player with id '{0}'.")]
    UnknownPlayer(String),

    #[error("A bid is already being submitted. Please wait for it to finish.")]
    BidInFlight,

    /// The service turned down a bid we believed valid; local state was re-synced
    #[error("{message}")]
    Rejected { message: String },

    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ConsoleError {
    /// Wrap a service failure, preferring the server's own message
    pub fn api(fallback: &str, source: ApiError) -> Self {
        let message = source
            .server_message()
            .unwrap_or(fallback)
            .to_string();
        ConsoleError::Api { message, source }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Gate(GateError::Unauthenticated) => ErrorKind::Unauthenticated,
            ConsoleError::Gate(GateError::LockConflict { .. }) => ErrorKind::LockConflict,
            ConsoleError::Gate(_) => ErrorKind::Forbidden,
            ConsoleError::Validation(_)
            | ConsoleError::Amount(_)
            | ConsoleError::UnknownPlayer(_)
            | ConsoleError::BidInFlight => ErrorKind::Validation,
            ConsoleError::Forbidden(_) => ErrorKind::Forbidden,
            ConsoleError::Rejected { .. } => ErrorKind::Stale,
            ConsoleError::Api { .. } => ErrorKind::Network,
        }
    }
}
