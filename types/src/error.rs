//! Errors raised while constructing or decoding core types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid proposal status code: {0}")]
    InvalidStatus(u8),

    #[error("voter id must not be empty")]
    InvalidVoterId,
}
