//! The module contains the error the engine can throw.
//!
//! The errors fall in a few families:
//!
//! - input errors ([`InvalidId`], [`InvalidAmount`], [`InvalidMember`]) thrown
//!   when a request carries malformed data.
//! - [`NoParticipants`] thrown when an event has no member to split costs
//!   between.
//! - [`Consistency`] thrown when the balances of an event do not net to zero
//!   and no transfer plan can be trusted.
//! - state errors ([`InvalidState`], [`InvalidTransition`]) thrown when an
//!   event or a transfer is not in a state that allows the operation.
//!
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidMember`]: EngineError::InvalidMember
//!  [`NoParticipants`]: EngineError::NoParticipants
//!  [`Consistency`]: EngineError::Consistency
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`InvalidTransition`]: EngineError::InvalidTransition
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid member: {0}")]
    InvalidMember(String),
    #[error("No participants: {0}")]
    NoParticipants(String),
    #[error("Inconsistent balances: {0}")]
    Consistency(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidMember(a), Self::InvalidMember(b)) => a == b,
            (Self::NoParticipants(a), Self::NoParticipants(b)) => a == b,
            (Self::Consistency(a), Self::Consistency(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
