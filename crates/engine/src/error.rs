//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a target or referenced entity does not exist.
//! - [`Validation`] thrown when an input breaks a domain rule.
//! - [`Conflict`] thrown on unique-name collisions and on deletes blocked by
//!   existing references.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`Validation`]: EngineError::Validation
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Carries the entity label, e.g. `"Bank account"`.
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn not_found(entity: &str) -> Self {
        Self::NotFound(entity.to_string())
    }

    pub(crate) fn validation(rule: impl Into<String>) -> Self {
        Self::Validation(rule.into())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
