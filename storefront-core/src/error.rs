//! Error types for storefront operations

use crate::ItemId;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field-level validation errors raised by item setters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value {value} for {field} is out of range: {reason}")]
    OutOfRange {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid format for {field}: \"{value}\" (expected {expected})")]
    InvalidFormat {
        field: String,
        value: String,
        expected: String,
    },

    #[error("ID of {field} can't be changed from {old} to {new}")]
    IdChange {
        field: String,
        old: ItemId,
        new: ItemId,
    },
}

/// Raised when a collaborator of the wrong kind is handed to a hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Object is not of required type \"{expected}\"")]
pub struct TypeError {
    pub expected: String,
}

/// A referenced entity or list entry is missing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Item {id} not found in domain {domain}")]
    Item { domain: String, id: ItemId },

    #[error("List item for removal not found in domain {domain}")]
    ListItem { domain: String },

    #[error("No product at basket position {position}")]
    Position { position: usize },
}

/// Reason codes per domain, keyed by basket position.
pub type ReasonMap = BTreeMap<String, BTreeMap<usize, String>>;

/// Aggregated availability failures of a basket check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AvailabilityError {
    pub message: String,
    pub codes: ReasonMap,
}

impl AvailabilityError {
    pub fn new(message: impl Into<String>, codes: ReasonMap) -> Self {
        Self {
            message: message.into(),
            codes,
        }
    }

    /// Reason code recorded for a position of a domain, if any.
    pub fn code(&self, domain: &str, position: usize) -> Option<&str> {
        self.codes
            .get(domain)
            .and_then(|list| list.get(&position))
            .map(String::as_str)
    }
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Item not found: {domain} with id {id}")]
    NotFound { domain: String, id: ItemId },

    #[error("Insert failed for {domain}: {reason}")]
    InsertFailed { domain: String, reason: String },

    #[error("No open transaction on {domain} manager")]
    NoTransaction { domain: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Basket state errors raised by the order base itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Basket doesn't contain any products")]
    EmptyBasket,

    #[error("Product at position {position} is immutable")]
    Immutable { position: usize },
}

/// Master error type for all storefront domain errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Availability error: {0}")]
    Availability(#[from] AvailabilityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),
}

/// Result type alias for storefront operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// TESTS
// =============================================================================
