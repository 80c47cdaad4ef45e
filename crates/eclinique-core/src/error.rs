//! Client error taxonomy.

use std::fmt;

use thiserror::Error;

use crate::db::DbError;

/// One failed form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Per-field validation failures collected before any network call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when nothing failed, otherwise a validation error.
    pub fn into_result<T>(self, value: T) -> ClientResult<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ClientError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Errors surfaced to the UI layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Local form validation failed; nothing was sent.
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    /// No token locally, or the backend answered 401/403.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request could not be sent or the response not received.
    #[error("Network failure: {0}")]
    Network(String),

    /// Any other non-success reply.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Local session storage failed.
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Text suitable for an alert.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors
                .iter()
                .next()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "All fields must be filled in.".to_string()),
            ClientError::Unauthorized(message) => message.clone(),
            ClientError::Network(_) => "Unable to reach the server.".to_string(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Storage(_) => "Unable to access local storage.".to_string(),
        }
    }
}

impl From<DbError> for ClientError {
    fn from(e: DbError) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClientError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClientError::Storage(format!("Lock poisoned: {}", e))
    }
}
