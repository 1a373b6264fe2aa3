//! Error types for prediction persistence.
//!
//! Every failure carries an [`ErrorContext`] naming the operation that failed
//! and, once a [`RetryPolicy`](super::RetryPolicy) gave up, how many attempts
//! were made. The weekly flush logs this when a batch is discarded.

use std::fmt;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Repository operation, e.g. `insert_many`.
    pub operation: Option<String>,
    pub details: Option<String>,
    /// Attempts made before giving up. `None` when no retry policy ran.
    pub attempts: Option<u32>,
    pub retryable: bool,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(op) = &self.operation {
            parts.push(format!("op={op}"));
        }
        if let Some(attempts) = self.attempts {
            parts.push(format!("attempts={attempts}"));
        }
        if let Some(details) = &self.details {
            parts.push(details.clone());
        }
        if self.retryable {
            parts.push("retryable".to_string());
        }
        if parts.is_empty() {
            Ok(())
        } else {
            write!(f, " [{}]", parts.join(", "))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Pool checkout or connection loss. Always retryable.
    #[error("Connection error: {message}{context}")]
    Connection {
        message: String,
        context: ErrorContext,
    },

    #[error("Query error: {message}{context}")]
    Query {
        message: String,
        context: ErrorContext,
    },

    /// A prediction that cannot be represented in storage.
    #[error("Invalid prediction: {message}{context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Internal error: {message}{context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: ErrorContext {
                retryable: true,
                ..Default::default()
            },
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Query { context, .. }
            | Self::Validation { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Query { context, .. }
            | Self::Validation { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Tag the error with the repository operation that raised it. An
    /// operation set closer to the failure is kept.
    pub fn in_operation(mut self, operation: &str) -> Self {
        let context = self.context_mut();
        if context.operation.is_none() {
            context.operation = Some(operation.to_string());
        }
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.context_mut().details = Some(details.into());
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.context_mut().attempts = Some(attempts);
        self
    }

    #[cfg(feature = "postgres-repo")]
    fn mark_retryable(mut self) -> Self {
        self.context_mut().retryable = true;
        self
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::DatabaseError(kind, info) => {
                let error = RepositoryError::query(info.message())
                    .with_details(format!("kind={kind:?}"));
                match kind {
                    DatabaseErrorKind::SerializationFailure | DatabaseErrorKind::ClosedConnection => {
                        error.mark_retryable()
                    }
                    _ => error,
                }
            }
            Error::DeserializationError(e) | Error::SerializationError(e) => {
                RepositoryError::internal(format!("Row conversion failed: {e}"))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::connection(err.to_string()).with_details("pool checkout")
    }
}
