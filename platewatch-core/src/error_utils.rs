use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Registry(e) => {
                error!("Registry error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Post store error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Registry(e) => e.is_retryable(),
            CoreError::Store(e) => e.is_retryable(),
            CoreError::Io(_) => true,
            _ => false,
        }
    }
}

impl RegistryError {
    pub fn is_retryable(&self) -> bool {
        match self {
            RegistryError::DatabaseLocked => true,
            RegistryError::ConnectionFailed { .. } => true,
            RegistryError::Sql(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            // Migration and handle errors are permanent
            RegistryError::MigrationFailed { .. } => false,
            RegistryError::InvalidHandle { .. } => false,
        }
    }
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Unavailable { .. } => true,
            StoreError::MalformedRecord { .. } => false,
        }
    }
}
