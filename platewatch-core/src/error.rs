use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Post store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Failures of the tracked-handle registry's backing store.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("Invalid handle: {handle}")]
    InvalidHandle { handle: String },

    #[error("Database locked")]
    DatabaseLocked,

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Failures of a post store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Post store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Malformed post record: {details}")]
    MalformedRecord { details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
