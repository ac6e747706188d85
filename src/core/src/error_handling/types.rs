use std::fmt;

/// Outcomes of the core operations that are reported back to the caller.
///
/// None of these are retried internally: the HTTP boundary turns each one
/// into a status code plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffError {
    /// No credential was supplied at all.
    AuthMissing,
    /// A credential was supplied but does not match.
    AuthInvalid,
    /// A required field is absent or empty. Holds the field description.
    ValidationError(String),
    /// Submission attempted while a previous item awaits acknowledgement.
    StateConflict,
    /// Read on an empty queue.
    NotFound,
    /// An upload could not be decoded.
    ProcessingError(String),
}

impl fmt::Display for HandoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffError::AuthMissing => write!(f, "Missing key parameter"),
            HandoffError::AuthInvalid => write!(f, "Invalid key"),
            HandoffError::ValidationError(e) => write!(f, "Missing {}", e),
            HandoffError::StateConflict => {
                write!(f, "Submission locked. Wait for typing acknowledgement.")
            }
            HandoffError::NotFound => write!(f, "No content available"),
            HandoffError::ProcessingError(e) => write!(f, "Processing error: {}", e),
        }
    }
}

impl std::error::Error for HandoffError {}

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid configuration value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    WebError(WebError),
    InitializationFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
            ControllerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<WebError> for ControllerError {
    fn from(err: WebError) -> Self {
        ControllerError::WebError(err)
    }
}
