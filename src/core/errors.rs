use thiserror::Error;

/// Main error type for dockconsole
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Container runtime errors
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Rejected user input
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// UI errors
    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General errors
    #[error("{0}")]
    Other(String),
}

/// Errors returned by the container runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The daemon could not be reached or the connection broke mid-call
    #[error("Failed to reach the container runtime: {0}")]
    Transport(String),

    /// The daemon answered with an error status
    #[error("HTTP Error {status}: {explanation}")]
    Api { status: u16, explanation: String },
}

impl RuntimeError {
    /// Title used for the message dialog reporting this error
    pub fn dialog_title(&self) -> String {
        match self {
            RuntimeError::Transport(_) => "Connection Error".to_string(),
            RuntimeError::Api { status, .. } => format!("HTTP Error: {}", status),
        }
    }

    /// Human-readable explanation, without the status prefix
    pub fn explanation(&self) -> &str {
        match self {
            RuntimeError::Transport(msg) => msg,
            RuntimeError::Api { explanation, .. } => explanation,
        }
    }
}

impl From<bollard::errors::Error> for RuntimeError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => RuntimeError::Api {
                status: status_code,
                explanation: message,
            },
            other => RuntimeError::Transport(other.to_string()),
        }
    }
}

/// Input rejected before any runtime call is issued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a new name is required")]
    EmptyName,

    #[error("names cannot contain whitespace: {0:?}")]
    InvalidName(String),

    #[error("a repository name is required")]
    EmptyRepository,

    #[error("invalid reference {0:?}")]
    InvalidReference(String),
}

/// UI-related errors
#[derive(Error, Debug)]
pub enum UiError {
    /// Unknown key or event in a binding table
    #[error("Invalid key binding: {0}")]
    Binding(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Parse errors
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Validation errors
    #[error("Configuration validation failed: {0}")]
    Validation(String),

    /// File not found
    #[error("Configuration file not found: {0}")]
    NotFound(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl ConsoleError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsoleError::Runtime(RuntimeError::Transport(_)))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Runtime(RuntimeError::Transport(_)) => {
                "Could not reach the Docker daemon. Please ensure Docker is running.".to_string()
            }
            ConsoleError::Runtime(RuntimeError::Api { explanation, .. }) => explanation.clone(),
            ConsoleError::Config(ConfigError::NotFound(_)) => {
                "Configuration file not found. Using defaults.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(err: toml::de::Error) -> Self {
        ConsoleError::Config(ConfigError::Parse(err.to_string()))
    }
}

impl From<toml::ser::Error> for ConsoleError {
    fn from(err: toml::ser::Error) -> Self {
        ConsoleError::Config(ConfigError::Parse(err.to_string()))
    }
}
