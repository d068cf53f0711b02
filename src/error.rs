pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration for `{field}`: {reason}")]
    Config { field: &'static str, reason: String },

    #[error("simulation already started")]
    AlreadyStarted,

    #[error("simulation has not been set up")]
    NotSetUp,

    #[error("thread spawn failed: {0}")]
    Spawn(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Error::Config {
            field,
            reason: reason.into(),
        }
    }

    pub fn spawn<S: Into<String>>(msg: S) -> Self {
        Error::Spawn(msg.into())
    }

    pub fn export<S: Into<String>>(msg: S) -> Self {
        Error::Export(msg.into())
    }

    /// Name of the offending configuration field, if this is a config error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::Config { field, .. } => Some(field),
            _ => None,
        }
    }
}
