pub type DiagramResult<T> = Result<T, DiagramError>;

#[derive(thiserror::Error, Debug)]
pub enum DiagramError {
    #[error("config error: {field}: {message}")]
    Config {
        field: &'static str,
        message: String,
    },

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DiagramError {
    pub fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Config {
            field,
            message: message.into(),
        }
    }

    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Name of the offending configuration field, if this is a config error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Config { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DiagramError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}
