use std::fmt;

/// Failures of the font/image collaborators.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("font `{0}` could not be resolved")]
    UnknownFont(String),
    #[error("image `{0}` could not be resolved")]
    UnresolvedImage(String),
    #[error("malformed data url")]
    InvalidDataUrl,
    #[error("image decode failed: {0}")]
    Decode(String),
}

/// Reported, non-fatal failures. The scene is left as it was.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("cannot mask `{name}`: {reason}")]
    MaskSource { name: String, reason: String },
    #[error("an object named `{0}` already exists")]
    DuplicateName(String),
    #[error("no object named `{0}`")]
    UnknownObject(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Degradations the user should hear about while the edit still went through
/// (or was dropped for a single object of a batch).
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    FontFallback { requested: String, fallback: String },
    ImageUnavailable { source: String, reason: String },
    MaskSource { name: String, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::FontFallback { requested, fallback } => write!(f, "font `{}` unavailable, using `{}`", requested, fallback),
            Warning::ImageUnavailable { source, reason } => write!(f, "image `{}` unavailable: {}", source, reason),
            Warning::MaskSource { name, reason } => write!(f, "cannot mask `{}`: {}", name, reason),
        }
    }
}
