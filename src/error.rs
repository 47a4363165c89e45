use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("vault root does not exist: {0}")]
    VaultNotFound(PathBuf),

    #[error("vault root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan vault: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("no node at vault path: {0}")]
    UnknownNode(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("snapshot json error: {0}")]
    SnapshotJson(#[from] serde_json::Error),

    #[error("config toml parse error: {0}")]
    ConfigToml(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Expected outcome of a path lookup that found nothing.
///
/// The resolver treats both variants as "try the next strategy"; they only
/// surface to users as a broken link once every strategy is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no child named {segment:?}")]
    NotFound { segment: String },

    #[error("cannot traverse above the vault root")]
    NoParent,
}
