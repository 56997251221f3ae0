use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generative service has no credential to work with.
    #[error("no API key found in environment (set one of {})", .vars.join(", "))]
    MissingCredential { vars: Vec<&'static str> },

    #[error("generative service failed: {0}")]
    Collaborator(String),

    #[error("generative service request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
