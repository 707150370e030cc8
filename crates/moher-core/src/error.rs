use std::path::PathBuf;
use thiserror::Error;

/// Core error type for moher transforms.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bare module \"{name}\" is not resolvable under {dir}")]
    UnresolvedModule { name: String, dir: PathBuf },

    #[error("Component {path} has no template block")]
    MissingTemplate { path: PathBuf },

    #[error("Component parse error: {0}")]
    Parse(String),

    #[error("Template compile error: {0}")]
    TemplateCompile(String),
}

impl Error {
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    #[must_use]
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::TemplateCompile(msg.into())
    }
}
