use std::path::PathBuf;

use thiserror::Error;

use crate::verilog::MAX_PORTS;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid port count {0} (expected 1 to {})", MAX_PORTS)]
    InvalidPortCount(usize),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to load templates: {0}")]
    TemplateLoad(String),
}

pub type Result<T> = std::result::Result<T, Error>;
