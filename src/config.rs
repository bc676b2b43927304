use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::verilog::{WrapperParams, DEFAULT_PORTS};
use crate::Result;

/// Wrapper settings read from a TOML file.
///
/// Every key is optional; missing keys fall back to the command line or the
/// built-in defaults.
#[derive(Debug, Default, Eq, PartialEq, Clone, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrapperConfig {
    pub ports: Option<usize>,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
}

impl WrapperConfig {
    /// Fills any unset field of `self` from `fallback`.
    pub fn or(self, fallback: WrapperConfig) -> WrapperConfig {
        WrapperConfig {
            ports: self.ports.or(fallback.ports),
            name: self.name.or(fallback.name),
            output: self.output.or(fallback.output),
        }
    }

    pub fn into_params(self) -> WrapperParams {
        WrapperParams {
            ports: self.ports.unwrap_or(DEFAULT_PORTS),
            name: self.name,
            output: self.output,
        }
    }
}

pub fn parse_wrapper_config(path: impl AsRef<Path>) -> Result<WrapperConfig> {
    let contents = fs::read_to_string(path)?;
    let data = toml::from_str(&contents)?;
    Ok(data)
}
