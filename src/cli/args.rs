use clap::Parser;
use std::path::PathBuf;

use crate::config::WrapperConfig;

/// Generates a PCIe TLP BAR demux wrapper with the specified number of ports.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about,
    help_template(
        "{before-help}{name} {version}\n{author-with-newline}{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
    )
)]
pub struct Args {
    /// Number of output ports [default: 4].
    #[arg(short, long)]
    pub ports: Option<usize>,

    /// Module name [default: pcie_tlp_demux_bar_wrap_<PORTS>].
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output file name [default: <NAME>.v].
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> WrapperConfig {
        WrapperConfig {
            ports: self.ports,
            name: self.name.clone(),
            output: self.output.clone(),
        }
    }
}
