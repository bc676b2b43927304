use std::path::{Path, PathBuf};

/// Module name prefix used when no name is given.
pub const MODULE_NAME_PREFIX: &str = "pcie_tlp_demux_bar_wrap";

pub fn default_module_name(ports: usize) -> String {
    format!("{MODULE_NAME_PREFIX}_{ports}")
}

pub fn out_verilog(work_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    PathBuf::from(work_dir.as_ref()).join(format!("{name}.v"))
}
