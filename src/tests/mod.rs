use std::path::PathBuf;

use crate::BUILD_PATH;


pub(crate) fn test_verilog_path(name: &str) -> PathBuf {
    PathBuf::from(BUILD_PATH).join(format!("verilog/{}.v", name))
}

/// Positions of every occurrence of `pat` in `s`.
pub(crate) fn positions(s: &str, pat: &str) -> Vec<usize> {
    s.match_indices(pat).map(|(i, _)| i).collect()
}
