use lazy_static::lazy_static;
use tera::Tera;

pub mod cli;
pub mod config;
pub mod error;
pub mod paths;
#[cfg(test)]
mod tests;
pub mod verilog;

pub use error::{Error, Result};

pub const BUILD_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/build");

pub const WRAPPER_TEMPLATE: &str = "pcie_tlp_demux_bar_wrap.v";

lazy_static! {
    pub static ref TEMPLATES: std::result::Result<Tera, tera::Error> = {
        let mut tera = Tera::default();
        tera.add_raw_template(
            WRAPPER_TEMPLATE,
            include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/templates/pcie_tlp_demux_bar_wrap.v"
            )),
        )
        .map(|_| tera)
    };
}

/// Number of bits needed to index `x` distinct values.
///
/// Equal to the bit length of `x - 1`, so `clog2(1) == 0`.
#[inline]
pub fn clog2(x: usize) -> usize {
    (usize::BITS - x.saturating_sub(1).leading_zeros()) as usize
}
