use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tera::Context;

use crate::paths::{default_module_name, out_verilog};
use crate::{clog2, Error, Result, TEMPLATES, WRAPPER_TEMPLATE};

pub const DEFAULT_PORTS: usize = 4;

/// Largest supported port count.
///
/// Port names carry a 2-digit index, so `out99` is the last representable port.
pub const MAX_PORTS: usize = 100;

/// Name of the instantiated demux primitive.
pub const DEMUX_MODULE: &str = "pcie_tlp_demux_bar";

const OUTPUT_PREFIX: &str = "out";
const INPUT_PREFIX: &str = "in";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => f.pad("input"),
            Direction::Output => f.pad("output"),
        }
    }
}

/// One replicated TLP signal, with its direction as seen on an output port.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TlpSignal {
    pub suffix: &'static str,
    pub width: Option<&'static str>,
    pub direction: Direction,
}

const fn output(suffix: &'static str, width: &'static str) -> TlpSignal {
    TlpSignal {
        suffix,
        width: Some(width),
        direction: Direction::Output,
    }
}

/// Signals carried by every TLP port, in declaration order.
pub const TLP_SIGNALS: [TlpSignal; 11] = [
    output("data", "[TLP_DATA_WIDTH-1:0]"),
    output("strb", "[TLP_STRB_WIDTH-1:0]"),
    output("hdr", "[TLP_SEG_COUNT*TLP_HDR_WIDTH-1:0]"),
    output("seq", "[TLP_SEG_COUNT*SEQ_NUM_WIDTH-1:0]"),
    output("bar_id", "[TLP_SEG_COUNT*3-1:0]"),
    output("func_num", "[TLP_SEG_COUNT*8-1:0]"),
    output("error", "[TLP_SEG_COUNT*4-1:0]"),
    output("valid", "[TLP_SEG_COUNT-1:0]"),
    output("sop", "[TLP_SEG_COUNT-1:0]"),
    output("eop", "[TLP_SEG_COUNT-1:0]"),
    TlpSignal {
        suffix: "ready",
        width: None,
        direction: Direction::Input,
    },
];

impl TlpSignal {
    pub fn name(&self, prefix: &str) -> String {
        format!("{prefix}_tlp_{}", self.suffix)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Builder, Serialize, Deserialize)]
#[builder(derive(Debug))]
pub struct WrapperParams {
    #[builder(default = "DEFAULT_PORTS")]
    pub ports: usize,
    /// Module name; defaults to [`default_module_name`].
    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,
    /// Output file; defaults to `<module name>.v`.
    #[builder(default, setter(into, strip_option))]
    pub output: Option<PathBuf>,
}

impl WrapperParams {
    #[inline]
    pub fn new(ports: usize) -> Self {
        Self {
            ports,
            name: None,
            output: None,
        }
    }

    #[inline]
    pub fn builder() -> WrapperParamsBuilder {
        WrapperParamsBuilder::default()
    }

    pub fn module_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| default_module_name(self.ports))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| out_verilog("", &self.module_name()))
    }

    /// Number of bits needed to select one of the output ports.
    #[inline]
    pub fn cn(&self) -> usize {
        clog2(self.ports)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ports == 0 || self.ports > MAX_PORTS {
            return Err(Error::InvalidPortCount(self.ports));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PortDecl {
    pub name: String,
    /// Column-aligned declaration, without the trailing comma.
    pub decl: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PortGroup {
    pub prefix: String,
    pub ports: Vec<PortDecl>,
}

/// A demux output port driven by the concatenation of every wrapper port.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BusConcat {
    pub port: String,
    pub expr: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WrapperTemplateParams {
    pub module_name: String,
    pub ports: usize,
    pub cn: usize,
    pub demux_module: String,
    pub input: PortGroup,
    pub outputs: Vec<PortGroup>,
    pub concats: Vec<BusConcat>,
}

pub fn port_prefix(index: usize) -> String {
    format!("{OUTPUT_PREFIX}{index:02}")
}

fn declaration(direction: Direction, width: Option<&str>, name: &str) -> String {
    format!("{:<6} wire {:<35}{}", direction, width.unwrap_or_default(), name)
}

pub fn port_group(prefix: impl Into<String>, flip: bool) -> PortGroup {
    let prefix = prefix.into();
    let ports = TLP_SIGNALS
        .iter()
        .map(|signal| {
            let name = signal.name(&prefix);
            let direction = if flip {
                signal.direction.flip()
            } else {
                signal.direction
            };
            PortDecl {
                decl: declaration(direction, signal.width, &name),
                name,
            }
        })
        .collect();
    PortGroup { prefix, ports }
}

/// Concatenates `signal` across all ports, highest index first.
///
/// The first operand of a Verilog concatenation is its most significant slice,
/// so port 0 ends up in the least significant bits.
pub fn concat_expr(ports: usize, signal: &TlpSignal) -> String {
    format!(
        "{{{}}}",
        (0..ports)
            .rev()
            .map(|p| signal.name(&port_prefix(p)))
            .join(", ")
    )
}

pub fn plan_wrapper(params: &WrapperParams) -> Result<WrapperTemplateParams> {
    params.validate()?;

    let ports = params.ports;
    let module_name = params.module_name();
    let cn = params.cn();
    debug!("planning wrapper {module_name} with {ports} ports (cn = {cn})");

    let outputs = (0..ports).map(|p| port_group(port_prefix(p), false)).collect();
    let concats = TLP_SIGNALS
        .iter()
        .map(|signal| BusConcat {
            port: signal.name(OUTPUT_PREFIX),
            expr: concat_expr(ports, signal),
        })
        .collect();

    Ok(WrapperTemplateParams {
        module_name,
        ports,
        cn,
        demux_module: DEMUX_MODULE.to_string(),
        input: port_group(INPUT_PREFIX, true),
        outputs,
        concats,
    })
}

pub fn generate_wrapper_verilog(params: &WrapperParams) -> Result<String> {
    let template_params = plan_wrapper(params)?;

    Ok(TEMPLATES
        .as_ref()
        .map_err(|e| Error::TemplateLoad(e.to_string()))?
        .render(
            WRAPPER_TEMPLATE,
            &Context::from_serialize(template_params)?,
        )?)
}

/// Renders the wrapper and writes it to `path`.
pub fn save_wrapper_verilog(path: impl AsRef<Path>, params: &WrapperParams) -> Result<()> {
    let verilog = generate_wrapper_verilog(params)?;
    let path = path.as_ref();
    write_verilog(path, &verilog)?;
    info!(
        "wrote {} port wrapper {} to {:?}",
        params.ports,
        params.module_name(),
        path
    );
    Ok(())
}

/// Writes `verilog` to `path` through a temporary file in the same directory.
///
/// On failure the temporary file is removed and any existing file at `path` is
/// left as it was.
pub fn write_verilog(path: impl AsRef<Path>, verilog: &str) -> Result<()> {
    let path = path.as_ref();
    let write_failure = |source| Error::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_failure)?;

    let mut file = NamedTempFile::new_in(dir).map_err(write_failure)?;
    file.write_all(verilog.as_bytes()).map_err(write_failure)?;
    file.flush().map_err(write_failure)?;
    file.as_file().sync_all().map_err(write_failure)?;
    file.persist(path).map_err(|e| write_failure(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_prefix() {
        assert_eq!(port_prefix(0), "out00");
        assert_eq!(port_prefix(3), "out03");
        assert_eq!(port_prefix(42), "out42");
        assert_eq!(port_prefix(99), "out99");
    }

    #[test]
    fn test_signal_order() {
        let suffixes = TLP_SIGNALS.iter().map(|s| s.suffix).collect::<Vec<_>>();
        assert_eq!(
            suffixes,
            [
                "data", "strb", "hdr", "seq", "bar_id", "func_num", "error", "valid", "sop",
                "eop", "ready"
            ]
        );
        assert!(TLP_SIGNALS[..10]
            .iter()
            .all(|s| s.direction == Direction::Output));
        assert_eq!(TLP_SIGNALS[10].direction, Direction::Input);
    }

    #[test]
    fn test_declaration_alignment() {
        let group = port_group(port_prefix(3), false);
        assert_eq!(
            group.ports[0].decl,
            "output wire [TLP_DATA_WIDTH-1:0]               out03_tlp_data"
        );
        assert_eq!(
            group.ports[2].decl,
            "output wire [TLP_SEG_COUNT*TLP_HDR_WIDTH-1:0]  out03_tlp_hdr"
        );
        assert_eq!(
            group.ports[10].decl,
            "input  wire                                    out03_tlp_ready"
        );
    }

    #[test]
    fn test_input_group_is_flipped() {
        let group = port_group(INPUT_PREFIX, true);
        assert_eq!(group.ports[0].name, "in_tlp_data");
        assert!(group.ports[0].decl.starts_with("input  wire "));
        assert_eq!(group.ports[10].name, "in_tlp_ready");
        assert_eq!(
            group.ports[10].decl,
            "output wire                                    in_tlp_ready"
        );
    }

    #[test]
    fn test_concat_expr_descending() {
        let strb = &TLP_SIGNALS[1];
        assert_eq!(
            concat_expr(4, strb),
            "{out03_tlp_strb, out02_tlp_strb, out01_tlp_strb, out00_tlp_strb}"
        );
        assert_eq!(concat_expr(1, strb), "{out00_tlp_strb}");
    }

    #[test]
    fn test_default_names() {
        let params = WrapperParams::new(8);
        assert_eq!(params.module_name(), "pcie_tlp_demux_bar_wrap_8");
        assert_eq!(
            params.output_path(),
            PathBuf::from("pcie_tlp_demux_bar_wrap_8.v")
        );

        let params = WrapperParams::builder()
            .ports(4)
            .name("demux4")
            .build()
            .unwrap();
        assert_eq!(params.module_name(), "demux4");
        assert_eq!(params.output_path(), PathBuf::from("demux4.v"));

        let params = WrapperParams::builder()
            .name("demux4")
            .output("rtl/wrapper.v")
            .build()
            .unwrap();
        assert_eq!(params.ports, DEFAULT_PORTS);
        assert_eq!(params.output_path(), PathBuf::from("rtl/wrapper.v"));
    }

    #[test]
    fn test_cn() {
        let cn = |ports| WrapperParams::new(ports).cn();
        assert_eq!(cn(1), 0);
        assert_eq!(cn(2), 1);
        assert_eq!(cn(3), 2);
        assert_eq!(cn(4), 2);
        for ports in 5..=8 {
            assert_eq!(cn(ports), 3);
        }
        assert_eq!(cn(9), 4);
        assert_eq!(cn(100), 7);
    }

    #[test]
    fn test_plan_rejects_invalid_port_counts() {
        for ports in [0, MAX_PORTS + 1, 1000] {
            let err = plan_wrapper(&WrapperParams::new(ports)).unwrap_err();
            assert!(matches!(err, Error::InvalidPortCount(n) if n == ports));
        }
    }

    #[test]
    fn test_plan_wrapper() {
        let plan = plan_wrapper(&WrapperParams::new(3)).unwrap();
        assert_eq!(plan.module_name, "pcie_tlp_demux_bar_wrap_3");
        assert_eq!(plan.cn, 2);
        assert_eq!(plan.demux_module, DEMUX_MODULE);
        assert_eq!(
            plan.outputs.iter().map(|g| g.prefix.as_str()).collect::<Vec<_>>(),
            ["out00", "out01", "out02"]
        );
        assert_eq!(plan.concats.len(), TLP_SIGNALS.len());
        assert_eq!(plan.concats[0].port, "out_tlp_data");
        assert_eq!(
            plan.concats[10].expr,
            "{out02_tlp_ready, out01_tlp_ready, out00_tlp_ready}"
        );
    }
}
