use anyhow::Result;
use clap::Parser;

use crate::cli::args::Args;
use crate::cli::progress::{StepContext, TaskKey};
use crate::config::{parse_wrapper_config, WrapperConfig};
use crate::verilog::{generate_wrapper_verilog, WrapperParams};

pub mod args;
pub mod progress;

/// Resolves the wrapper parameters from the command line and optional config file.
pub fn resolve_params(args: &Args) -> crate::Result<WrapperParams> {
    let config = match &args.config {
        Some(path) => parse_wrapper_config(path)?,
        None => WrapperConfig::default(),
    };
    Ok(args.overrides().or(config).into_params())
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let params = resolve_params(&args)?;
    let name = params.module_name();
    let path = params.output_path();
    log::debug!("resolved parameters: {params:?}");

    println!(
        "Generating {} port PCIe TLP demux (BAR ID) wrapper {}...",
        params.ports, name
    );
    println!("Output file: {:?}\n", &path);

    let mut ctx = StepContext::new();

    let verilog = ctx.check(generate_wrapper_verilog(&params))?;
    ctx.finish(TaskKey::GenerateVerilog);

    ctx.check(crate::verilog::write_verilog(&path, &verilog))?;
    ctx.finish(TaskKey::WriteVerilog);

    println!("Wrapper saved to: {:?}\n", &path);

    Ok(())
}
