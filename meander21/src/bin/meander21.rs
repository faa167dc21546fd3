//! # meander21
//!
//! Generates a swept family of SNSPD test structures, and writes it to GDSII.
//!
//! ```text
//! meander21 -p params.yaml -o out.gds [--sample NAME --doc-dir DIR] [-v]
//! meander21 -f four_point_wire -o out.gds
//! ```
//!
//! Parameter files may be JSON, YAML, or TOML, chosen by extension.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meander21::doc::{pack_library, pack_sweeps, write_device_doc, PackOpts};
use meander21::families::{Family, FamilyParams};
use meander21::raw::LayoutError;
use meander21::utils::{EnumStr, SerdeFile};

#[derive(Parser)]
struct ProgramOptions {
    /// Family parameter file
    #[clap(short = 'p', long, default_value = "")]
    params: String,
    /// Family to generate with default parameters, if no parameter file is given
    #[clap(short = 'f', long, default_value = "")]
    family: String,
    /// Output GDSII file
    #[clap(short = 'o', long)]
    gds: PathBuf,
    /// Sample name. Writes a device document when set.
    #[clap(long, default_value = "")]
    sample: String,
    /// Parent directory of each sample's device document
    #[clap(long, default_value = ".")]
    doc_dir: PathBuf,
    /// Gap between packed devices, in micrometers
    #[clap(long, default_value_t = 100.)]
    spacing: f64,
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = ProgramOptions::parse();
    let default_level = if options.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    return _main(&options);
}

/// Parameters from `options`, either a parameter file or a family's defaults
fn family_params(options: &ProgramOptions) -> Result<FamilyParams, Box<dyn Error>> {
    if !options.params.is_empty() {
        let params = FamilyParams::load(&options.params)?;
        info!("read: {:?}", &options.params);
        return Ok(params);
    }
    match Family::from_str(&options.family) {
        Some(family) => Ok(family.defaults()),
        None => {
            let names: Vec<&str> = Family::all().iter().map(|f| f.to_str()).collect();
            Err(LayoutError::msg(format!(
                "Either a parameter file or one of the families [{}] is required",
                names.join(", ")
            ))
            .into())
        }
    }
}

fn _main(options: &ProgramOptions) -> Result<(), Box<dyn Error>> {
    let params = family_params(options)?;
    let family = params.family();
    let sweep = params.build()?;
    info!("generated {} {} devices", sweep.devices.len(), family);

    let opts = PackOpts {
        spacing: options.spacing,
        ..Default::default()
    };
    let packs = pack_sweeps(vec![sweep], &opts)?;
    let lib = pack_library(family.to_str(), &packs, &opts)?;
    lib.save_gds(&options.gds)?;
    info!("wrote: {:?}", &options.gds);

    if !options.sample.is_empty() {
        let path = write_device_doc(&packs, &options.doc_dir, &options.sample)?;
        info!("wrote: {:?}", path);
    }
    Ok(())
}
