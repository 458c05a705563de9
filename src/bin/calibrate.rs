use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use lineup::calibration::{CalibrationReport, HoldoutRow};
use lineup::config::Config;
use lineup::file::{read_json, FromJsonFile};
use lineup::print::tabulate_calibration;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the holdout rows from
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// optional optimiser config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !self.file.is_file() {
            bail!("holdout file {} does not exist", self.file.display());
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let config = match &args.config {
        None => Config::default(),
        Some(path) => Config::from_json_file(path)?,
    };
    config.validate()?;

    let rows: Vec<HoldoutRow> = read_json(&args.file)?;
    let report = CalibrationReport::evaluate(&rows, &config.calibration_blender())
        .ok_or_else(|| anyhow!("no holdout rows in {}", args.file.display()))?;
    info!(
        "{} rows, {} with a point-differential signal:\n{}",
        report.rows,
        report.with_secondary,
        Console::default().render(&tabulate_calibration(&report))
    );
    info!("brier improvement from blending: {:.6}", report.brier_improvement());
    Ok(())
}
