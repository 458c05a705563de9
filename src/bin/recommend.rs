use std::env;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use lineup::bundle::FeatureBundle;
use lineup::config::Config;
use lineup::file::FromJsonFile;
use lineup::print::{tabulate_recommendations, tabulate_schedule};
use lineup::recommend::{Optimizer, Request};
use lineup::validate::validate_request;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the recommendation request from
    #[clap(short = 'r', long)]
    request: PathBuf,

    /// file to source the feature bundle from
    #[clap(short = 'b', long)]
    bundle: PathBuf,

    /// optional optimiser config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// emit the response as JSON
    #[clap(long)]
    json: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !self.request.is_file() {
            bail!("request file {} does not exist", self.request.display());
        }
        if !self.bundle.is_file() {
            bail!("bundle file {} does not exist", self.bundle.display());
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
    debug!("config: {config:?}");
    let optimizer = Optimizer::try_from(config)?;

    let request = Request::from_json_file(&args.request)?;
    validate_request(&request)?;
    let bundle = FeatureBundle::from_json_file(&args.bundle)?;
    debug!(
        "bundle: {} candidate pairs, {} scenarios, {} matchups",
        bundle.candidate_pairs.len(),
        bundle.opponent_scenarios.len(),
        bundle.pair_matchups.len()
    );

    let start_time = Instant::now();
    let response = optimizer.respond(&request, &bundle, Uuid::new_v4(), Utc::now());
    let elapsed = start_time.elapsed();
    debug!("took {elapsed:?}");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    info!(
        "request {} ({} mode, objective {})",
        response.request_id, request.mode, response.objective
    );
    if let Some(warning) = &response.bundle_metadata.warning {
        warn!("{warning}");
    }
    info!(
        "recommendations against {} scenarios:\n{}",
        response.scenario_summary.scenario_count,
        Console::default().render(&tabulate_recommendations(
            &response.recommendations,
            &response.player_directory
        ))
    );
    for recommendation in &response.recommendations {
        if let Some(schedule) = &recommendation.schedule {
            info!(
                "schedule for rank {}:\n{}",
                recommendation.rank,
                Console::default().render(&tabulate_schedule(schedule, &response.player_directory))
            );
        }
    }
    Ok(())
}
