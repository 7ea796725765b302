//! Timeline demonstration
//!
//! Runs the built-in foo/bar scenario, or a scenario loaded from a JSON file,
//! printing what each subscriber sees step by step.

mod demo;
mod scenario;

use scenario::Scenario;
use std::io::{self, Write};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "timeline-demo", about = "Step a timeline and print subscriber output")]
struct Opt {
    /// JSON scenario to replay instead of the built-in demonstration
    #[structopt(long, parse(from_os_str))]
    scenario: Option<PathBuf>,

    /// Print the tick report after every step
    #[structopt(long)]
    reports: bool,
}

fn main() -> Result<(), scenario::ScenarioError> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("timeline_core=warn,timeline_demo=info"),
    )
    .format_timestamp_millis()
    .init();

    let opt = Opt::from_args();
    let scenario = match &opt.scenario {
        Some(path) => {
            log::info!("loading scenario from {}", path.display());
            Scenario::load(path)?
        }
        None => Scenario::reference(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    demo::run(&scenario, &mut out, opt.reports)?;
    out.flush()?;
    Ok(())
}
