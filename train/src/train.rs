mod project_file;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use patgen::errors::PatgenError;
use patgen::{LengthRange, Selector};

fn parse_range(val: &str) -> Result<LengthRange, String> {
    val.parse().map_err(|e: PatgenError| e.to_string())
}

fn parse_selector(val: &str) -> Result<Selector, String> {
    val.parse().map_err(|e: PatgenError| e.to_string())
}

#[derive(Parser, Debug)]
#[clap(name = "train", about = "Trains the next level of hyphenation patterns")]
struct Args {
    /// Project file created by the new command.
    #[clap(short = 'p', long)]
    project: PathBuf,

    /// Range of pattern lengths in the form `min-max`.
    #[clap(short = 'r', long, default_value = "1-5", value_parser = parse_range)]
    range: LengthRange,

    /// Pattern selector in the form `good_weight:bad_weight:threshold`.
    ///
    /// A pattern is selected when `good_weight * good - bad_weight * bad >= threshold`.
    #[clap(short = 's', long, default_value = "1:5:10", value_parser = parse_selector)]
    selector: Selector,

    /// Saves the trained level into the project. Without this flag, the
    /// project file is left untouched.
    #[clap(short = 'c', long)]
    commit: bool,
}

fn percentage(num: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        num as f64 * 100.0 / total as f64
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading the project...");
    let mut project = project_file::load(&args.project)?;

    let report = project.train_new_layer(args.range, args.selector)?;
    let total = project.total_hyphens();

    println!(
        "Level {} ({:?}): {} patterns, range {}, selector {}",
        report.level, report.kind, report.num_patterns, args.range, args.selector
    );
    println!(
        "Missed (weighted): {} ({:.3}%)",
        report.missed,
        percentage(report.missed, total)
    );
    println!(
        "False (weighted): {} ({:.3}%)",
        report.false_hyphens,
        percentage(report.false_hyphens, total)
    );

    if args.commit {
        project_file::save(&project, &args.project)?;
        println!("...Committed!");
    } else {
        info!("Dry run; pass --commit to save the level");
    }

    Ok(())
}
