mod project_file;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[clap(
    name = "compact",
    about = "Removes patterns that are implied by shorter ones"
)]
struct Args {
    /// Project file. It is overwritten with the compacted patterns.
    #[clap(short = 'p', long)]
    project: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading the project...");
    let mut project = project_file::load(&args.project)?;

    let before = project.pattern_set().pattern_strings().len();
    let num_removed = project.compact();
    let after = project.pattern_set().pattern_strings().len();
    project_file::save(&project, &args.project)?;

    println!("Removed {num_removed} patterns");
    println!("Pattern strings: {before} -> {after}");

    Ok(())
}
