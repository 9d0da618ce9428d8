mod project_file;

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use patgen::PatternSet;

#[derive(Parser, Debug)]
#[clap(
    name = "import",
    about = "Replaces the levels of a project with the patterns of a TeX pattern file"
)]
struct Args {
    /// Project file. It is overwritten with the imported levels.
    #[clap(short = 'p', long)]
    project: PathBuf,

    /// TeX pattern file.
    #[clap(short = 'i', long)]
    patterns_in: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading the project...");
    let mut project = project_file::load(&args.project)?;

    let (patterns, exceptions) = PatternSet::from_tex(File::open(&args.patterns_in)?)?;
    if !exceptions.is_empty() {
        warn!(
            "{} words of the \\hyphenation block are not imported",
            exceptions.len()
        );
    }
    project.import_patterns(patterns);
    project_file::save(&project, &args.project)?;

    println!("Imported {} levels", project.pattern_set().len());
    println!("Missed (weighted): {}", project.missed());
    println!("False (weighted): {}", project.false_hyphens());

    Ok(())
}
