use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{error::ErrorKind, CommandFactory, Parser};
use log::info;
use patgen::Project;

#[derive(Parser, Debug)]
#[clap(name = "export", about = "Exports a project as a TeX pattern file")]
struct Args {
    /// Project file.
    #[clap(short = 'p', long)]
    project: PathBuf,

    /// TeX pattern file to create.
    #[clap(short = 'o', long)]
    patterns_out: PathBuf,

    /// Writes an empty `\hyphenation` block instead of the words the patterns
    /// hyphenate wrongly.
    #[clap(long)]
    no_exceptions: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.patterns_out.exists() {
        Args::command()
            .error(
                ErrorKind::ValueValidation,
                format!(
                    "{} already exists; delete it first or change the name",
                    args.patterns_out.display()
                ),
            )
            .exit();
    }

    info!("Loading the project...");
    let project = Project::read(zstd::Decoder::new(File::open(&args.project)?)?)?;

    let exceptions = if args.no_exceptions {
        vec![]
    } else {
        project.exceptions()
    };

    let mut wtr = BufWriter::new(File::create(&args.patterns_out)?);
    project.pattern_set().write_tex(&mut wtr, &exceptions)?;
    wtr.flush()?;

    println!("Created TeX patterns file {}", args.patterns_out.display());
    println!(
        "Number of patterns: {}",
        project.pattern_set().pattern_strings().len()
    );
    println!("Number of exceptions: {}", exceptions.len());

    Ok(())
}
