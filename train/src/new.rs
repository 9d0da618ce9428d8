mod project_file;

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::{error::ErrorKind, CommandFactory, Parser};
use log::info;
use patgen::{Dictionary, Margins, Project};

fn parse_margins(val: &str) -> Result<Margins, String> {
    val.parse().map_err(|e: patgen::errors::PatgenError| e.to_string())
}

#[derive(Parser, Debug)]
#[clap(
    name = "new",
    about = "Creates a hyphenation pattern project from a dictionary"
)]
struct Args {
    /// Dictionary of hyphenated words, one word per line.
    #[clap(short = 'd', long)]
    dictionary_in: PathBuf,

    /// A file to which the project is output. The file is compressed by zstd.
    #[clap(short = 'o', long)]
    project_out: PathBuf,

    /// Hyphenation margins in the form `left,right`.
    ///
    /// If this argument is not specified, the margins are computed from the
    /// dictionary.
    #[clap(short = 'm', long, value_parser = parse_margins)]
    margins: Option<Margins>,

    /// Sets all weights of the dictionary to 1.
    #[clap(short = 'i', long)]
    ignore_weights: bool,

    /// Overwrites an existing project file.
    #[clap(long)]
    force: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.project_out.exists() && !args.force {
        Args::command()
            .error(
                ErrorKind::ValueValidation,
                format!(
                    "{} already exists; use --force to overwrite it",
                    args.project_out.display()
                ),
            )
            .exit();
    }

    info!("Loading the dictionary...");
    let dict = Dictionary::from_reader(File::open(&args.dictionary_in)?)?;
    let mut project = Project::new(dict, args.margins)?;
    if args.ignore_weights {
        project.ignore_weights();
    }
    project_file::save(&project, &args.project_out)?;

    println!("Created project {}", args.project_out.display());
    println!("\tdictionary size: {}", project.dictionary().len());
    println!("\tmargins: {}", project.margins());
    println!("\ttotal hyphens (weighted): {}", project.total_hyphens());

    Ok(())
}
