use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;
use patgen::dictionary::{format_hyphenation, lowercase};
use patgen::Project;

#[derive(Parser, Debug)]
#[clap(name = "hyphenate", about = "Hyphenates a list of words")]
struct Args {
    /// Project file.
    #[clap(short = 'p', long)]
    project: PathBuf,

    /// Word list, one word per line. If not specified, words are read from stdin.
    #[clap(short = 'i', long)]
    input: Option<PathBuf>,

    /// Output file. If not specified, hyphenated words are written to stdout.
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading the project...");
    let project = Project::read(zstd::Decoder::new(File::open(&args.project)?)?)?;
    info!("Ready to hyphenate");

    let rdr: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut wtr: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    for line in rdr.lines() {
        let line = line?;
        let word = lowercase(line.trim());
        if word.is_empty() {
            continue;
        }
        let hyphens = project.hyphenate(&word);
        writeln!(wtr, "{}", format_hyphenation(&word, &hyphens))?;
    }
    wtr.flush()?;

    Ok(())
}
