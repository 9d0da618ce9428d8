use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use patgen::{Dictionary, Project};

#[derive(Parser, Debug)]
#[clap(name = "evaluate", about = "Evaluates the patterns of a project")]
struct Args {
    /// Project file.
    #[clap(short = 'p', long)]
    project: PathBuf,

    /// Test dictionary. If this argument is not specified, the patterns are
    /// evaluated on the dictionary they were trained on.
    #[clap(short = 't', long)]
    test_in: Option<PathBuf>,

    /// Lists the wrongly hyphenated words, marking missed hyphens with `.`
    /// and false hyphens with `*`.
    #[clap(short = 'e', long)]
    show_errors: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading the project...");
    let project = Project::read(zstd::Decoder::new(File::open(&args.project)?)?)?;

    let dict = match &args.test_in {
        Some(path) => {
            info!("Loading the test dictionary...");
            Dictionary::from_reader(File::open(path)?)?
        }
        None => project.dictionary().clone(),
    };

    let patterns = project.pattern_set();
    let errors = patterns.errors(&dict, project.margins());
    if args.show_errors {
        for error in &errors {
            if let Some(word) = dict.get(&error.word) {
                println!("{}", word.format_prediction(&error.predicted()));
            }
        }
    }

    let evaluation = patterns.evaluate(&dict, project.margins());
    let total = evaluation.total.max(1) as f64;
    println!("Words = {} ({} wrong)", dict.len(), errors.len());
    println!("Hyphens (weighted) = {}", evaluation.total);
    println!(
        "Missed (weighted) = {} ({:.3}%)",
        evaluation.missed,
        evaluation.missed as f64 * 100.0 / total
    );
    println!(
        "False (weighted) = {} ({:.3}%)",
        evaluation.false_hyphens,
        evaluation.false_hyphens as f64 * 100.0 / total
    );

    Ok(())
}
