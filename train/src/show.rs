mod project_file;

use std::error::Error;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "show", about = "Displays information about a project")]
struct Args {
    /// Project file.
    #[clap(short = 'p', long)]
    project: PathBuf,
}

fn format_time(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || secs.to_string(),
            |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let project = project_file::load(&args.project)?;

    println!("Project file {}", args.project.display());
    println!("\tcreated: {}", format_time(project.created()));
    println!("\tlast modified: {}", format_time(project.modified()));
    println!("\tmargins: {}", project.margins());
    println!("\tdictionary size: {}", project.dictionary().len());
    println!("\ttotal hyphens (weighted): {}", project.total_hyphens());
    println!("\tmissed (weighted): {}", project.missed());
    println!("\tfalse (weighted): {}", project.false_hyphens());
    println!("\tnumber of levels: {}", project.pattern_set().len());
    if project.weights_ignored() {
        println!("\tdictionary weights ignored");
    }

    for (i, layer) in project.pattern_set().layers().iter().enumerate() {
        println!(
            "{} {:?} level, {} n-grams, {} patterns",
            i + 1,
            layer.kind(),
            layer.len(),
            layer.num_patterns()
        );
        match layer.params() {
            Some(params) => println!(
                "\ttrained with range {}, selector {}",
                params.range, params.selector
            ),
            None => println!("\timported"),
        }
    }

    Ok(())
}
