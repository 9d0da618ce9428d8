mod project_file;

use std::error::Error;
use std::path::PathBuf;

use clap::{error::ErrorKind, CommandFactory, Parser};
use log::info;

use project_file::Staged;

#[derive(Parser, Debug)]
#[clap(
    name = "swap",
    about = "Exchanges a pattern level between two projects"
)]
struct Args {
    /// First project file.
    #[clap(short = 'p', long)]
    project: PathBuf,

    /// Second project file. It must have the same number of levels.
    #[clap(short = 'q', long)]
    other: PathBuf,

    /// 1-based level to exchange.
    #[clap(short = 'l', long)]
    level: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.level == 0 {
        Args::command()
            .error(ErrorKind::InvalidValue, "levels start from 1")
            .exit();
    }

    info!("Loading the projects...");
    let mut project = project_file::load(&args.project)?;
    let mut other = project_file::load(&args.other)?;

    project.swap_layer(&mut other, args.level - 1)?;
    let staged = Staged::new(&project, &args.project)?;
    let staged_other = Staged::new(&other, &args.other)?;
    staged.commit()?;
    staged_other.commit()?;

    for (path, p) in [(&args.project, &project), (&args.other, &other)] {
        println!(
            "{}: missed {}, false {}",
            path.display(),
            p.missed(),
            p.false_hyphens()
        );
    }

    Ok(())
}
