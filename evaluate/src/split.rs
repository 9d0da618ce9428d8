use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{error::ErrorKind, CommandFactory, Parser};
use patgen::Dictionary;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn parse_ratio(val: &str) -> Result<f64, String> {
    let val = val.parse::<f64>().map_err(|e| e.to_string())?;
    if (0.0..=1.0).contains(&val) {
        Ok(val)
    } else {
        Err(format!("{val} is not in 0.0..=1.0"))
    }
}

#[derive(Parser, Debug)]
#[clap(name = "split", about = "Shuffle and split a dictionary into train/test")]
struct Args {
    /// Dictionary file to be split.
    #[clap(short = 'i', long)]
    dictionary_in: PathBuf,

    /// Destination for training words.
    #[clap(short = 't', long)]
    train_out: PathBuf,

    /// Destination for testing words.
    #[clap(short = 'e', long)]
    test_out: PathBuf,

    /// Ratio of testing words. (0.0 to 1.0)
    #[clap(long, default_value = "0.1", value_parser = parse_ratio)]
    test_ratio: f64,

    /// Seed of the shuffle. A random seed is used if not specified.
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let dict = Dictionary::from_reader(File::open(args.dictionary_in)?)?;
    if dict.is_empty() {
        Args::command()
            .error(ErrorKind::InvalidValue, "the dictionary has no word")
            .exit();
    }

    let test_len = (dict.len() as f64 * args.test_ratio) as usize;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut words: Vec<_> = dict.iter().collect();
    words.shuffle(&mut rng);

    let mut train_wtr = BufWriter::new(File::create(args.train_out)?);
    let mut test_wtr = BufWriter::new(File::create(args.test_out)?);

    let mut it = words.into_iter();
    for (_, word) in (0..test_len).zip(&mut it) {
        writeln!(test_wtr, "{word}")?;
    }
    for word in it {
        writeln!(train_wtr, "{word}")?;
    }
    train_wtr.flush()?;
    test_wtr.flush()?;

    Ok(())
}
