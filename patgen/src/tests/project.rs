use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use crate::errors::PatgenError;
use crate::project::PROJECT_MAGIC;
use crate::{Dictionary, LengthRange, Margins, Project, Selector};

const LATIN_DIC: &str = include_str!("./resources/latin.dic");

#[test]
fn test_save_load() {
    let dict = Dictionary::from_reader(LATIN_DIC.as_bytes()).unwrap();
    let mut project = Project::new(dict, None).unwrap();
    project
        .train_new_layer(LengthRange::new(1, 2).unwrap(), Selector::new(1.0, 1.0, 1.0))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin.patgen");
    {
        let mut wtr = BufWriter::new(File::create(&path).unwrap());
        project.write(&mut wtr).unwrap();
        wtr.flush().unwrap();
    }

    let mut loaded = Project::read(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(Margins::new(1, 2), loaded.margins());
    assert_eq!(project.missed(), loaded.missed());
    assert_eq!(project.false_hyphens(), loaded.false_hyphens());
    assert_eq!(
        project.pattern_set().pattern_strings(),
        loaded.pattern_set().pattern_strings()
    );

    // training resumes from the loaded state
    project
        .train_new_layer(LengthRange::new(1, 2).unwrap(), Selector::new(1.0, 1.0, 1.0))
        .unwrap();
    loaded
        .train_new_layer(LengthRange::new(1, 2).unwrap(), Selector::new(1.0, 1.0, 1.0))
        .unwrap();
    assert_eq!(0, loaded.missed());
    assert_eq!(0, loaded.false_hyphens());
    assert_eq!(
        project.pattern_set().pattern_strings(),
        loaded.pattern_set().pattern_strings()
    );
}

#[test]
fn test_deterministic_encoding() {
    let dict = Dictionary::from_reader(LATIN_DIC.as_bytes()).unwrap();
    let mut project = Project::new(dict, None).unwrap();
    project
        .train_new_layer(LengthRange::new(1, 3).unwrap(), Selector::new(1.0, 2.0, 1.0))
        .unwrap();

    let mut first = vec![];
    project.write(&mut first).unwrap();
    let mut second = vec![];
    Project::read(first.as_slice())
        .unwrap()
        .write(&mut second)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_read_truncated() {
    let dict = Dictionary::from_reader(LATIN_DIC.as_bytes()).unwrap();
    let project = Project::new(dict, None).unwrap();
    let mut buf = vec![];
    project.write(&mut buf).unwrap();

    assert!(Project::read(&buf[..PROJECT_MAGIC.len() - 1]).is_err());
    assert!(matches!(
        Project::read(&buf[..buf.len() - 1]),
        Err(PatgenError::BincodeDecode(_))
    ));
}

#[test]
fn test_read_other_format() {
    assert!(matches!(
        Project::read(LATIN_DIC.as_bytes()),
        Err(PatgenError::InvalidFormat(_))
    ));
}
