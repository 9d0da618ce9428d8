//! Loading and saving zstd-compressed project files.
// Each binary uses a subset of these functions.
#![allow(dead_code)]

use std::error::Error;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use patgen::Project;

pub type Result<T, E = Box<dyn Error>> = std::result::Result<T, E>;

pub fn load(path: &Path) -> Result<Project> {
    Ok(Project::read(zstd::Decoder::new(File::open(path)?)?)?)
}

/// Saves a project by writing `<path>.tmp` and renaming it to `path`.
pub fn save(project: &Project, path: &Path) -> Result<()> {
    Staged::new(project, path)?.commit()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// A project written to a temporary file next to its destination.
///
/// The temporary file is removed when dropped without [`Staged::commit()`].
pub struct Staged {
    tmp: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl Staged {
    pub fn new(project: &Project, path: &Path) -> Result<Self> {
        let mut encoder = zstd::stream::Encoder::new(vec![], 19)?;
        project.write(&mut encoder)?;
        let bytes = encoder.finish()?;
        let tmp = tmp_path(path);
        if let Err(e) = fs::write(&tmp, bytes) {
            fs::remove_file(&tmp).ok();
            return Err(e.into());
        }
        Ok(Self {
            tmp,
            path: path.to_path_buf(),
            committed: false,
        })
    }

    /// Moves the temporary file to the destination.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if !self.committed {
            fs::remove_file(&self.tmp).ok();
        }
    }
}
