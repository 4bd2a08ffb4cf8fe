//! Puts generated artifacts on disk, or compares them with what is already there.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{emit::Artifacts, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    pub written: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    Missing(PathBuf),
    Differs(PathBuf),
}

impl Drift {
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing(path) | Self::Differs(path) => path,
        }
    }
}

fn existing(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Writes every artifact under `out_dir`, leaving files that already hold the same bytes alone.
pub fn write_all(artifacts: &Artifacts, out_dir: &Path) -> io::Result<WriteSummary> {
    fs::create_dir_all(out_dir)?;
    let mut summary = WriteSummary::default();
    for artifact in artifacts.iter() {
        let path = out_dir.join(&artifact.path);
        if existing(&path)?.as_deref() == Some(artifact.contents.as_bytes()) {
            debug!("Unchanged {}", path.display());
            summary.unchanged += 1;
            continue;
        }
        fs::write(&path, &artifact.contents)?;
        info!("Wrote {}", path.display());
        summary.written += 1;
    }
    Ok(summary)
}

/// Artifacts whose file under `out_dir` is missing or has different contents.
pub fn check(artifacts: &Artifacts, out_dir: &Path) -> io::Result<Vec<Drift>> {
    let mut drift = Vec::new();
    for artifact in artifacts.iter() {
        let path = out_dir.join(&artifact.path);
        match existing(&path)? {
            None => drift.push(Drift::Missing(path)),
            Some(bytes) if bytes != artifact.contents.as_bytes() => drift.push(Drift::Differs(path)),
            Some(_) => {}
        }
    }
    Ok(drift)
}
