//! Discovery of parameter checkpoints.
//!
//! Checkpoints are files named `weights-<episode>.<ext>`. The latest one is
//! found by comparing the episode numbers, so `weights-10000` comes after
//! `weights-9000` even though it sorts before it lexically.
use crate::{Agent, Env};
use anyhow::Result;
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

const PREFIX: &str = "weights-";

/// File extension of the checkpoints written by the trainer.
pub const EXTENSION: &str = "safetensors";

/// Path of the checkpoint of the given episode in `dir`.
pub fn checkpoint_path(dir: impl AsRef<Path>, episode: usize) -> PathBuf {
    dir.as_ref()
        .join(format!("{}{}.{}", PREFIX, episode, EXTENSION))
}

/// Episode number encoded in a checkpoint file name.
///
/// Returns `None` for file names not of the form `weights-<n>.<ext>`.
pub fn parse_episode(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    path.extension()?;
    stem.strip_prefix(PREFIX)?.parse().ok()
}

/// Recursively collects checkpoints under `dir`, the most recent first.
///
/// A missing directory yields no checkpoint.
pub fn find_checkpoints(dir: impl AsRef<Path>) -> Result<Vec<(usize, PathBuf)>> {
    let mut found = Vec::new();
    let dir = dir.as_ref();
    if dir.is_dir() {
        collect(dir, &mut found)?;
    }
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(found)
}

fn collect(dir: &Path, found: &mut Vec<(usize, PathBuf)>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, found)?;
        } else if let Some(episode) = parse_episode(&path) {
            found.push((episode, path));
        }
    }
    Ok(())
}

/// Loads the most recent loadable checkpoint under `dir` into `agent`.
///
/// A checkpoint that fails to load is skipped in favour of the next most
/// recent one. Returns the loaded path, or `None` if the agent keeps its
/// freshly initialized parameters.
pub fn load_latest<E, A>(agent: &mut A, dir: impl AsRef<Path>) -> Result<Option<PathBuf>>
where
    E: Env,
    A: Agent<E>,
{
    for (_, path) in find_checkpoints(dir)? {
        match agent.load_params(&path) {
            Ok(()) => {
                info!("Weights loaded from {:?}", path);
                return Ok(Some(path));
            }
            Err(e) => warn!("Failed to load weights from {:?} due to error: {}", path, e),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_parse_episode() {
        assert_eq!(parse_episode(Path::new("out/weights-5000.safetensors")), Some(5000));
        assert_eq!(parse_episode(Path::new("weights-12.pth")), Some(12));
        assert_eq!(parse_episode(Path::new("weights-x.safetensors")), None);
        assert_eq!(parse_episode(Path::new("model.safetensors")), None);
        assert_eq!(parse_episode(Path::new("weights-3")), None);
    }

    #[test]
    fn test_find_checkpoints_numeric_order() -> Result<()> {
        let dir = TempDir::new("checkpoints")?;
        let sub = dir.path().join("output");
        fs::create_dir_all(&sub)?;
        for episode in [9000, 10000, 500] {
            fs::write(checkpoint_path(&sub, episode), b"")?;
        }
        fs::write(dir.path().join("metrics.csv"), b"")?;

        let found = find_checkpoints(dir.path())?;
        let episodes = found.iter().map(|(e, _)| *e).collect::<Vec<_>>();
        assert_eq!(episodes, vec![10000, 9000, 500]);
        Ok(())
    }

    #[test]
    fn test_missing_dir() -> Result<()> {
        assert!(find_checkpoints("/nonexistent/orion/checkpoints")?.is_empty());
        Ok(())
    }
}
