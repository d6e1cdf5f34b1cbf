//! Version-control commit of the files touched by a run.

use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git {step} failed ({code:?}): {stderr}")]
    CommandFailed {
        step: &'static str,
        code: Option<i32>,
        stderr: String,
    },
    #[error("Nothing to commit")]
    NoFiles,
}

/// Commits an explicit file list with one message.
pub trait Committer {
    fn commit(&self, files: &[PathBuf], message: &str) -> Result<(), CommitError>;
}

/// Runs `git add` then `git commit --only` for exactly the given files.
pub struct GitCommitter {
    work_dir: PathBuf,
}

impl GitCommitter {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn run(&self, step: &'static str, args: &[&str], files: &[PathBuf]) -> Result<(), CommitError> {
        let output = Command::new("git")
            .args(args)
            .arg("--")
            .args(files)
            .current_dir(&self.work_dir)
            .output()?;
        if output.status.success() {
            log::debug!("git {} ok ({} file(s))", step, files.len());
            return Ok(());
        }
        Err(CommitError::CommandFailed {
            step,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Committer for GitCommitter {
    fn commit(&self, files: &[PathBuf], message: &str) -> Result<(), CommitError> {
        if files.is_empty() {
            return Err(CommitError::NoFiles);
        }
        // Absolute paths so they resolve the same from the work dir.
        let files: Vec<PathBuf> = files
            .iter()
            .map(|f| f.canonicalize().unwrap_or_else(|_| f.clone()))
            .collect();
        self.run("add", &["add"], &files)?;
        self.run("commit", &["commit", "--only", "-m", message], &files)
    }
}

/// Whether `dir` is inside a git work tree.
pub fn is_inside_work_tree(dir: &Path) -> bool {
    match Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
    {
        Ok(o) => o.status.success(),
        Err(e) => {
            log::debug!("git rev-parse failed: {}", e);
            false
        }
    }
}
