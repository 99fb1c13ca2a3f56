//! Date-stamped artifact naming and all-or-nothing writes.
//!
//! Artifacts are staged as hidden temporary files inside the output
//! directory and renamed into place by [`OutputStage::commit`]. Dropping an
//! uncommitted stage deletes every staged file.

use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{OutputError, OutputResult};
use super::json::to_pretty_json;

/// File name prefix of the per-city category report.
pub const REPORT_PREFIX: &str = "age_categorized_by_city";

/// File name prefix of the average-age chart.
pub const CHART_PREFIX: &str = "average_age_by_city";

/// `YYYYMMDD` stamp embedded in artifact names.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// `<dir>/<prefix>_<YYYYMMDD>.<ext>`
pub fn artifact_path(dir: &Path, prefix: &str, date: NaiveDate, ext: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, date_stamp(date), ext))
}

struct Staged {
    temp: NamedTempFile,
    target: PathBuf,
}

/// Artifacts waiting to be moved into the output directory.
pub struct OutputStage {
    dir: PathBuf,
    staged: Vec<Staged>,
}

impl OutputStage {
    /// Open a stage on an existing directory.
    pub fn new(dir: impl AsRef<Path>) -> OutputResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(OutputError::MissingDirectory(dir));
        }
        Ok(Self { dir, staged: Vec::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of staged artifacts.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Hidden temporary file in the output directory.
    ///
    /// Created with the same mode as a plain `fs::write` (0666 minus umask)
    /// rather than tempfile's owner-only default.
    fn temp_file(&self, ext: &str) -> OutputResult<NamedTempFile> {
        let suffix = format!(".{}", ext);
        let mut builder = tempfile::Builder::new();
        builder.prefix(".census-").suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        builder
            .tempfile_in(&self.dir)
            .map_err(|source| OutputError::Io { path: self.dir.clone(), source })
    }

    /// Stage `value` as pretty JSON under `target`.
    pub fn stage_json<T: Serialize>(&mut self, target: PathBuf, value: &T) -> OutputResult<()> {
        let bytes = to_pretty_json(value)?;
        let mut temp = self.temp_file("json")?;
        let path = temp.path().to_path_buf();
        temp.write_all(&bytes)
            .and_then(|_| temp.flush())
            .map_err(|source| OutputError::Io { path, source })?;
        self.staged.push(Staged { temp, target });
        Ok(())
    }

    /// Stage a file produced by `render`, which receives the temporary path.
    ///
    /// The temporary path keeps the target's extension so format-sniffing
    /// encoders pick the right codec.
    pub fn stage_with<F>(&mut self, target: PathBuf, render: F) -> OutputResult<()>
    where
        F: FnOnce(&Path) -> OutputResult<()>,
    {
        let ext = target
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("tmp")
            .to_string();
        let temp = self.temp_file(&ext)?;
        render(temp.path())?;
        self.staged.push(Staged { temp, target });
        Ok(())
    }

    /// Move every staged artifact to its target, in staging order.
    ///
    /// If one move fails, targets already moved are removed again and the
    /// remaining temporary files are dropped.
    pub fn commit(self) -> OutputResult<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for Staged { temp, target } in self.staged {
            if let Err(e) = temp.persist(&target) {
                for done in &written {
                    let _ = std::fs::remove_file(done);
                }
                return Err(OutputError::Io { path: target, source: e.error });
            }
            written.push(target);
        }
        Ok(written)
    }
}
