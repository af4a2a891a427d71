use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenameOutcome {
    Renamed { target: PathBuf },
    Failed { target: PathBuf, error: String },
}

#[derive(Debug, Default)]
pub struct RenameExecutor {
    reserved: HashSet<PathBuf>,
}

impl RenameExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, source: &Path, proposed: &Path) -> RenameOutcome {
        let target = self.unique_target(source, proposed);
        match fs::rename(source, &target) {
            Ok(()) => RenameOutcome::Renamed { target },
            Err(err) => RenameOutcome::Failed {
                target,
                error: err.to_string(),
            },
        }
    }

    pub fn plan(&mut self, source: &Path, proposed: &Path) -> PathBuf {
        let target = self.unique_target(source, proposed);
        self.reserved.insert(target.clone());
        target
    }

    // `proposed`, or the first of `stem-1.ext`, `stem-2.ext`, ... that is free.
    pub fn unique_target(&self, source: &Path, proposed: &Path) -> PathBuf {
        if self.is_available(proposed, source) {
            return proposed.to_path_buf();
        }

        let parent = proposed.parent().unwrap_or_else(|| Path::new("."));
        let file_name = proposed
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let (stem, ext) = match file_name.rfind('.') {
            Some(idx) if idx > 0 => file_name.split_at(idx),
            _ => (file_name.as_str(), ""),
        };

        let mut n = 1usize;
        loop {
            let candidate = parent.join(format!("{}-{}{}", stem, n, ext));
            if self.is_available(&candidate, source) {
                return candidate;
            }
            n += 1;
        }
    }

    fn is_available(&self, candidate: &Path, source: &Path) -> bool {
        if self.reserved.contains(candidate) {
            return false;
        }
        if candidate == source {
            return true;
        }
        !candidate.exists()
    }
}
