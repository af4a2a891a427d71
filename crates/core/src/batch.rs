use crate::apply::{RenameExecutor, RenameOutcome};
use crate::identity::IdentityResolver;
use crate::metadata::{default_photo_extensions, FileMetadata, MediaFile, MetadataProvider};
use crate::prompt::{Cancelled, Prompter};
use crate::rules::{NamingRule, Proposal, RuleKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub dry_run: bool,
    pub photo_extensions: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            photo_extensions: default_photo_extensions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenameStatus {
    Renamed,
    Planned,
    Unchanged,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    #[serde(flatten)]
    pub status: RenameStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub scanned: usize,
    pub renamed: usize,
    pub planned: usize,
    pub unchanged: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub folder: PathBuf,
    pub rule: RuleKind,
    pub dry_run: bool,
    pub cancelled: bool,
    pub entries: Vec<BatchEntry>,
    pub stats: BatchStats,
}

impl BatchReport {
    fn record(&mut self, source: &Path, target: Option<PathBuf>, status: RenameStatus) {
        match &status {
            RenameStatus::Renamed => self.stats.renamed += 1,
            RenameStatus::Planned => self.stats.planned += 1,
            RenameStatus::Unchanged => self.stats.unchanged += 1,
            RenameStatus::Failed { .. } => self.stats.failed += 1,
        }
        self.entries.push(BatchEntry {
            source: source.to_path_buf(),
            target,
            status,
        });
    }
}

#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Completed(BatchReport),
    Cancelled(BatchReport),
}

impl BatchOutcome {
    pub fn report(&self) -> &BatchReport {
        match self {
            BatchOutcome::Completed(report) | BatchOutcome::Cancelled(report) => report,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BatchOutcome::Cancelled(_))
    }
}

pub fn collect_media_files(folder: &Path, photo_extensions: &[String]) -> Result<Vec<MediaFile>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("failed to read folder: {}", folder.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file) = MediaFile::new(entry.path(), photo_extensions) {
            out.push(file);
        }
    }
    Ok(out)
}

pub fn process_folder(
    folder: &Path,
    rule: &NamingRule,
    resolver: &mut IdentityResolver,
    provider: &dyn MetadataProvider,
    prompter: &mut dyn Prompter,
    options: &BatchOptions,
) -> Result<BatchOutcome> {
    if !folder.is_dir() {
        anyhow::bail!("folder does not exist: {}", folder.display());
    }

    let files = collect_media_files(folder, &options.photo_extensions)?;
    resolver.reset_session();

    let mut report = BatchReport {
        folder: folder.to_path_buf(),
        rule: rule.kind(),
        dry_run: options.dry_run,
        cancelled: false,
        entries: Vec::with_capacity(files.len()),
        stats: BatchStats {
            scanned: files.len(),
            ..BatchStats::default()
        },
    };
    let mut executor = RenameExecutor::new();

    for file in &files {
        let metadata = FileMetadata::new(file, provider);
        let proposal = match rule.compute_target(&metadata, resolver, prompter) {
            Ok(proposal) => proposal,
            Err(Cancelled) => {
                log::warn!("conversion cancelled at {}", file.path.display());
                report.cancelled = true;
                return Ok(BatchOutcome::Cancelled(report));
            }
        };

        let Proposal::Rename(proposed) = proposal else {
            log::debug!("unchanged: {}", file.path.display());
            report.record(&file.path, None, RenameStatus::Unchanged);
            continue;
        };

        // The suffix search can land back on the file's own name.
        let proposed = executor.unique_target(&file.path, &proposed);
        if proposed == file.path {
            log::debug!("already free of collisions: {}", file.path.display());
            report.record(&file.path, None, RenameStatus::Unchanged);
            continue;
        }

        if options.dry_run {
            let target = executor.plan(&file.path, &proposed);
            log::info!(
                "Rename file: {} to {}: planned",
                file.path.display(),
                target.display()
            );
            report.record(&file.path, Some(target), RenameStatus::Planned);
            continue;
        }

        match executor.apply(&file.path, &proposed) {
            RenameOutcome::Renamed { target } => {
                log::info!(
                    "Rename file: {} to {}: renamed successfully",
                    file.path.display(),
                    target.display()
                );
                report.record(&file.path, Some(target), RenameStatus::Renamed);
            }
            RenameOutcome::Failed { target, error } => {
                log::warn!(
                    "Rename file: {} to {}: error in rename: {}",
                    file.path.display(),
                    target.display(),
                    error
                );
                report.record(&file.path, Some(target), RenameStatus::Failed { error });
            }
        }
    }

    Ok(BatchOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PhotoTags;
    use crate::prompt::Confirmation;
    use crate::rules::{RuleSelection, RuleSettings};
    use crate::test_support::{FakeProvider, ScriptedPrompter};
    use std::fs;
    use tempfile::tempdir;

    fn tags(captured: &str, make: &str, model: &str) -> PhotoTags {
        PhotoTags {
            date_time_original: Some(captured.to_string()),
            make: Some(make.to_string()),
            model: Some(model.to_string()),
        }
    }

    fn prefix_rule() -> NamingRule {
        NamingRule::from_selection(&RuleSelection::new(RuleKind::Prefix), &RuleSettings::default())
            .expect("valid rule")
    }

    fn applied() -> BatchOptions {
        BatchOptions {
            dry_run: false,
            ..BatchOptions::default()
        }
    }

    #[test]
    fn collect_skips_directories_and_sorts() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("b.jpg"), b"x").expect("write b");
        fs::write(dir.join("a.mov"), b"x").expect("write a");
        fs::create_dir_all(dir.join("nested")).expect("nested");
        fs::write(dir.join("nested").join("c.jpg"), b"x").expect("write c");

        let files = collect_media_files(dir, &default_photo_extensions()).expect("collect");
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["a.mov", "b.jpg"]);
    }

    #[test]
    fn prefix_batch_renames_and_reuses_confirmed_identity() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        for name in ["img_0001.jpg", "img_0002.jpg", "phone_1.jpg"] {
            fs::write(dir.join(name), name.as_bytes()).expect("write");
        }
        fs::write(dir.join("20140302_101530-done.jpg"), b"x").expect("write done");

        let provider = FakeProvider::default()
            .with_photo("img_0001.jpg", tags("2014:03:02 10:15:30", "Canon", "DIGITAL IXUS 70"))
            .with_photo("img_0002.jpg", tags("2014:03:02 10:16:00", "SAMSUNG", "GT-I9100"))
            .with_photo("phone_1.jpg", tags("2014:03:02 10:17:00", "SAMSUNG", "GT-I9100"));
        let mut prompter = ScriptedPrompter::default()
            .answer_identity("samsung s2")
            .confirm(Confirmation::Yes);
        let mut resolver = IdentityResolver::default();

        let outcome = process_folder(
            dir,
            &prefix_rule(),
            &mut resolver,
            &provider,
            &mut prompter,
            &applied(),
        )
        .expect("batch");

        assert!(!outcome.is_cancelled());
        let report = outcome.report();
        assert_eq!(report.stats.scanned, 4);
        assert_eq!(report.stats.renamed, 3);
        assert_eq!(report.stats.unchanged, 1);
        assert_eq!(prompter.calls(), 2);

        assert!(dir
            .join("20140302_101530-canon_ixus70_101-img_0001.jpg")
            .exists());
        assert!(dir.join("20140302_101600-samsung_s2-img_0002.jpg").exists());
        assert!(dir.join("20140302_101700-samsung_s2-phone_1.jpg").exists());
        assert!(dir.join("20140302_101530-done.jpg").exists());
    }

    #[test]
    fn dry_run_moves_nothing_and_reserves_targets() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("a.jpg"), b"a").expect("write a");
        fs::write(dir.join("b.jpg"), b"b").expect("write b");

        let provider = FakeProvider::default()
            .with_photo("a.jpg", tags("2014:03:02 10:15:30", "Canon", "DIGITAL IXUS 70"))
            .with_photo("b.jpg", tags("2014:03:02 10:15:30", "Canon", "DIGITAL IXUS 70"));
        let mut replace = RuleSelection::new(RuleKind::Replace);
        replace.regex = Some("^[ab]".to_string());
        replace.replacement = Some("same".to_string());
        let rule = NamingRule::from_selection(&replace, &RuleSettings::default()).expect("rule");

        let mut prompter = ScriptedPrompter::default();
        let mut resolver = IdentityResolver::default();
        let outcome = process_folder(
            dir,
            &rule,
            &mut resolver,
            &provider,
            &mut prompter,
            &BatchOptions::default(),
        )
        .expect("batch");

        let report = outcome.report();
        assert!(report.dry_run);
        assert_eq!(report.stats.planned, 2);
        let targets: Vec<_> = report
            .entries
            .iter()
            .filter_map(|e| e.target.clone())
            .collect();
        assert_eq!(targets, [dir.join("same.jpg"), dir.join("same-1.jpg")]);
        assert!(dir.join("a.jpg").exists());
        assert!(dir.join("b.jpg").exists());
        assert!(!dir.join("same.jpg").exists());
    }

    #[test]
    fn suffix_landing_on_own_name_is_unchanged() {
        let mut strip_suffix = RuleSelection::new(RuleKind::Replace);
        strip_suffix.regex = Some("-1".to_string());
        strip_suffix.replacement = Some(String::new());
        let rule =
            NamingRule::from_selection(&strip_suffix, &RuleSettings::default()).expect("rule");

        for dry_run in [true, false] {
            let temp = tempdir().expect("tempdir");
            let dir = temp.path();
            fs::write(dir.join("a.jpg"), b"a").expect("write a");
            fs::write(dir.join("a-1.jpg"), b"a-1").expect("write a-1");

            let mut prompter = ScriptedPrompter::default();
            let mut resolver = IdentityResolver::default();
            let options = BatchOptions {
                dry_run,
                ..BatchOptions::default()
            };
            let outcome = process_folder(
                dir,
                &rule,
                &mut resolver,
                &FakeProvider::default(),
                &mut prompter,
                &options,
            )
            .expect("batch");

            let report = outcome.report();
            assert_eq!(report.stats.scanned, 2);
            assert_eq!(report.stats.unchanged, 2);
            assert_eq!(report.stats.renamed, 0);
            assert_eq!(report.stats.planned, 0);
            assert!(report
                .entries
                .iter()
                .all(|e| e.status == RenameStatus::Unchanged && e.target.is_none()));
            assert_eq!(fs::read(dir.join("a-1.jpg")).expect("read a-1"), b"a-1");
        }
    }

    #[test]
    fn cancellation_stops_batch_and_keeps_earlier_renames() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("a.jpg"), b"a").expect("write a");
        fs::write(dir.join("b.jpg"), b"b").expect("write b");
        fs::write(dir.join("c.jpg"), b"c").expect("write c");

        let provider = FakeProvider::default()
            .with_photo("a.jpg", tags("2014:03:02 10:15:30", "Canon", "DIGITAL IXUS 70"))
            .with_photo("b.jpg", tags("2014:03:02 10:15:31", "Unknown", "Cam"))
            .with_photo("c.jpg", tags("2014:03:02 10:15:32", "Canon", "DIGITAL IXUS 70"));
        let mut prompter = ScriptedPrompter::default()
            .answer_identity("")
            .confirm(Confirmation::Cancel);
        let mut resolver = IdentityResolver::default();

        let outcome = process_folder(
            dir,
            &prefix_rule(),
            &mut resolver,
            &provider,
            &mut prompter,
            &applied(),
        )
        .expect("batch");

        assert!(outcome.is_cancelled());
        let report = outcome.report();
        assert!(report.cancelled);
        assert_eq!(report.stats.renamed, 1);
        assert!(dir.join("20140302_101530-canon_ixus70_101-a.jpg").exists());
        assert!(dir.join("b.jpg").exists());
        assert!(dir.join("c.jpg").exists());
    }

    #[test]
    fn metadata_failures_fall_back_to_modification_time() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        fs::write(dir.join("broken.jpg"), b"not a jpeg").expect("write");

        let provider = FakeProvider::default();
        let mut prompter = ScriptedPrompter::default();
        let mut resolver = IdentityResolver::default();
        let outcome = process_folder(
            dir,
            &prefix_rule(),
            &mut resolver,
            &provider,
            &mut prompter,
            &applied(),
        )
        .expect("batch");

        let report = outcome.report();
        assert_eq!(report.stats.renamed, 1);
        let target = report.entries[0].target.clone().expect("target");
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .expect("name");
        assert!(name.ends_with("-broken.jpg"));
        assert!(crate::sanitize::is_already_handled(&name));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let mut prompter = ScriptedPrompter::default();
        let mut resolver = IdentityResolver::default();
        let err = process_folder(
            &temp.path().join("absent"),
            &prefix_rule(),
            &mut resolver,
            &FakeProvider::default(),
            &mut prompter,
            &BatchOptions::default(),
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("folder does not exist"));
    }

    #[test]
    fn report_serializes_with_flat_status() {
        let mut report = BatchReport {
            folder: PathBuf::from("/media"),
            rule: RuleKind::StripPrefix,
            dry_run: false,
            cancelled: false,
            entries: Vec::new(),
            stats: BatchStats::default(),
        };
        report.record(
            Path::new("/media/a.jpg"),
            Some(PathBuf::from("/media/b.jpg")),
            RenameStatus::Failed {
                error: "denied".to_string(),
            },
        );

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["rule"], "strip-prefix");
        assert_eq!(json["entries"][0]["status"], "failed");
        assert_eq!(json["entries"][0]["error"], "denied");
        assert_eq!(json["stats"]["failed"], 1);
    }
}
