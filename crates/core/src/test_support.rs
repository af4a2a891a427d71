use crate::metadata::{MediaKind, MetadataError, MetadataProvider, PhotoTags};
use crate::prompt::{Confirmation, Prompter};
use crate::video_probe::ProbeReport;
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

#[derive(Default)]
pub struct FakeProvider {
    photos: HashMap<String, PhotoTags>,
    reports: HashMap<String, String>,
    reads: Cell<usize>,
}

impl FakeProvider {
    pub fn with_photo(mut self, file_name: &str, tags: PhotoTags) -> Self {
        self.photos.insert(file_name.to_string(), tags);
        self
    }

    pub fn with_report(mut self, file_name: &str, report: &str) -> Self {
        self.reports.insert(file_name.to_string(), report.to_string());
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    fn key(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn missing(path: &Path) -> MetadataError {
        MetadataError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no canned metadata"),
        }
    }
}

impl MetadataProvider for FakeProvider {
    fn read_photo(&self, path: &Path) -> Result<PhotoTags, MetadataError> {
        self.reads.set(self.reads.get() + 1);
        self.photos
            .get(&Self::key(path))
            .cloned()
            .ok_or_else(|| Self::missing(path))
    }

    fn probe_video(&self, path: &Path) -> Result<ProbeReport, MetadataError> {
        self.reads.set(self.reads.get() + 1);
        self.reports
            .get(&Self::key(path))
            .map(|text| ProbeReport::parse(text))
            .ok_or_else(|| Self::missing(path))
    }
}

#[derive(Default)]
pub struct ScriptedPrompter {
    identities: VecDeque<String>,
    confirmations: VecDeque<Confirmation>,
    suggestions: Vec<String>,
    confirmed: Vec<String>,
    calls: usize,
}

impl ScriptedPrompter {
    pub fn answer_identity(mut self, answer: &str) -> Self {
        self.identities.push_back(answer.to_string());
        self
    }

    pub fn confirm(mut self, answer: Confirmation) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn confirmed(&self) -> &[String] {
        &self.confirmed
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_identity(
        &mut self,
        _kind: MediaKind,
        _file_name: &str,
        suggestion: &str,
    ) -> Option<String> {
        self.calls += 1;
        self.suggestions.push(suggestion.to_string());
        let answer = self.identities.pop_front()?;
        if answer.is_empty() {
            Some(suggestion.to_string())
        } else {
            Some(answer)
        }
    }

    fn confirm_identity(&mut self, _file_name: &str, identity: &str) -> Confirmation {
        self.calls += 1;
        self.confirmed.push(identity.to_string());
        self.confirmations
            .pop_front()
            .unwrap_or(Confirmation::Cancel)
    }

    fn confirm_correction(&mut self, _file_name: &str, proposed: &str) -> Confirmation {
        self.calls += 1;
        self.confirmed.push(proposed.to_string());
        self.confirmations
            .pop_front()
            .unwrap_or(Confirmation::Cancel)
    }
}
