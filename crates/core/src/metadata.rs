use crate::date_parser::{parse_first, render_canonical, EXIF_PATTERNS, PROBE_PATTERNS};
use crate::exif_reader::read_photo_tags;
use crate::video_probe::{run_probe, ProbeReport};
use chrono::{DateTime, Local, NaiveDateTime};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PHOTO_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

const PROBE_TIMESTAMP_KEYS: &[&str] = &["Mastered date", "Encoded date"];
const PROBE_IDENTITY_KEYS: &[&str] = &["Writing application", "Title"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub file_name: String,
    pub parent: PathBuf,
    pub extension: String,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: &Path, photo_extensions: &[String]) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().to_string();
        let parent = path.parent()?.to_path_buf();
        let extension = extension_of(&file_name);
        let kind = if photo_extensions.iter().any(|ext| ext == &extension) {
            MediaKind::Photo
        } else {
            MediaKind::Video
        };

        Some(Self {
            path: path.to_path_buf(),
            file_name,
            parent,
            extension,
            kind,
        })
    }

    pub fn sibling(&self, file_name: &str) -> PathBuf {
        self.parent.join(file_name)
    }
}

pub fn extension_of(file_name: &str) -> String {
    file_name
        .rfind('.')
        .map(|idx| file_name[idx..].to_lowercase())
        .unwrap_or_default()
}

pub fn default_photo_extensions() -> Vec<String> {
    DEFAULT_PHOTO_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoTags {
    pub date_time_original: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode EXIF in {path}: {source}")]
    Exif {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },
    #[error("failed to run {program}: {source}")]
    ProbeSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {timeout:?}")]
    ProbeTimeout { program: String, timeout: Duration },
    #[error("{program} exited with {status}")]
    ProbeFailed { program: String, status: String },
}

pub trait MetadataProvider {
    fn read_photo(&self, path: &Path) -> Result<PhotoTags, MetadataError>;
    fn probe_video(&self, path: &Path) -> Result<ProbeReport, MetadataError>;
}

#[derive(Debug, Clone)]
pub struct SystemMetadataProvider {
    pub probe_program: String,
    pub probe_timeout: Option<Duration>,
}

impl Default for SystemMetadataProvider {
    fn default() -> Self {
        Self {
            probe_program: "mediainfo".to_string(),
            probe_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl MetadataProvider for SystemMetadataProvider {
    fn read_photo(&self, path: &Path) -> Result<PhotoTags, MetadataError> {
        read_photo_tags(path)
    }

    fn probe_video(&self, path: &Path) -> Result<ProbeReport, MetadataError> {
        run_probe(&self.probe_program, path, self.probe_timeout)
    }
}

pub struct FileMetadata<'a> {
    file: &'a MediaFile,
    provider: &'a dyn MetadataProvider,
    photo: OnceCell<Option<PhotoTags>>,
    video: OnceCell<Option<ProbeReport>>,
}

impl<'a> FileMetadata<'a> {
    pub fn new(file: &'a MediaFile, provider: &'a dyn MetadataProvider) -> Self {
        Self {
            file,
            provider,
            photo: OnceCell::new(),
            video: OnceCell::new(),
        }
    }

    pub fn file(&self) -> &MediaFile {
        self.file
    }

    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        match self.file.kind {
            MediaKind::Photo => {
                let raw = self.photo_tags()?.date_time_original.as_deref()?;
                parse_first(raw.trim_end_matches('\0'), EXIF_PATTERNS)
            }
            MediaKind::Video => {
                let raw = self.probe_report()?.first_present(PROBE_TIMESTAMP_KEYS)?;
                parse_first(raw, PROBE_PATTERNS)
            }
        }
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        if let Some(captured) = self.capture_time() {
            return Some(captured);
        }
        log::debug!(
            "no capture time for {}, using modification time",
            self.file.path.display()
        );
        file_modified_local(&self.file.path)
    }

    pub fn timestamp_text(&self) -> Option<String> {
        self.timestamp().map(|value| render_canonical(&value))
    }

    pub fn raw_identity(&self) -> Option<String> {
        match self.file.kind {
            MediaKind::Photo => {
                let tags = self.photo_tags()?;
                let make = tags.make.as_deref()?;
                let model = tags.model.as_deref()?;
                Some(format!("{} {}", make, model))
            }
            MediaKind::Video => self
                .probe_report()?
                .first_non_empty(PROBE_IDENTITY_KEYS)
                .map(str::to_string),
        }
    }

    fn photo_tags(&self) -> Option<&PhotoTags> {
        self.photo
            .get_or_init(|| match self.provider.read_photo(&self.file.path) {
                Ok(tags) => Some(tags),
                Err(err) => {
                    log::warn!("photo metadata unavailable: {err}");
                    None
                }
            })
            .as_ref()
    }

    fn probe_report(&self) -> Option<&ProbeReport> {
        self.video
            .get_or_init(|| match self.provider.probe_video(&self.file.path) {
                Ok(report) => Some(report),
                Err(err) => {
                    log::warn!("video metadata unavailable: {err}");
                    None
                }
            })
            .as_ref()
    }
}

fn file_modified_local(path: &Path) -> Option<NaiveDateTime> {
    let time = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(time).naive_local())
}
