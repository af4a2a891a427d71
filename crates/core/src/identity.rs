use crate::metadata::{FileMetadata, MediaKind};
use crate::prompt::{Cancelled, Confirmation, Prompter};
use crate::sanitize::canonical_identity;
use std::collections::BTreeMap;

pub const KNOWN_IDENTITIES: &[(&str, &str)] = &[
    ("Canon DIGITAL IXUS 70", "canon_ixus70_101"),
    ("Canon  DIGITAL IXUS 70", "canon_ixus70_101"),
    ("NIKON CORPORATION NIKON D3200", "nikon_d3200_100"),
    ("NIKON CORPORATION  NIKON D3200", "nikon_d3200_100"),
    ("CanonMVI06", "canon_ixus70"),
];

pub const NO_CAMERA_MODEL: &str = "@@No Camera Model@@";

#[derive(Debug, Clone)]
pub struct IdentityTable {
    entries: Vec<(String, String)>,
}

impl Default for IdentityTable {
    fn default() -> Self {
        Self {
            entries: KNOWN_IDENTITIES
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }
}

impl IdentityTable {
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (raw, canonical) in extra {
            let canonical = canonical_identity(canonical);
            if canonical.is_empty() || table.lookup(raw).is_some() {
                continue;
            }
            table.entries.push((raw.clone(), canonical));
        }
        table
    }

    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(known, _)| known == raw)
            .map(|(_, canonical)| canonical.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionEntry {
    last_raw: String,
    confirmed: String,
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self {
            last_raw: NO_CAMERA_MODEL.to_string(),
            confirmed: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    photo: SessionEntry,
    video: SessionEntry,
}

impl SessionState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn cached(&self, kind: MediaKind, raw: &str) -> Option<&str> {
        let entry = self.entry(kind);
        (entry.last_raw == raw).then_some(entry.confirmed.as_str())
    }

    pub fn remember(&mut self, kind: MediaKind, raw: &str, confirmed: &str) {
        let entry = match kind {
            MediaKind::Photo => &mut self.photo,
            MediaKind::Video => &mut self.video,
        };
        entry.last_raw = raw.to_string();
        entry.confirmed = confirmed.to_string();
    }

    fn entry(&self, kind: MediaKind) -> &SessionEntry {
        match kind {
            MediaKind::Photo => &self.photo,
            MediaKind::Video => &self.video,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    table: IdentityTable,
    session: SessionState,
}

impl IdentityResolver {
    pub fn new(table: IdentityTable) -> Self {
        Self {
            table,
            session: SessionState::default(),
        }
    }

    pub fn reset_session(&mut self) {
        self.session.reset();
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn resolve(
        &mut self,
        prompter: &mut dyn Prompter,
        kind: MediaKind,
        raw: Option<&str>,
        file_name: &str,
    ) -> Result<String, Cancelled> {
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            return Ok(String::new());
        };

        if let Some(canonical) = self.table.lookup(raw) {
            return Ok(canonical.to_string());
        }

        if let Some(confirmed) = self.session.cached(kind, raw) {
            return Ok(confirmed.to_string());
        }

        let suggestion = canonical_identity(raw);
        let confirmed = loop {
            let answer = prompter
                .ask_identity(kind, file_name, &suggestion)
                .ok_or(Cancelled)?;
            let candidate = canonical_identity(&answer);
            match prompter.confirm_identity(file_name, &candidate) {
                Confirmation::Yes => break candidate,
                Confirmation::No => continue,
                Confirmation::Cancel => return Err(Cancelled),
            }
        };

        log::debug!("{:?} identity {:?} confirmed as {:?}", kind, raw, confirmed);
        self.session.remember(kind, raw, &confirmed);
        Ok(confirmed)
    }

    pub fn resolve_for(
        &mut self,
        metadata: &FileMetadata<'_>,
        prompter: &mut dyn Prompter,
    ) -> Result<String, Cancelled> {
        let file = metadata.file();
        let raw = metadata.raw_identity();
        self.resolve(prompter, file.kind, raw.as_deref(), &file.file_name)
    }
}
