use crate::date_parser::{parse_canonical, render_canonical, CANONICAL_LEN};
use crate::devices::{Device, DEFAULT_SAMSUNG_ACE_MAX_NAME_LEN};
use crate::identity::IdentityResolver;
use crate::metadata::FileMetadata;
use crate::prompt::{Cancelled, Confirmation, Prompter};
use crate::sanitize::{
    is_already_handled, sanitize_name, sanitize_name_keep_dash, timestamp_identity_prefix,
};
use chrono::TimeDelta;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Verify,
    Prefix,
    StripPrefix,
    Replace,
    TimeShift,
    Samsung,
    SamsungAce,
    Canon,
    Nikon,
    Htc,
}

impl RuleKind {
    pub const ALL: [RuleKind; 10] = [
        RuleKind::Verify,
        RuleKind::Prefix,
        RuleKind::StripPrefix,
        RuleKind::Replace,
        RuleKind::TimeShift,
        RuleKind::Samsung,
        RuleKind::SamsungAce,
        RuleKind::Canon,
        RuleKind::Nikon,
        RuleKind::Htc,
    ];

    pub fn id(self) -> &'static str {
        match self {
            RuleKind::Verify => "verify",
            RuleKind::Prefix => "prefix",
            RuleKind::StripPrefix => "strip-prefix",
            RuleKind::Replace => "replace",
            RuleKind::TimeShift => "time-shift",
            RuleKind::Samsung => "samsung",
            RuleKind::SamsungAce => "samsung-ace",
            RuleKind::Canon => "canon",
            RuleKind::Nikon => "nikon",
            RuleKind::Htc => "htc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Verify => "Check converted files",
            RuleKind::Prefix => "Rename: add prefix timestamp + camera model",
            RuleKind::StripPrefix => "Rename: remove regex & add prefix timestamp + camera model",
            RuleKind::Replace => "Rename: replace regex by user fixed text",
            RuleKind::TimeShift => "Rename: shift timestamp prefix by minutes",
            RuleKind::Samsung => "Samsung Galaxy S2/S3/Tab",
            RuleKind::SamsungAce => "Samsung Galaxy Ace",
            RuleKind::Canon => "Canon stock names",
            RuleKind::Nikon => "Nikon stock names",
            RuleKind::Htc => "HTC stock names",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| RuleError::UnknownRule(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("unknown rule: {0}")]
    UnknownRule(String),
    #[error("rule {rule} requires {parameter}")]
    MissingParameter {
        rule: RuleKind,
        parameter: &'static str,
    },
    #[error("invalid regex {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },
    #[error("invalid minute offset: {0:?}")]
    InvalidMinutes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSelection {
    pub kind: RuleKind,
    pub regex: Option<String>,
    pub replacement: Option<String>,
    pub minutes: Option<String>,
}

impl RuleSelection {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            regex: None,
            replacement: None,
            minutes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSettings {
    pub samsung_ace_max_name_len: usize,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            samsung_ace_max_name_len: DEFAULT_SAMSUNG_ACE_MAX_NAME_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    Rename(PathBuf),
    Unchanged,
}

#[derive(Debug, Clone)]
pub enum NamingRule {
    Verify,
    TimestampIdentityPrefix,
    RegexStripPrefix { pattern: Regex },
    RegexReplace { pattern: Regex, replacement: String },
    TimeShift { minutes: i64 },
    Device(Device),
}

impl NamingRule {
    pub fn from_selection(
        selection: &RuleSelection,
        settings: &RuleSettings,
    ) -> Result<Self, RuleError> {
        let kind = selection.kind;
        let rule = match kind {
            RuleKind::Verify => NamingRule::Verify,
            RuleKind::Prefix => NamingRule::TimestampIdentityPrefix,
            RuleKind::StripPrefix => NamingRule::RegexStripPrefix {
                pattern: required_regex(kind, selection.regex.as_deref())?,
            },
            RuleKind::Replace => NamingRule::RegexReplace {
                pattern: required_regex(kind, selection.regex.as_deref())?,
                replacement: selection
                    .replacement
                    .clone()
                    .ok_or(RuleError::MissingParameter {
                        rule: kind,
                        parameter: "a replacement text",
                    })?,
            },
            RuleKind::TimeShift => {
                let raw = selection
                    .minutes
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .ok_or(RuleError::MissingParameter {
                        rule: kind,
                        parameter: "a minute offset",
                    })?;
                let minutes = raw
                    .parse::<i64>()
                    .ok()
                    .filter(|value| TimeDelta::try_minutes(*value).is_some())
                    .ok_or_else(|| RuleError::InvalidMinutes(raw.to_string()))?;
                NamingRule::TimeShift { minutes }
            }
            RuleKind::Samsung => NamingRule::Device(Device::Samsung),
            RuleKind::SamsungAce => NamingRule::Device(Device::SamsungAce {
                max_name_len: settings.samsung_ace_max_name_len,
            }),
            RuleKind::Canon => NamingRule::Device(Device::Canon),
            RuleKind::Nikon => NamingRule::Device(Device::Nikon),
            RuleKind::Htc => NamingRule::Device(Device::Htc),
        };
        Ok(rule)
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            NamingRule::Verify => RuleKind::Verify,
            NamingRule::TimestampIdentityPrefix => RuleKind::Prefix,
            NamingRule::RegexStripPrefix { .. } => RuleKind::StripPrefix,
            NamingRule::RegexReplace { .. } => RuleKind::Replace,
            NamingRule::TimeShift { .. } => RuleKind::TimeShift,
            NamingRule::Device(Device::Samsung) => RuleKind::Samsung,
            NamingRule::Device(Device::SamsungAce { .. }) => RuleKind::SamsungAce,
            NamingRule::Device(Device::Canon) => RuleKind::Canon,
            NamingRule::Device(Device::Nikon) => RuleKind::Nikon,
            NamingRule::Device(Device::Htc) => RuleKind::Htc,
        }
    }

    pub fn compute_target(
        &self,
        metadata: &FileMetadata<'_>,
        resolver: &mut IdentityResolver,
        prompter: &mut dyn Prompter,
    ) -> Result<Proposal, Cancelled> {
        let proposal = match self {
            NamingRule::Verify => verify(metadata, prompter)?,
            NamingRule::TimestampIdentityPrefix => prefix(metadata, resolver, prompter)?,
            NamingRule::RegexStripPrefix { pattern } => {
                strip_prefix(pattern, metadata, resolver, prompter)?
            }
            NamingRule::RegexReplace {
                pattern,
                replacement,
            } => replace(pattern, replacement, metadata),
            NamingRule::TimeShift { minutes } => time_shift(*minutes, metadata),
            NamingRule::Device(device) => device.compute_target(metadata, resolver, prompter)?,
        };

        Ok(match proposal {
            Proposal::Rename(target) if target == metadata.file().path => Proposal::Unchanged,
            other => other,
        })
    }
}

fn required_regex(kind: RuleKind, pattern: Option<&str>) -> Result<Regex, RuleError> {
    let pattern = pattern
        .filter(|value| !value.is_empty())
        .ok_or(RuleError::MissingParameter {
            rule: kind,
            parameter: "a regex",
        })?;
    // Matched against the lowercased file name.
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| RuleError::InvalidRegex {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

fn verify(metadata: &FileMetadata<'_>, prompter: &mut dyn Prompter) -> Result<Proposal, Cancelled> {
    let file = metadata.file();
    let name = file.file_name.as_str();
    let (Some(claimed), Some(rest)) = (name.get(..CANONICAL_LEN), name.get(CANONICAL_LEN..)) else {
        return Ok(Proposal::Unchanged);
    };
    let Some(timestamp) = metadata.timestamp_text() else {
        return Ok(Proposal::Unchanged);
    };

    if claimed.get(..9) == timestamp.get(..9) {
        return Ok(Proposal::Unchanged);
    }

    let proposed = format!("{}{}", timestamp, rest);
    match prompter.confirm_correction(name, &proposed) {
        Confirmation::Yes => Ok(Proposal::Rename(file.sibling(&proposed))),
        Confirmation::No => Ok(Proposal::Unchanged),
        Confirmation::Cancel => Err(Cancelled),
    }
}

fn prefix(
    metadata: &FileMetadata<'_>,
    resolver: &mut IdentityResolver,
    prompter: &mut dyn Prompter,
) -> Result<Proposal, Cancelled> {
    let file = metadata.file();
    if is_already_handled(&file.file_name) {
        return Ok(Proposal::Unchanged);
    }
    let Some(timestamp) = metadata.timestamp_text() else {
        return Ok(Proposal::Unchanged);
    };
    let identity = resolver.resolve_for(metadata, prompter)?;

    let new_name = format!(
        "{}-{}",
        timestamp_identity_prefix(&timestamp, &identity),
        sanitize_name(&file.file_name.to_lowercase())
    );
    Ok(Proposal::Rename(file.sibling(&new_name)))
}

fn strip_prefix(
    pattern: &Regex,
    metadata: &FileMetadata<'_>,
    resolver: &mut IdentityResolver,
    prompter: &mut dyn Prompter,
) -> Result<Proposal, Cancelled> {
    let file = metadata.file();
    let lower = file.file_name.to_lowercase();
    let stripped = pattern.replace_all(&lower, "");
    if stripped == lower || stripped.is_empty() {
        return Ok(Proposal::Unchanged);
    }
    let Some(timestamp) = metadata.timestamp_text() else {
        return Ok(Proposal::Unchanged);
    };
    let identity = resolver.resolve_for(metadata, prompter)?;

    let separator = if stripped.starts_with(['.', '-', '_']) {
        ""
    } else {
        "-"
    };
    let new_name = format!(
        "{}{}{}",
        timestamp_identity_prefix(&timestamp, &identity),
        separator,
        sanitize_name(&stripped)
    );
    Ok(Proposal::Rename(file.sibling(&new_name)))
}

fn replace(pattern: &Regex, replacement: &str, metadata: &FileMetadata<'_>) -> Proposal {
    let file = metadata.file();
    let lower = file.file_name.to_lowercase();
    let replaced = pattern.replace_all(&lower, NoExpand(replacement));
    let replaced = sanitize_name_keep_dash(&replaced);
    if replaced == lower || replaced.is_empty() {
        return Proposal::Unchanged;
    }
    Proposal::Rename(file.sibling(&replaced))
}

fn time_shift(minutes: i64, metadata: &FileMetadata<'_>) -> Proposal {
    let file = metadata.file();
    let name = file.file_name.as_str();
    let Some(shifted) = name
        .get(..CANONICAL_LEN)
        .and_then(parse_canonical)
        .zip(TimeDelta::try_minutes(minutes))
        .and_then(|(stamp, delta)| stamp.checked_add_signed(delta))
    else {
        return Proposal::Unchanged;
    };
    let rest = sanitize_name_keep_dash(&name[CANONICAL_LEN..]);
    let new_name = format!("{}{}", render_canonical(&shifted), rest);
    Proposal::Rename(file.sibling(&new_name))
}
