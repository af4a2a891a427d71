use crate::date_parser::{parse_canonical, CANONICAL_LEN};
use crate::identity::IdentityResolver;
use crate::metadata::FileMetadata;
use crate::prompt::{Cancelled, Prompter};
use crate::rules::Proposal;
use crate::sanitize::{is_already_handled, sanitize_name};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_SAMSUNG_ACE_MAX_NAME_LEN: usize = 30;

static DATE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(19|20)\d\d(0[1-9]|1[012])(0[1-9]|[12][0-9]|3[01])$")
        .expect("date token regex must compile")
});
static CANON_STOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(IMG|MVI)_\d{4}\.[a-z0-9]+$").expect("canon regex must compile")
});
static NIKON_STOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(DSC_|DSCN)\d{4}\.[a-z0-9]+$").expect("nikon regex must compile")
});
static HTC_STOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(IMG|VID)_(\d{8}_\d{6})").expect("htc regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    // Galaxy S2/S3/Tab: `[PREFIX_]yyyyMMdd_HHmmss...`
    Samsung,
    // Galaxy Ace: `yyyy-MM-dd HH.mm.ss.jpg` or `video-yyyy-MM-dd-HH-mm-ss.mp4`
    SamsungAce { max_name_len: usize },
    // `IMG_dddd` / `MVI_dddd`
    Canon,
    // `DSC_dddd` / `DSCNdddd`
    Nikon,
    // `IMG_yyyyMMdd_HHmmss` / `VID_yyyyMMdd_HHmmss`
    Htc,
}

impl Device {
    pub fn compute_target(
        &self,
        metadata: &FileMetadata<'_>,
        resolver: &mut IdentityResolver,
        prompter: &mut dyn Prompter,
    ) -> Result<Proposal, Cancelled> {
        let file = metadata.file();
        let name = file.file_name.as_str();

        let new_name = match self {
            Device::Samsung => {
                let Some((timestamp, prefix)) = samsung_parts(name) else {
                    return Ok(Proposal::Unchanged);
                };
                let identity = resolver.resolve_for(metadata, prompter)?;
                let mut out = timestamp.to_string();
                if !identity.is_empty() {
                    out.push('-');
                    out.push_str(&identity);
                }
                if !prefix.is_empty() {
                    out.push('-');
                    out.push_str(&prefix.to_lowercase());
                }
                out.push_str(&file.extension);
                out
            }
            Device::SamsungAce { max_name_len } => {
                if name.chars().count() > *max_name_len {
                    return Ok(Proposal::Unchanged);
                }
                let Some(timestamp) = samsung_ace_timestamp(name) else {
                    return Ok(Proposal::Unchanged);
                };
                format!("{}-samsung_ace{}", timestamp, file.extension)
            }
            Device::Canon | Device::Nikon => {
                let (pattern, tag) = match self {
                    Device::Canon => (&*CANON_STOCK_RE, "canon"),
                    _ => (&*NIKON_STOCK_RE, "nikon"),
                };
                if !pattern.is_match(name) {
                    return Ok(Proposal::Unchanged);
                }
                let Some(timestamp) = metadata.timestamp_text() else {
                    return Ok(Proposal::Unchanged);
                };
                format!("{}-{}-{}", timestamp, tag, sanitize_name(&name.to_lowercase()))
            }
            Device::Htc => {
                let Some(timestamp) = HTC_STOCK_RE
                    .captures(name)
                    .and_then(|caps| caps.get(2))
                    .map(|m| m.as_str())
                    .filter(|stamp| parse_canonical(stamp).is_some())
                else {
                    return Ok(Proposal::Unchanged);
                };
                format!("{}-htc{}", timestamp, file.extension)
            }
        };

        Ok(Proposal::Rename(file.sibling(&new_name)))
    }
}

fn samsung_parts(name: &str) -> Option<(&str, &str)> {
    if is_already_handled(name) {
        return None;
    }
    let token = name.split('_').next().unwrap_or(name);
    let (prefix, start) = if DATE_TOKEN_RE.is_match(token) {
        ("", 0)
    } else {
        (token, token.len() + 1)
    };
    let timestamp = name.get(start..start + CANONICAL_LEN)?;
    parse_canonical(timestamp)?;
    Some((timestamp, prefix))
}

fn samsung_ace_timestamp(name: &str) -> Option<String> {
    let body = name.strip_prefix("video-").unwrap_or(name);
    let stamp = body.get(..19)?;
    if !stamp.is_ascii() {
        return None;
    }
    let separators = [4usize, 7, 10, 13, 16];
    if separators
        .iter()
        .any(|&idx| stamp.as_bytes()[idx].is_ascii_alphanumeric())
    {
        return None;
    }
    let out = format!(
        "{}{}{}_{}{}{}",
        &stamp[0..4],
        &stamp[5..7],
        &stamp[8..10],
        &stamp[11..13],
        &stamp[14..16],
        &stamp[17..19]
    );
    parse_canonical(&out)?;
    Some(out)
}
