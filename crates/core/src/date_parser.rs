use chrono::{Local, NaiveDateTime, TimeZone, Utc};

pub const CANONICAL_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const CANONICAL_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    // Value is in UTC and is converted to local wall-clock time.
    Utc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    pub layout: &'static str,
    pub zone: Zone,
}

impl DatePattern {
    pub const fn local(layout: &'static str) -> Self {
        Self {
            layout,
            zone: Zone::Local,
        }
    }

    pub const fn utc(layout: &'static str) -> Self {
        Self {
            layout,
            zone: Zone::Utc,
        }
    }
}

pub const EXIF_PATTERNS: &[DatePattern] = &[
    DatePattern::local("%Y:%m:%d %H:%M:%S"),
    DatePattern::local("%Y-%m-%d %H:%M:%S"),
    DatePattern::local("%Y-%m-%dT%H:%M:%S"),
];

// mediainfo emits several layouts depending on container and version.
pub const PROBE_PATTERNS: &[DatePattern] = &[
    DatePattern::local("%a %b %d %H:%M:%S %Y"),
    DatePattern::local("%Y-%m-%d %H:%M:%S"),
    DatePattern::utc("UTC %Y-%m-%d %H:%M:%S"),
    DatePattern::utc("%Y-%m-%d %H:%M:%S UTC"),
];

pub fn parse_first(input: &str, patterns: &[DatePattern]) -> Option<NaiveDateTime> {
    let normalized = input.trim();
    if normalized.is_empty() {
        return None;
    }

    for pattern in patterns {
        let Ok(naive) = NaiveDateTime::parse_from_str(normalized, pattern.layout) else {
            continue;
        };
        return match pattern.zone {
            Zone::Local => Some(naive),
            Zone::Utc => Some(utc_to_local(naive)),
        };
    }

    log::debug!("no date pattern matched {:?}", normalized);
    None
}

pub fn parse_canonical(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, CANONICAL_FORMAT).ok()
}

pub fn render_canonical(value: &NaiveDateTime) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

fn utc_to_local(naive: NaiveDateTime) -> NaiveDateTime {
    Utc.from_utc_datetime(&naive)
        .with_timezone(&Local)
        .naive_local()
}
