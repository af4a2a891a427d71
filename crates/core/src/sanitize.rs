use once_cell::sync::Lazy;
use regex::Regex;

static CANONICAL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(19|20)\d\d(0[1-9]|1[012])(0[1-9]|[12][0-9]|3[01])_([01]\d|2[0-3])[0-5]\d[0-5]\d-",
    )
    .expect("canonical prefix regex must compile")
});

pub fn is_already_handled(file_name: &str) -> bool {
    CANONICAL_PREFIX_RE.is_match(file_name)
}

pub fn canonical_identity(raw: &str) -> String {
    replace_disallowed(&raw.trim().to_lowercase(), |_| false)
}

pub fn sanitize_name(value: &str) -> String {
    replace_disallowed(value, |ch| ch == '.')
}

pub fn sanitize_name_keep_dash(value: &str) -> String {
    replace_disallowed(value, |ch| ch == '.' || ch == '-')
}

pub fn timestamp_identity_prefix(timestamp: &str, identity: &str) -> String {
    if identity.is_empty() {
        timestamp.to_string()
    } else {
        format!("{}-{}", timestamp, identity)
    }
}

fn replace_disallowed(value: &str, extra_allowed: impl Fn(char) -> bool) -> String {
    value
        .chars()
        .map(|ch| {
            if is_word_char(ch) || extra_allowed(ch) {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
