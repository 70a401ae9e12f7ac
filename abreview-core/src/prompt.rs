//! Human-readable prompt labels derived from generated video filenames.
//!
//! Generated clips are named like `a1b2c3d4_sunset_beach_seed42_share.mp4`:
//! an 8-hex-digit job prefix, the prompt with underscores, a seed marker, and
//! optional post-processing suffixes. [`extract_prompt`] peels those layers off
//! one at a time; a layer that is not present is simply skipped.

use std::sync::LazyLock;

use regex::Regex;

/// Video container extensions recognised at the end of a filename.
pub const VIDEO_EXTENSIONS: &[&str] =
    &["mp4", "mov", "avi", "mkv", "webm", "flv", "wmv", "m4v", "3gp", "ts"];

static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\.(?:{})$", VIDEO_EXTENSIONS.join("|"))).expect("valid regex")
});
static HEX_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-f0-9]{8}_").expect("valid regex"));
static SEED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_seed\d+.*$").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Post-processing markers, stripped in this order, each at most once.
const TRAILING_MARKERS: &[&str] = &["_share", "_compressed", "_enhanced", "_final"];

/// Derives a display label from a raw video filename.
///
/// Never fails; a filename made only of noise tokens yields an empty string.
///
/// ```
/// use abreview_core::prompt::extract_prompt;
/// assert_eq!(extract_prompt("a1b2c3d4_sunset_beach_seed42_share.mp4"), "Sunset beach");
/// ```
pub fn extract_prompt(filename: &str) -> String {
    let name = EXTENSION_RE.replace(filename, "");
    let name = HEX_PREFIX_RE.replace(&name, "");
    let name = SEED_RE.replace(&name, "");

    let mut name: &str = &name;
    for marker in TRAILING_MARKERS {
        name = strip_suffix_ignore_case(name, marker);
    }

    let spaced = name.replace('_', " ");
    let collapsed = WHITESPACE_RE.replace_all(&spaced, " ");
    capitalize_first(collapsed.trim())
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> &'a str {
    if s.len() < suffix.len() {
        return s;
    }
    let split = s.len() - suffix.len();
    match s.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(suffix) => &s[..split],
        _ => s,
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
