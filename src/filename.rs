//! Upload filename checks and the storage key scheme
//!
//! Keys are always `uploads/<sanitized name>`, so the same name maps to the
//! same object and a later upload replaces an earlier one.

use unicode_normalization::UnicodeNormalization;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub const KEY_PREFIX: &str = "uploads/";

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Whether the text after the last `.` is one of [`ALLOWED_EXTENSIONS`].
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduce an untrusted filename to something safe to embed in a key.
///
/// Accented letters are decomposed (NFKD) so their ASCII base survives.
/// Path separators turn into word breaks, whitespace runs collapse to `_`,
/// and anything outside `[A-Za-z0-9._-]` is dropped. The result can be
/// empty when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|device| device.eq_ignore_ascii_case(stem))
    {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

pub fn storage_key(sanitized: &str) -> String {
    format!("{}{}", KEY_PREFIX, sanitized)
}
