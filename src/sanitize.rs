use regex::Regex;
use std::sync::LazyLock;

/// Used when nothing of the plan name survives sanitization.
pub const FALLBACK_FILE_STEM: &str = "xplan";

static OUTSIDE_FILE_NAME_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("file name pattern is valid"));

static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("underscore pattern is valid"));

fn transliterate(c: char) -> Option<&'static str> {
    match c {
        'ä' => Some("ae"),
        'Ä' => Some("Ae"),
        'ö' => Some("oe"),
        'Ö' => Some("Oe"),
        'ü' => Some("ue"),
        'Ü' => Some("Ue"),
        'ß' => Some("ss"),
        _ => None,
    }
}

/// Turns a plan name into a portable file stem.
///
/// Umlauts and ß are transliterated, everything outside `[A-Za-z0-9._-]`
/// becomes `_`, runs of `_` collapse and leading/trailing `_` are trimmed.
/// Applying it twice gives the same result.
pub fn sanitize_file_name(name: &str) -> String {
    let mut transliterated = String::with_capacity(name.len());
    for c in name.chars() {
        match transliterate(c) {
            Some(replacement) => transliterated.push_str(replacement),
            None => transliterated.push(c),
        }
    }

    let replaced = OUTSIDE_FILE_NAME_SET.replace_all(&transliterated, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// File stem for the archive; never empty.
pub fn file_stem(name: &str) -> String {
    let sanitized = sanitize_file_name(name);
    if sanitized.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        sanitized
    }
}
