use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9.]").expect("static regex is valid")
});

/// Replaces every character outside `[A-Za-z0-9.]` with `_`.
///
/// Leading dots are replaced as well so the result never names a hidden
/// file or a parent directory.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(name.trim(), "_");
    let leading_dots = cleaned.len() - cleaned.trim_start_matches('.').len();

    let mut sanitized = "_".repeat(leading_dots);
    sanitized.push_str(&cleaned[leading_dots..]);

    if sanitized.is_empty() {
        "image".to_string()
    } else {
        sanitized
    }
}
