//! Location tags: `[path:line:col] ` prefixes and the string/template text that carries them.

use std::fmt::Write as _;

pub const UNKNOWN_TAG: &str = "[unknown:0:0] ";

/// Normalize bundler/debugger style filenames: forward slashes, no `file://` scheme.
pub fn normalize_filename(filename: &str) -> String {
    let s = filename.replace('\\', "/");
    if let Some(rest) = s.strip_prefix("file:///") {
        // keep the root for unix paths, drop it before a drive letter
        if has_drive_letter(rest) {
            return rest.to_string();
        }
        return format!("/{rest}");
    }
    if let Some(rest) = s.strip_prefix("file://") {
        return rest.to_string();
    }
    s
}

fn has_drive_letter(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

fn is_absolute(s: &str) -> bool {
    s.starts_with('/') || has_drive_letter(s)
}

fn segments(s: &str) -> Vec<&str> {
    s.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect()
}

/// Lexical relative path from `base` to `path`, both normalized first.
///
/// Relative inputs are already relative to the project and come back as-is
/// (minus a leading `./`). Without a base the normalized path is returned.
pub fn relative_path(base: Option<&str>, path: &str) -> String {
    let path = normalize_filename(path);
    if !is_absolute(&path) {
        return segments(&path).join("/");
    }
    let Some(base) = base else {
        return path;
    };
    let base = normalize_filename(base);
    if !is_absolute(&base) {
        return path;
    }

    let from = segments(&base);
    let to = segments(&path);
    // different drives share nothing
    if from.first().map(|s| has_drive_letter(s)) == Some(true)
        && !from[0].eq_ignore_ascii_case(to.first().copied().unwrap_or_default())
    {
        return path;
    }

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut out: Vec<&str> = std::iter::repeat("..").take(from.len() - common).collect();
    out.extend_from_slice(&to[common..]);
    out.join("/")
}

pub fn format_tag(path: &str, line: usize, col: usize) -> String {
    format!("[{}:{}:{}] ", path, line, col)
}

/// Double-quoted JS string literal source for `value`.
///
/// Only characters that cannot appear raw inside the quotes are escaped;
/// non-ASCII text is written through unchanged.
pub fn quote_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() && (c as u32) < 0x100 => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escape `text` for use as raw template-literal text.
pub fn escape_template_raw(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}
