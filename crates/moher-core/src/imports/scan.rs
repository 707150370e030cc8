//! Import specifier scanner.
//!
//! Scans JavaScript source for import/export specifiers without a full
//! parse, returning the exact byte range of each specifier so callers
//! can rewrite it in place.

/// One import/export specifier occurrence.
///
/// `start..end` is the half-open byte range of the specifier text
/// (quotes excluded) in the scanned source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpan {
    pub start: usize,
    pub end: usize,
    /// Specifier exactly as found.
    pub specifier: String,
}

impl ImportSpan {
    fn from_range(source: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            specifier: source[start..end].to_string(),
        }
    }
}

/// Scan source code for import/export specifier occurrences.
///
/// Recognizes static imports (`import ... from "x"`, `import "x"`),
/// re-exports (`export ... from "x"`), and dynamic `import("x")`.
/// Line and block comments are skipped. Every occurrence produces its
/// own span; spans come back in source order and never overlap.
#[must_use]
pub fn scan_import_spans(source: &str) -> Vec<ImportSpan> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < len {
        // Skip single-line comments
        if i + 1 < len && bytes[i] == b'/' && bytes[i + 1] == b'/' {
            while i < len && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Skip block comments
        if i + 1 < len && bytes[i] == b'/' && bytes[i + 1] == b'*' {
            i += 2;
            while i + 1 < len && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i += 2;
            continue;
        }

        // import ... from "..." / import "..." / import("...")
        if matches_keyword(bytes, i, b"import") {
            let start_i = i;
            if let Some((s, e, next)) = scan_import_statement(bytes, i + 6) {
                spans.push(ImportSpan::from_range(source, s, e));
                i = next;
                continue;
            }
            i = start_i + 1;
            continue;
        }

        // export ... from "..."
        if matches_keyword(bytes, i, b"export") {
            let start_i = i;
            if let Some((s, e, next)) = scan_export_from(bytes, i + 6) {
                spans.push(ImportSpan::from_range(source, s, e));
                i = next;
                continue;
            }
            i = start_i + 1;
            continue;
        }

        i += 1;
    }

    spans
}

/// Check if bytes at position match a keyword (with word boundary).
fn matches_keyword(bytes: &[u8], pos: usize, keyword: &[u8]) -> bool {
    let len = keyword.len();
    if pos + len > bytes.len() {
        return false;
    }
    if pos > 0 && is_ident_byte(bytes[pos - 1]) {
        return false;
    }
    if &bytes[pos..pos + len] != keyword {
        return false;
    }
    if pos + len < bytes.len() && is_ident_byte(bytes[pos + len]) {
        return false;
    }
    true
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\'' || b == b'`'
}

/// Scan a quoted string starting at `pos` (which must be the opening
/// quote). Returns the inner byte range and the position just past the
/// closing quote.
fn scan_string(bytes: &[u8], pos: usize) -> Option<(usize, usize, usize)> {
    let quote = bytes[pos];
    let mut i = pos + 1;
    let start = i;
    while i < bytes.len() && bytes[i] != quote {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            i += 2;
            continue;
        }
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    Some((start, i, i + 1))
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Scan an import statement beginning just past the `import` keyword.
/// Returns (specifier start, specifier end, resume position).
fn scan_import_statement(bytes: &[u8], start: usize) -> Option<(usize, usize, usize)> {
    let len = bytes.len();
    let mut i = skip_whitespace(bytes, start);

    // Dynamic import: import("...")
    if i < len && bytes[i] == b'(' {
        i = skip_whitespace(bytes, i + 1);
        if i < len && is_quote(bytes[i]) {
            return scan_string(bytes, i);
        }
        return None;
    }

    // Side-effect import or a clause followed by "from"
    while i < len {
        if matches_keyword(bytes, i, b"from") {
            let j = skip_whitespace(bytes, i + 4);
            if j < len && is_quote(bytes[j]) {
                return scan_string(bytes, j);
            }
        }

        if is_quote(bytes[i]) {
            return scan_string(bytes, i);
        }

        if bytes[i] == b';' {
            break;
        }

        i += 1;

        // Safety limit to avoid runaway scans on pathological input
        if i > start + 1000 {
            break;
        }
    }

    None
}

/// Scan an `export ... from "..."` statement beginning just past the
/// `export` keyword.
fn scan_export_from(bytes: &[u8], start: usize) -> Option<(usize, usize, usize)> {
    let len = bytes.len();
    let limit = (start + 500).min(len);
    let mut i = start;

    while i < limit {
        if matches_keyword(bytes, i, b"from") {
            let j = skip_whitespace(bytes, i + 4);
            if j < len && is_quote(bytes[j]) {
                return scan_string(bytes, j);
            }
        }
        // A bare `export default ...` or `export const ...` never has a
        // specifier; stop at the statement end.
        if bytes[i] == b';' {
            break;
        }
        i += 1;
    }

    None
}
