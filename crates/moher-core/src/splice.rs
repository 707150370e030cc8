//! Position-preserving string splicing.
//!
//! Replacements are planned against byte offsets of the *original* text
//! and applied in a single left-to-right pass, so earlier edits never
//! invalidate later offsets. This is the serving-side analog of the
//! overwrite/serialize pattern bundlers use for source rewriting.

use crate::error::Error;

#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// Plans `[start, end)` replacements over one source string and applies
/// them all at once.
#[derive(Debug)]
pub struct Splicer<'a> {
    source: &'a str,
    edits: Vec<Edit>,
}

impl<'a> Splicer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// Plan a replacement of `source[start..end]` with `text`.
    ///
    /// Offsets are byte positions in the original source. Ranges must be
    /// in bounds, on char boundaries, and must not overlap a previously
    /// planned edit.
    pub fn overwrite(&mut self, start: usize, end: usize, text: impl Into<String>) -> crate::Result<()> {
        if start > end || end > self.source.len() {
            return Err(Error::parse(format!(
                "splice range {start}..{end} out of bounds for source of {} bytes",
                self.source.len()
            )));
        }
        if !self.source.is_char_boundary(start) || !self.source.is_char_boundary(end) {
            return Err(Error::parse(format!(
                "splice range {start}..{end} not on char boundaries"
            )));
        }
        if self
            .edits
            .iter()
            .any(|e| start < e.end && e.start < end)
        {
            return Err(Error::parse(format!(
                "splice range {start}..{end} overlaps a planned edit"
            )));
        }
        self.edits.push(Edit {
            start,
            end,
            text: text.into(),
        });
        Ok(())
    }

    /// True if no replacements were planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all planned replacements, preserving every untouched byte.
    #[must_use]
    pub fn finish(mut self) -> String {
        if self.edits.is_empty() {
            return self.source.to_string();
        }
        self.edits.sort_by_key(|e| e.start);

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for edit in &self.edits {
            out.push_str(&self.source[cursor..edit.start]);
            out.push_str(&edit.text);
            cursor = edit.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_edits_is_identity() {
        let src = "const a = 1;\n";
        assert_eq!(Splicer::new(src).finish(), src);
    }

    #[test]
    fn test_single_overwrite() {
        let src = r#"import x from "vue";"#;
        let mut ms = Splicer::new(src);
        ms.overwrite(15, 18, "/@modules/vue").unwrap();
        assert_eq!(ms.finish(), r#"import x from "/@modules/vue";"#);
    }

    #[test]
    fn test_edits_applied_in_source_order() {
        let src = "abc";
        let mut ms = Splicer::new(src);
        // Planned out of order on purpose.
        ms.overwrite(2, 3, "C").unwrap();
        ms.overwrite(0, 1, "A").unwrap();
        assert_eq!(ms.finish(), "AbC");
    }

    #[test]
    fn test_overlap_rejected() {
        let src = "abcdef";
        let mut ms = Splicer::new(src);
        ms.overwrite(1, 4, "x").unwrap();
        assert!(ms.overwrite(3, 5, "y").is_err());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut ms = Splicer::new("ab");
        assert!(ms.overwrite(1, 5, "x").is_err());
    }

    #[test]
    fn test_non_char_boundary_rejected() {
        let mut ms = Splicer::new("héllo");
        assert!(ms.overwrite(1, 2, "x").is_err());
    }
}
