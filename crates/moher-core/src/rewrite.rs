//! Bare import rewriting for unbundled serving.
//!
//! Scans JavaScript response bodies for import/export specifiers and
//! rewrites bare ones (`vue`, `@scope/pkg`, `lib/sub`) into the reserved
//! `/@modules/` namespace so the browser sends them back as resolvable
//! requests. Relative and absolute specifiers already resolve against
//! the serving root and pass through untouched.

use crate::imports::scan_import_spans;
use crate::splice::Splicer;

/// Reserved namespace for server-resolved bare modules.
pub const MODULE_PREFIX: &str = "/@modules/";

/// True if `specifier` names a package rather than a path.
///
/// A bare specifier starts with neither `.` nor `/`. Scoped package
/// names and sub-path imports are bare in their entirety.
#[must_use]
pub fn is_bare(specifier: &str) -> bool {
    match specifier.as_bytes().first() {
        Some(b'.' | b'/') | None => false,
        Some(_) => true,
    }
}

/// Rewrite every bare specifier in `source` to `/@modules/<specifier>`.
///
/// Purely syntactic; nothing is fetched or validated. Input with no
/// bare specifiers comes back byte-for-byte identical.
pub fn rewrite_imports(source: &str) -> crate::Result<String> {
    let spans = scan_import_spans(source);
    let mut ms = Splicer::new(source);

    for span in &spans {
        if is_bare(&span.specifier) {
            ms.overwrite(span.start, span.end, format!("{MODULE_PREFIX}{}", span.specifier))?;
        }
    }

    Ok(ms.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(!is_bare("./a"));
        assert!(!is_bare("../a"));
        assert!(!is_bare("/a"));
        assert!(!is_bare(""));
        assert!(is_bare("a"));
        assert!(is_bare("@scope/a"));
        assert!(is_bare("a/sub"));
    }

    #[test]
    fn test_rewrites_bare_specifier() {
        let source = r#"import { createApp } from "vue";"#;
        let out = rewrite_imports(source).unwrap();
        assert_eq!(out, r#"import { createApp } from "/@modules/vue";"#);
    }

    #[test]
    fn test_rewrites_full_specifier_text() {
        let out = rewrite_imports(r#"import x from "@scope/name"; import y from "lib/sub";"#).unwrap();
        assert!(out.contains(r#""/@modules/@scope/name""#));
        assert!(out.contains(r#""/@modules/lib/sub""#));
    }

    #[test]
    fn test_relative_and_absolute_pass_through() {
        let source = r#"import a from "./a"; import b from "/b.js"; import c from "../c";"#;
        assert_eq!(rewrite_imports(source).unwrap(), source);
    }

    #[test]
    fn test_no_imports_is_byte_identical() {
        let source = "const x = 1;\n// import nothing\nconsole.log(x);\n";
        assert_eq!(rewrite_imports(source).unwrap(), source);
    }

    #[test]
    fn test_span_independence() {
        let source = r#"import x from "vue"; import y from "foo""#;
        let out = rewrite_imports(source).unwrap();
        assert_eq!(
            out,
            r#"import x from "/@modules/vue"; import y from "/@modules/foo""#
        );
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let source = "  import x from 'vue' ;\nconst keep = 'vue';\n";
        let out = rewrite_imports(source).unwrap();
        assert!(out.starts_with("  import x from '/@modules/vue' ;\n"));
        // Only the specifier position is touched, not other occurrences
        // of the same text.
        assert!(out.ends_with("const keep = 'vue';\n"));
    }

    #[test]
    fn test_already_rewritten_not_doubled() {
        let source = r#"import x from "/@modules/vue";"#;
        assert_eq!(rewrite_imports(source).unwrap(), source);
    }

    #[test]
    fn test_dynamic_import_rewritten() {
        let out = rewrite_imports("const m = import('vue');").unwrap();
        assert_eq!(out, "const m = import('/@modules/vue');");
    }

    #[test]
    fn test_export_from_rewritten() {
        let out = rewrite_imports(r#"export { ref } from "vue";"#).unwrap();
        assert_eq!(out, r#"export { ref } from "/@modules/vue";"#);
    }
}
