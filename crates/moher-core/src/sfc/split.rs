//! Component module splitting.
//!
//! One physical component file answers two requests. The default
//! request gets a synthetic module that binds the script's default
//! export to `__script`, imports the compiled template from the same
//! path with `?type=template`, and wires the render function on before
//! re-exporting. The template request gets compiler output alone.

use crate::error::Error;
use crate::sfc::{parse_sfc, template};
use regex_lite::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// `export default` at a statement boundary: start of text, or after a
/// newline or semicolon. Occurrences inside strings or comments on the
/// same statement boundary shape would also match; that is the
/// documented behavior of this rewrite.
fn export_default_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"((?:^|\n|;)\s*)export default").unwrap())
}

/// Build the wired logic module for a component.
///
/// `request_path` is the URL path the component was requested at; the
/// template import re-uses it with the `type=template` selector so the
/// browser fetches the second virtual module from the same file.
pub fn default_module(source: &str, request_path: &str) -> crate::Result<String> {
    let descriptor = parse_sfc(source)?;
    let mut code = String::new();

    if let Some(script) = &descriptor.script {
        code.push_str(&export_default_re().replace(&script.content, "${1}const __script ="));
    } else {
        code.push_str("const __script = {};");
    }

    if descriptor.template.is_some() {
        code.push_str(&format!(
            "\nimport {{ render as __render }} from \"{request_path}?type=template\""
        ));
        code.push_str("\n__script.render = __render");
    }

    code.push_str("\nexport default __script");
    Ok(code)
}

/// Build the compiled-template module for a component.
///
/// Fails when the component has no template block; compiler diagnostics
/// pass through unmodified.
pub fn template_module(source: &str, path: &Path) -> crate::Result<String> {
    let descriptor = parse_sfc(source)?;
    let block = descriptor.template.ok_or_else(|| Error::MissingTemplate {
        path: path.to_path_buf(),
    })?;
    template::compile(&block.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = r#"<template>
  <div>{{ msg }}</div>
</template>

<script>
export default {
  data() {
    return { msg: "hello" };
  },
};
</script>
"#;

    #[test]
    fn test_default_module_wiring() {
        let code = default_module(APP, "/App.vue").unwrap();
        assert!(code.contains("const __script = {"));
        assert!(!code.contains("export default {"));
        assert!(code.contains(r#"import { render as __render } from "/App.vue?type=template""#));
        assert!(code.contains("__script.render = __render"));
        assert!(code.trim_end().ends_with("export default __script"));
    }

    #[test]
    fn test_template_module_is_compiler_output_only() {
        let code = template_module(APP, Path::new("/App.vue")).unwrap();
        assert!(code.contains("export function render"));
        // Script content never leaks into the template module.
        assert!(!code.contains("__script"));
        assert!(!code.contains("data()"));
    }

    #[test]
    fn test_no_script_block_synthesizes_empty_object() {
        let source = "<template><p>hi</p></template>";
        let code = default_module(source, "/Bare.vue").unwrap();
        assert!(code.contains("const __script = {};"));
        assert!(code.contains("/Bare.vue?type=template"));
        assert!(code.contains("export default __script"));
    }

    #[test]
    fn test_no_template_block_skips_render_wiring() {
        let source = "<script>\nexport default { name: \"plain\" }\n</script>";
        let code = default_module(source, "/Plain.vue").unwrap();
        assert!(code.contains("const __script = { name: \"plain\" }"));
        assert!(!code.contains("type=template"));
        assert!(!code.contains("__render"));
        assert!(code.contains("export default __script"));
    }

    #[test]
    fn test_template_request_without_template_fails() {
        let source = "<script>export default {}</script>";
        let err = template_module(source, Path::new("/Plain.vue")).unwrap_err();
        assert!(matches!(err, Error::MissingTemplate { .. }));
    }

    #[test]
    fn test_export_default_after_semicolon() {
        let source = "<script>const n = 1;export default { n }</script>";
        let code = default_module(source, "/X.vue").unwrap();
        assert!(code.contains("const n = 1;const __script = { n }"));
    }

    #[test]
    fn test_export_default_mid_statement_not_rewritten() {
        // `export default` not at a statement boundary stays untouched.
        let source = "<script>\nconst s = \"x\"; let t = s + \"export default\";\nexport default { t }\n</script>";
        let code = default_module(source, "/X.vue").unwrap();
        assert!(code.contains("const __script = { t }"));
    }

    #[test]
    fn test_leading_whitespace_preserved_by_rewrite() {
        let source = "<script>\n  export default { a: 1 }\n</script>";
        let code = default_module(source, "/X.vue").unwrap();
        assert!(code.contains("\n  const __script = { a: 1 }"));
    }
}
