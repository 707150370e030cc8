//! Component descriptor parsing.
//!
//! Extracts the first top-level `<script>` and `<template>` blocks from
//! component source. Both blocks are optional; a missing block is simply
//! `None`. An opened but never closed block is a parse error.

use crate::error::Error;

/// One raw block of a component file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock {
    /// Raw text between the open and close tags.
    pub content: String,
}

/// Parsed component source: script and template contributions.
#[derive(Debug, Clone, Default)]
pub struct SfcDescriptor {
    pub script: Option<SfcBlock>,
    pub template: Option<SfcBlock>,
}

/// Parse component source into a descriptor.
pub fn parse_sfc(source: &str) -> crate::Result<SfcDescriptor> {
    Ok(SfcDescriptor {
        script: extract_block(source, "script")?,
        template: extract_block(source, "template")?,
    })
}

/// Extract the first `<tag ...>...</tag>` block, honoring quoted
/// attribute values and same-tag nesting (`<template>` may contain
/// nested `<template>` elements).
fn extract_block(source: &str, tag: &str) -> crate::Result<Option<SfcBlock>> {
    let bytes = source.as_bytes();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut from = 0;
    let start = loop {
        let Some(pos) = find_from(source, &open, from) else {
            return Ok(None);
        };
        // Reject prefixes like `<templates>`.
        match bytes.get(pos + open.len()) {
            Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/') | None => break pos,
            Some(_) => from = pos + open.len(),
        }
    };

    let tag_end = find_closing_angle(bytes, start + open.len()).ok_or_else(|| {
        Error::parse(format!("unclosed <{tag}> tag at byte {start}"))
    })?;

    // Self-closing open tag carries no content.
    if bytes[tag_end - 1] == b'/' {
        return Ok(Some(SfcBlock {
            content: String::new(),
        }));
    }

    let content_start = tag_end + 1;
    let mut depth = 1usize;
    let mut cursor = content_start;
    loop {
        let next_close = find_from(source, &close, cursor)
            .ok_or_else(|| Error::parse(format!("missing {close} for block at byte {start}")))?;
        // Count same-tag openings between here and that closing tag.
        let mut probe = cursor;
        while let Some(pos) = find_from(source, &open, probe) {
            if pos >= next_close {
                break;
            }
            if matches!(
                bytes.get(pos + open.len()),
                Some(b' ' | b'\t' | b'\n' | b'\r' | b'>')
            ) {
                depth += 1;
            }
            probe = pos + open.len();
        }
        depth -= 1;
        cursor = next_close + close.len();
        if depth == 0 {
            return Ok(Some(SfcBlock {
                content: source[content_start..next_close].to_string(),
            }));
        }
    }
}

fn find_from(source: &str, needle: &str, from: usize) -> Option<usize> {
    source.get(from..)?.find(needle).map(|pos| from + pos)
}

/// Find the `>` ending an open tag, skipping quoted attribute values.
fn find_closing_angle(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i),
            b'"' | b'\'' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = r#"<template>
  <div id="app">{{ msg }}</div>
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
    fn test_both_blocks() {
        let desc = parse_sfc(APP).unwrap();
        assert!(desc.template.as_ref().unwrap().content.contains("{{ msg }}"));
        assert!(desc.script.as_ref().unwrap().content.contains("export default"));
    }

    #[test]
    fn test_missing_script_is_none() {
        let desc = parse_sfc("<template><p>hi</p></template>").unwrap();
        assert!(desc.script.is_none());
        assert!(desc.template.is_some());
    }

    #[test]
    fn test_missing_template_is_none() {
        let desc = parse_sfc("<script>export default {}</script>").unwrap();
        assert!(desc.template.is_none());
        assert!(desc.script.is_some());
    }

    #[test]
    fn test_empty_source() {
        let desc = parse_sfc("").unwrap();
        assert!(desc.script.is_none());
        assert!(desc.template.is_none());
    }

    #[test]
    fn test_attributes_on_open_tag() {
        let desc = parse_sfc(r#"<script lang="js" setup>const a = 1</script>"#).unwrap();
        assert_eq!(desc.script.unwrap().content, "const a = 1");
    }

    #[test]
    fn test_quoted_angle_in_attribute() {
        let desc = parse_sfc(r#"<template data-x="a > b"><p>ok</p></template>"#).unwrap();
        assert_eq!(desc.template.unwrap().content, "<p>ok</p>");
    }

    #[test]
    fn test_nested_template_elements() {
        let source = "<template><div><template v-if=\"x\"><p>inner</p></template></div></template>";
        let desc = parse_sfc(source).unwrap();
        assert_eq!(
            desc.template.unwrap().content,
            "<div><template v-if=\"x\"><p>inner</p></template></div>"
        );
    }

    #[test]
    fn test_unclosed_block_is_parse_error() {
        assert!(parse_sfc("<script>export default {}").is_err());
    }

    #[test]
    fn test_self_closing_block_is_empty() {
        let desc = parse_sfc("<script />\n<template><p>x</p></template>").unwrap();
        assert_eq!(desc.script.unwrap().content, "");
    }

    #[test]
    fn test_similar_tag_name_not_matched() {
        let desc = parse_sfc("<templates><p>no</p></templates>").unwrap();
        assert!(desc.template.is_none());
    }
}
