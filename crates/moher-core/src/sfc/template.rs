//! Template compilation.
//!
//! Compiles a component's template block into a JavaScript module
//! exporting a `render` function. The generated code imports its
//! helpers from the bare specifier `"vue"`; the outer rewrite stage
//! turns that into a `/@modules/vue` request before the browser sees it.
//!
//! The compiler is deliberately small: elements, text, and `{{ expr }}`
//! interpolations. Malformed input (unclosed tags, unterminated
//! interpolations) surfaces as a compile diagnostic.

use crate::error::Error;

#[derive(Debug, Clone)]
enum Node {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
    Interpolation(String),
}

/// Compile template source into render-function JavaScript.
pub fn compile(template: &str) -> crate::Result<String> {
    let mut parser = Parser {
        source: template,
        bytes: template.as_bytes(),
        pos: 0,
    };
    let roots = parser.parse_children(None)?;

    let body = match roots.len() {
        0 => "null".to_string(),
        1 => gen_node(&roots[0]),
        _ => {
            let items: Vec<String> = roots.iter().map(gen_node).collect();
            format!("[\n    {}\n  ]", items.join(",\n    "))
        }
    };

    Ok(format!(
        "import {{ h as _h, toDisplayString as _toDisplayString, createTextVNode as _createTextVNode }} from \"vue\"\n\
         \n\
         export function render(_ctx, _cache) {{\n  return {body}\n}}\n"
    ))
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

/// Elements with no closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "area", "col", "wbr"];

impl Parser<'_> {
    /// Parse sibling nodes until end of input or the closing tag of
    /// `parent`, whichever comes first.
    fn parse_children(&mut self, parent: Option<&str>) -> crate::Result<Vec<Node>> {
        let mut nodes = Vec::new();

        while self.pos < self.bytes.len() {
            if self.starts_with("{{") {
                nodes.push(self.parse_interpolation()?);
            } else if self.starts_with("</") {
                let Some(parent) = parent else {
                    return Err(Error::compile(format!(
                        "unexpected closing tag at byte {}",
                        self.pos
                    )));
                };
                self.consume_closing_tag(parent)?;
                return Ok(nodes);
            } else if self.starts_with("<!--") {
                self.skip_comment()?;
            } else if self.bytes[self.pos] == b'<' {
                nodes.push(self.parse_element()?);
            } else {
                let text = self.take_text();
                if !text.trim().is_empty() {
                    nodes.push(Node::Text(text));
                }
            }
        }

        if let Some(parent) = parent {
            return Err(Error::compile(format!("missing closing tag </{parent}>")));
        }
        Ok(nodes)
    }

    fn skip_comment(&mut self) -> crate::Result<()> {
        let end = self.find_from("-->", self.pos + 4).ok_or_else(|| {
            Error::compile(format!("unterminated comment at byte {}", self.pos))
        })?;
        self.pos = end + 3;
        Ok(())
    }

    fn parse_interpolation(&mut self) -> crate::Result<Node> {
        let start = self.pos + 2;
        let end = self.find_from("}}", start).ok_or_else(|| {
            Error::compile(format!("unterminated interpolation at byte {}", self.pos))
        })?;
        let expr = self.source[start..end].trim().to_string();
        self.pos = end + 2;
        Ok(Node::Interpolation(expr))
    }

    fn parse_element(&mut self) -> crate::Result<Node> {
        let open_pos = self.pos;
        self.pos += 1; // consume '<'
        let tag = self.take_tag_name();
        if tag.is_empty() {
            return Err(Error::compile(format!(
                "malformed tag at byte {open_pos}"
            )));
        }

        let (attrs, self_closed) = self.parse_attrs(open_pos)?;
        if self_closed || VOID_TAGS.contains(&tag.as_str()) {
            return Ok(Node::Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        }

        let children = self.parse_children(Some(&tag))?;
        Ok(Node::Element {
            tag,
            attrs,
            children,
        })
    }

    /// Parse attributes up to the open tag's `>`. Returns the attribute
    /// list and whether the tag was self-closing.
    fn parse_attrs(&mut self, open_pos: usize) -> crate::Result<(Vec<(String, String)>, bool)> {
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                return Err(Error::compile(format!("unclosed tag at byte {open_pos}")));
            }
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok((attrs, true));
            }
            if self.bytes[self.pos] == b'>' {
                self.pos += 1;
                return Ok((attrs, false));
            }

            let name = self.take_attr_name();
            if name.is_empty() {
                return Err(Error::compile(format!(
                    "malformed attribute at byte {}",
                    self.pos
                )));
            }
            let value = if self.pos < self.bytes.len() && self.bytes[self.pos] == b'=' {
                self.pos += 1;
                self.take_attr_value(open_pos)?
            } else {
                String::new()
            };
            attrs.push((name, value));
        }
    }

    fn take_attr_value(&mut self, open_pos: usize) -> crate::Result<String> {
        if self.pos < self.bytes.len() && matches!(self.bytes[self.pos], b'"' | b'\'') {
            let quote = self.bytes[self.pos];
            let start = self.pos + 1;
            let end = self.bytes[start..]
                .iter()
                .position(|&b| b == quote)
                .map(|off| start + off)
                .ok_or_else(|| {
                    Error::compile(format!("unterminated attribute value at byte {open_pos}"))
                })?;
            self.pos = end + 1;
            Ok(self.source[start..end].to_string())
        } else {
            let start = self.pos;
            while self.pos < self.bytes.len()
                && !self.bytes[self.pos].is_ascii_whitespace()
                && self.bytes[self.pos] != b'>'
            {
                self.pos += 1;
            }
            Ok(self.source[start..self.pos].to_string())
        }
    }

    fn consume_closing_tag(&mut self, expected: &str) -> crate::Result<()> {
        let close = format!("</{expected}>");
        if self.starts_with(&close) {
            self.pos += close.len();
            Ok(())
        } else {
            Err(Error::compile(format!(
                "mismatched closing tag at byte {}, expected </{expected}>",
                self.pos
            )))
        }
    }

    fn take_text(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && self.bytes[self.pos] != b'<'
            && !self.starts_with("{{")
        {
            self.pos += 1;
        }
        self.source[start..self.pos].to_string()
    }

    fn take_tag_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'-')
        {
            self.pos += 1;
        }
        self.source[start..self.pos].to_string()
    }

    fn take_attr_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && !self.bytes[self.pos].is_ascii_whitespace()
            && !matches!(self.bytes[self.pos], b'=' | b'>' | b'/')
        {
            self.pos += 1;
        }
        self.source[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    // Byte-based so the check is safe while the cursor sits inside a
    // multibyte character in text content.
    fn starts_with(&self, needle: &str) -> bool {
        self.bytes[self.pos..].starts_with(needle.as_bytes())
    }

    fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        self.source.get(from..)?.find(needle).map(|pos| from + pos)
    }
}

fn gen_node(node: &Node) -> String {
    match node {
        Node::Text(text) => format!("_createTextVNode({})", js_string(text)),
        Node::Interpolation(expr) => {
            format!("_createTextVNode(_toDisplayString({}))", scope_expr(expr))
        }
        Node::Element {
            tag,
            attrs,
            children,
        } => {
            let props = if attrs.is_empty() {
                "null".to_string()
            } else {
                let pairs: Vec<String> = attrs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", js_string(k), js_string(v)))
                    .collect();
                format!("{{ {} }}", pairs.join(", "))
            };
            let kids = match children.len() {
                0 => "null".to_string(),
                _ => {
                    let items: Vec<String> = children.iter().map(gen_node).collect();
                    format!("[{}]", items.join(", "))
                }
            };
            format!("_h({}, {props}, {kids})", js_string(tag))
        }
    }
}

/// Prefix plain identifiers with the render context; anything more
/// complex is emitted as written.
fn scope_expr(expr: &str) -> String {
    let is_ident = !expr.is_empty()
        && expr
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        && !expr.as_bytes()[0].is_ascii_digit();
    if is_ident {
        format!("_ctx.{expr}")
    } else {
        format!("({expr})")
    }
}

fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
