use regex::Regex;
use tracing::debug;

use crate::error::Result;
use super::model::{DocFragment, DocText, DocumentationNode, TagWrapper};

/// Parses `/** ... */` comments into [`DocumentationNode`]s
pub struct JavadocParser {
    /// Opening of an inline tag, `{@tag `
    inline_tag_regex: Regex,

    /// Block tag at the start of a line, `@param name text`
    block_tag_regex: Regex,
}

impl JavadocParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inline_tag_regex: Regex::new(r"^\{@(\w+)\s*")?,
            block_tag_regex: Regex::new(r"^@(\w+)(?:\s+|$)")?,
        })
    }

    /// Parse a raw comment; a missing comment yields an empty node
    pub fn parse(&self, comment: Option<&str>) -> DocumentationNode {
        let Some(comment) = comment else {
            return DocumentationNode::default();
        };

        let lines = strip_gutter(comment);
        let mut children = Vec::new();
        let mut description = Vec::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in lines {
            let opened = self.block_tag_regex.captures(&line).map(|caps| {
                let rest = line[caps.get(0).map_or(0, |m| m.end())..].to_string();
                (caps[1].to_string(), rest)
            });

            if let Some((tag, rest)) = opened {
                if let Some((tag, body)) = current.take() {
                    children.push(self.block_tag(&tag, &body.join("\n")));
                }
                current = Some((tag, vec![rest]));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line.trim().to_string());
            } else {
                description.push(line);
            }
        }
        if let Some((tag, body)) = current.take() {
            children.push(self.block_tag(&tag, &body.join("\n")));
        }

        let root = self.parse_text(&description.join("\n"));
        if !root.is_empty() {
            children.insert(0, TagWrapper::Description { root });
        }

        debug!("Parsed doc comment into {} tag(s)", children.len());
        DocumentationNode { children }
    }

    fn block_tag(&self, tag: &str, body: &str) -> TagWrapper {
        match tag {
            "param" => {
                let (name, rest) = split_name(body);
                TagWrapper::Param { name, root: self.parse_text(rest) }
            }
            "return" => TagWrapper::Return { root: self.parse_text(body) },
            "throws" | "exception" => {
                let (name, rest) = split_name(body);
                TagWrapper::Throws { name, root: self.parse_text(rest) }
            }
            "see" => TagWrapper::See {
                name: body.trim().to_string(),
                root: self.parse_text(body),
            },
            "author" => TagWrapper::Author { root: self.parse_text(body) },
            "since" => TagWrapper::Since { root: self.parse_text(body) },
            "deprecated" => TagWrapper::Deprecated { root: self.parse_text(body) },
            other => TagWrapper::CustomTag {
                name: other.to_string(),
                root: self.parse_text(body),
            },
        }
    }

    /// Split text into fragments, resolving inline tags
    pub fn parse_text(&self, text: &str) -> DocText {
        let text = text.trim();
        let mut fragments = Vec::new();
        let mut last = 0;

        while let Some(offset) = text[last..].find("{@") {
            let start = last + offset;
            let Some(end) = closing_brace(text, start) else { break };
            let Some(caps) = self.inline_tag_regex.captures(&text[start..end]) else {
                push_text(&mut fragments, &text[last..start + 2]);
                last = start + 2;
                continue;
            };
            push_text(&mut fragments, &text[last..start]);
            last = end + 1;

            let content_start = start + caps.get(0).map_or(0, |m| m.end());
            let content = text[content_start..end].trim();
            match &caps[1] {
                "link" | "linkplain" => {
                    let (target, label) = split_name(content);
                    let label = label.trim();
                    fragments.push(DocFragment::Link {
                        target,
                        label: (!label.is_empty()).then(|| label.to_string()),
                    });
                }
                "code" | "literal" => fragments.push(DocFragment::Code { code: content.to_string() }),
                _ => push_text(&mut fragments, content),
            }
        }
        push_text(&mut fragments, &text[last..]);

        DocText { fragments }
    }
}

/// Remove the comment delimiters and the leading `*` of every line
fn strip_gutter(comment: &str) -> Vec<String> {
    let body = comment.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    body.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            trimmed.strip_prefix(' ').unwrap_or(trimmed).trim_end().to_string()
        })
        .collect()
}

/// Index of the `}` closing the inline tag opened at `start`; nested braces must balance
fn closing_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + index);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_name(body: &str) -> (String, &str) {
    let body = body.trim_start();
    match body.find(char::is_whitespace) {
        Some(end) => (body[..end].to_string(), &body[end..]),
        None => (body.to_string(), ""),
    }
}

fn push_text(fragments: &mut Vec<DocFragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(DocFragment::Text { text: previous }) = fragments.last_mut() {
        previous.push_str(text);
    } else {
        fragments.push(DocFragment::Text { text: text.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> JavadocParser {
        JavadocParser::new().unwrap()
    }

    #[test]
    fn test_missing_comment_is_empty() {
        assert!(parser().parse(None).is_empty());
    }

    #[test]
    fn test_single_line_comment() {
        let doc = parser().parse(Some("/** Returns the size. */"));
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.description().unwrap().to_string(), "Returns the size.");
    }

    #[test]
    fn test_block_tags() {
        let doc = parser().parse(Some(r#"/**
     * Stores a value.
     * Replaces any previous mapping.
     *
     * @param key   the key,
     *              never null
     * @param value the value
     * @return the previous value
     * @throws IllegalStateException when closed
     * @since 1.2
     * @apiNote internal
     */"#));

        assert_eq!(
            doc.description().unwrap().to_string(),
            "Stores a value.\nReplaces any previous mapping."
        );
        assert_eq!(doc.param("key").unwrap().to_string(), "the key,\nnever null");
        assert_eq!(doc.param("value").unwrap().to_string(), "the value");
        assert!(doc.children.iter().any(|t| matches!(t, TagWrapper::Return { .. })));
        assert!(doc.children.iter().any(|t| matches!(
            t, TagWrapper::Throws { name, .. } if name == "IllegalStateException"
        )));
        assert!(doc.children.iter().any(|t| matches!(
            t, TagWrapper::CustomTag { name, .. } if name == "apiNote"
        )));
        assert_eq!(doc.children.len(), 7);
    }

    #[test]
    fn test_inline_tags() {
        let text = parser().parse_text("Use {@link Cache#get(Object) get} or {@code put(k, v)}, see {@link Map}.");
        assert_eq!(text.fragments, vec![
            DocFragment::Text { text: "Use ".into() },
            DocFragment::Link { target: "Cache#get(Object)".into(), label: Some("get".into()) },
            DocFragment::Text { text: " or ".into() },
            DocFragment::Code { code: "put(k, v)".into() },
            DocFragment::Text { text: ", see ".into() },
            DocFragment::Link { target: "Map".into(), label: None },
            DocFragment::Text { text: ".".into() },
        ]);
        assert_eq!(text.to_string(), "Use [get](Cache#get(Object)) or `put(k, v)`, see `Map`.");
    }

    #[test]
    fn test_code_with_nested_braces() {
        let text = parser().parse_text("Does {@code if (x) { y(); }} and {@code {a}} stuff.");
        assert_eq!(text.fragments, vec![
            DocFragment::Text { text: "Does ".into() },
            DocFragment::Code { code: "if (x) { y(); }".into() },
            DocFragment::Text { text: " and ".into() },
            DocFragment::Code { code: "{a}".into() },
            DocFragment::Text { text: " stuff.".into() },
        ]);
    }

    #[test]
    fn test_unterminated_inline_tag_is_text() {
        let text = parser().parse_text("Broken {@code x { y} here");
        assert_eq!(text.fragments, vec![DocFragment::Text { text: "Broken {@code x { y} here".into() }]);
    }

    #[test]
    fn test_unknown_inline_tag_keeps_content() {
        let text = parser().parse_text("{@inheritDoc} More.");
        assert_eq!(text.to_string(), " More.");
    }

    #[test]
    fn test_tags_only_comment_has_no_description() {
        let doc = parser().parse(Some("/**\n * @deprecated use something else\n */"));
        assert!(doc.description().is_none());
        assert!(matches!(doc.children[0], TagWrapper::Deprecated { .. }));
    }
}
