//! Template syntax: comment gluing, quantifier rewriting and the AST parser
//!
//! Grammar (all constructs nest):
//!
//! - `__name__` wildcard reference
//! - `{a|b|c}` choice group; `\{` and `\}` are literal braces
//! - `N#__name__` quantifier, rewritten to `{__name__|__name__|...}`; inside
//!   a group the braces are dropped so the copies join its option list
//!
//! Unbalanced braces are kept as literal text.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    /// Wildcard reference; the name is matched lazily so `__a__b__` stops at `a`
    pub static ref WILDCARD_RE: Regex = Regex::new(r"__([\w.\-+/*\\]+?)__").unwrap();
    static ref WILDCARD_AT_RE: Regex = Regex::new(r"^__([\w.\-+/*\\]+?)__").unwrap();
    static ref QUANTIFIER_RE: Regex = Regex::new(r"(\d+)#__([\w.\-+/*\\]+?)__").unwrap();
}

/// Choice groups nested deeper than this are left as literal text
pub const MAX_GROUP_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(String),
    /// Raw (un-normalized) wildcard name
    Wildcard(String),
    /// Alternatives, each a node sequence
    Choice(Vec<Vec<Node>>),
}

/// Remove `#` comment lines, gluing the following line onto the last kept one
pub fn strip_comments(text: &str) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut after_comment = false;

    for line in text.split('\n') {
        if line.trim_start().starts_with('#') {
            after_comment = true;
            continue;
        }

        match kept.last_mut() {
            Some(last) if after_comment => {
                last.push(' ');
                last.push_str(line);
            }
            _ => kept.push(line.to_string()),
        }
        after_comment = false;
    }

    kept.join("\n")
}

/// Rewrite every `N#__name__` into `N` alternatives of `__name__`
pub fn expand_quantifiers(text: &str) -> Cow<'_, str> {
    QUANTIFIER_RE.replace_all(text, |caps: &regex::Captures| {
        let reference = format!("__{}__", &caps[2]);
        let start = caps.get(0).map_or(0, |m| m.start());
        match caps[1].parse::<usize>() {
            Ok(count) if count > 0 => {
                let options = vec![reference; count].join("|");
                if group_depth(&text[..start]) > 0 {
                    options
                } else {
                    format!("{{{}}}", options)
                }
            }
            _ => caps[0].to_string(),
        }
    })
}

/// Number of choice groups still open at the end of `prefix`
fn group_depth(prefix: &str) -> usize {
    let bytes = prefix.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if matches!(bytes.get(pos + 1), Some(b'{') | Some(b'}')) => pos += 1,
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        pos += 1;
    }

    depth
}

/// Parse template text into a node sequence
pub fn parse(text: &str) -> Vec<Node> {
    let parser = Parser { src: text };
    match parser.sequence(0, 0, false) {
        Parsed::Open(mut options) => options.pop().unwrap_or_default(),
        Parsed::Closed(..) | Parsed::Unterminated => Vec::new(),
    }
}

/// True if any choice group survives in the node sequence
pub fn has_choice(nodes: &[Node]) -> bool {
    nodes.iter().any(|n| matches!(n, Node::Choice(_)))
}

/// Render nodes back to text without evaluating anything
pub fn to_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_text(nodes, &mut out);
    out
}

fn write_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Wildcard(name) => {
                out.push_str("__");
                out.push_str(name);
                out.push_str("__");
            }
            Node::Choice(options) => {
                out.push('{');
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    write_text(option, out);
                }
                out.push('}');
            }
        }
    }
}

enum Parsed {
    /// Top level reached end of input
    Open(Vec<Vec<Node>>),
    /// Group closed; position just past `}`
    Closed(Vec<Vec<Node>>, usize),
    /// Group hit end of input without `}`
    Unterminated,
}

struct Parser<'a> {
    src: &'a str,
}

impl<'a> Parser<'a> {
    fn sequence(&self, start: usize, depth: usize, in_group: bool) -> Parsed {
        let bytes = self.src.as_bytes();
        let mut options: Vec<Vec<Node>> = vec![Vec::new()];
        let mut literal = String::new();
        let mut pos = start;

        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' if matches!(bytes.get(pos + 1), Some(b'{') | Some(b'}')) => {
                    literal.push_str(&self.src[pos..pos + 2]);
                    pos += 2;
                }
                b'{' if depth < MAX_GROUP_DEPTH => {
                    match self.sequence(pos + 1, depth + 1, true) {
                        Parsed::Closed(group, end) => {
                            flush(&mut literal, &mut options);
                            push(&mut options, Node::Choice(group));
                            pos = end;
                        }
                        _ => {
                            literal.push('{');
                            pos += 1;
                        }
                    }
                }
                b'}' if in_group => {
                    flush(&mut literal, &mut options);
                    return Parsed::Closed(options, pos + 1);
                }
                b'|' if in_group => {
                    flush(&mut literal, &mut options);
                    options.push(Vec::new());
                    pos += 1;
                }
                b'_' => match WILDCARD_AT_RE.captures(&self.src[pos..]) {
                    Some(caps) => {
                        flush(&mut literal, &mut options);
                        push(&mut options, Node::Wildcard(caps[1].to_string()));
                        pos += caps[0].len();
                    }
                    None => {
                        literal.push('_');
                        pos += 1;
                    }
                },
                _ => {
                    let ch = self.src[pos..].chars().next().unwrap_or_default();
                    literal.push(ch);
                    pos += ch.len_utf8().max(1);
                }
            }
        }

        if in_group {
            return Parsed::Unterminated;
        }

        flush(&mut literal, &mut options);
        Parsed::Open(options)
    }
}

fn flush(literal: &mut String, options: &mut [Vec<Node>]) {
    if literal.is_empty() {
        return;
    }
    let text = std::mem::take(literal);
    if let Some(current) = options.last_mut() {
        current.push(Node::Literal(text));
    }
}

fn push(options: &mut [Vec<Node>], node: Node) {
    if let Some(current) = options.last_mut() {
        current.push(node);
    }
}
