//! Minimal YAML document model and block-style writer.
//!
//! Every scalar is written double-quoted so values such as `1001:1001` or
//! `:Z` never change type. Keys are written plain only when no YAML reader
//! could take them for a boolean, number or null. Empty collections are
//! written in flow style (`{}` or `[]`), so a key can never be left without
//! a value.

use std::fmt::Write as _;

/// A YAML node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A string scalar.
    Scalar(String),
    /// An ordered sequence.
    Sequence(Vec<Self>),
    /// An ordered mapping.
    Mapping(Mapping),
}

impl Node {
    /// A string scalar.
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    fn is_empty_collection(&self) -> bool {
        match self {
            Self::Scalar(_) => false,
            Self::Sequence(items) => items.is_empty(),
            Self::Mapping(mapping) => mapping.is_empty(),
        }
    }
}

/// An insertion-ordered mapping with string keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    /// An empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry, replacing an existing entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

/// Serialise `root` as a YAML document terminated by a newline.
#[must_use]
pub fn to_string(root: &Mapping) -> String {
    let mut out = String::new();
    if root.is_empty() {
        out.push_str("{}\n");
    } else {
        write_mapping(&mut out, root, 0);
    }
    out
}

fn write_mapping(out: &mut String, mapping: &Mapping, indent: usize) {
    for (key, value) in &mapping.entries {
        pad(out, indent);
        push_key(out, key);
        out.push(':');
        match value {
            Node::Scalar(text) => {
                out.push(' ');
                push_quoted(out, text);
                out.push('\n');
            }
            _ if value.is_empty_collection() => {
                out.push(' ');
                write_flow(out, value);
                out.push('\n');
            }
            Node::Mapping(child) => {
                out.push('\n');
                write_mapping(out, child, indent + 2);
            }
            Node::Sequence(items) => {
                out.push('\n');
                write_sequence(out, items, indent + 2);
            }
        }
    }
}

fn write_sequence(out: &mut String, items: &[Node], indent: usize) {
    for item in items {
        pad(out, indent);
        out.push_str("- ");
        write_flow(out, item);
        out.push('\n');
    }
}

fn write_flow(out: &mut String, node: &Node) {
    match node {
        Node::Scalar(text) => push_quoted(out, text),
        Node::Sequence(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_flow(out, item);
            }
            out.push(']');
        }
        Node::Mapping(mapping) => {
            out.push('{');
            for (index, (key, value)) in mapping.entries.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                push_key(out, key);
                out.push_str(": ");
                write_flow(out, value);
            }
            out.push('}');
        }
    }
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

/// Words that YAML 1.1 or 1.2 readers resolve to booleans, null or special
/// floats, compared case-insensitively.
const NON_STRING_WORDS: [&str; 11] = [
    "true", "false", "null", "yes", "no", "on", "off", "y", "n", "nan", "inf",
];

/// Keys starting with a letter or underscore and made of identifier
/// characters are written plain, unless they spell a non-string word.
/// Anything else, including every key starting with a digit, is quoted.
fn push_key(out: &mut String, key: &str) {
    if is_plain_key(key) {
        out.push_str(key);
    } else {
        push_quoted(out, key);
    }
}

fn is_plain_key(key: &str) -> bool {
    key.chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !NON_STRING_WORDS
            .iter()
            .any(|word| key.eq_ignore_ascii_case(word))
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                // Writing to a String cannot fail.
                let _written = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
