//! Pattern compiler: template strings to reusable token pipelines
//!
//! `%<name>` tokens (greedy alphabetic names) resolve against the formatter
//! registry at compile time; everything else, including unknown `%<name>`
//! directives, stays literal text. A compiled pattern is immutable and safe
//! to share across threads for arbitrarily many renders.

use crate::core::event::LogEvent;
use crate::layout::formatters::{lookup, FormatFn};
use crate::layout::LayoutContext;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub enum Token {
    Text(String),
    Field { name: &'static str, format: FormatFn },
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Text(a), Token::Text(b)) => a == b,
            (Token::Field { name: a, .. }, Token::Field { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Token::Field { name, .. } => f.debug_tuple("Field").field(name).finish(),
        }
    }
}

/// An ordered token sequence compiled once per configured layout.
#[derive(Debug, PartialEq)]
pub struct CompiledPattern {
    source: String,
    tokens: Vec<Token>,
}

impl CompiledPattern {
    /// Compile a template. Never fails: unrecognized directives become
    /// literal text.
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        let bytes = pattern.as_bytes();
        let mut tokens = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'%' {
                i += 1;
                continue;
            }
            let mut end = i + 1;
            while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
                end += 1;
            }
            if end == i + 1 {
                // bare '%': plain literal
                i += 1;
                continue;
            }
            match lookup(&pattern[i + 1..end]) {
                Some((name, format)) => {
                    if literal_start < i {
                        tokens.push(Token::Text(pattern[literal_start..i].to_string()));
                    }
                    tokens.push(Token::Field { name, format });
                    literal_start = end;
                }
                // unknown directive: stays inside the running literal
                None => {}
            }
            i = end;
        }
        if literal_start < bytes.len() {
            tokens.push(Token::Text(pattern[literal_start..].to_string()));
        }

        Self {
            source: pattern.to_string(),
            tokens,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Linear render: concatenate literals and formatter outputs in order.
    #[must_use]
    pub fn render(&self, ctx: &LayoutContext, event: &LogEvent) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Field { format, .. } => out.push_str(&format(ctx, event)),
            }
        }
        out
    }

    /// Object render: formatter name to computed value, for forwarding a
    /// record to a process that renders it with its own layout.
    #[must_use]
    pub fn render_object(&self, ctx: &LayoutContext, event: &LogEvent) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for token in &self.tokens {
            if let Token::Field { name, format } = token {
                fields.insert((*name).to_string(), format(ctx, event));
            }
        }
        fields
    }

    /// Substitute a forwarded field map into this pattern without invoking
    /// formatters. Fields absent from the map render as their `%<name>`
    /// directive, verbatim.
    #[must_use]
    pub fn render_forwarded(&self, fields: &BTreeMap<String, String>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Field { name, .. } => match fields.get(*name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                    }
                },
            }
        }
        out
    }
}

/// A compiled pattern bound to the global formatting context.
#[derive(Debug, Clone)]
pub struct PatternLayout {
    pattern: Arc<CompiledPattern>,
    context: Arc<LayoutContext>,
}

impl PatternLayout {
    #[must_use]
    pub fn new(pattern: &str, context: Arc<LayoutContext>) -> Self {
        Self {
            pattern: Arc::new(CompiledPattern::compile(pattern)),
            context,
        }
    }

    #[must_use]
    pub fn render(&self, event: &LogEvent) -> String {
        self.pattern.render(&self.context, event)
    }

    #[must_use]
    pub fn render_object(&self, event: &LogEvent) -> BTreeMap<String, String> {
        self.pattern.render_object(&self.context, event)
    }

    #[must_use]
    pub fn render_forwarded(&self, fields: &BTreeMap<String, String>) -> String {
        self.pattern.render_forwarded(fields)
    }
}
