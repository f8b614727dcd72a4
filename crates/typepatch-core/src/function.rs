//! Function records produced by the extractor.
//!
//! A [`FunctionRecord`] is self-contained: besides the signature and span it
//! carries every call expression found inside the definition, reduced to the
//! shapes the auditor needs. Records are immutable once built.

use std::path::PathBuf;

/// How a parameter binds arguments, following Python's signature rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Declared before a `/` separator.
    PositionalOnly,
    /// The ordinary `def f(a, b)` slot.
    PositionalOrKeyword,
    /// `*args`
    VarPositional,
    /// Declared after `*` or `*args`.
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub annotated: bool,
    pub kind: ParamKind,
}

/// Inclusive, 1-indexed line range of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    /// Verbatim lines `start..=end` of `source`, joined with `\n`.
    ///
    /// Lines past the end of `source` are ignored rather than padded.
    pub fn slice(&self, source: &str) -> String {
        source
            .lines()
            .skip(self.start.saturating_sub(1))
            .take((self.end + 1).saturating_sub(self.start.max(1)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What is being called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// A bare name: `isinstance(...)`.
    Name(String),
    /// A dotted access: `typeguard.check_type(...)`. `object` is the source
    /// text of everything left of the final dot.
    Attribute { object: String, attr: String },
    /// Anything else (subscripts, calls of calls, lambdas).
    Other,
}

/// Argument expression shape. Parentheses around an argument are unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgShape {
    Name(String),
    Other,
}

impl ArgShape {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(n) => Some(n),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordArg {
    pub name: String,
    pub value: ArgShape,
}

/// A call expression inside a function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub callee: Callee,
    /// Positional arguments in order; `*xs` unpacking shows up as [`ArgShape::Other`].
    pub positional: Vec<ArgShape>,
    pub keywords: Vec<KeywordArg>,
    /// 1-indexed line the call starts on.
    pub line: usize,
}

/// One `def` discovered in a source file.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    pub name: String,
    pub params: Vec<Parameter>,
    pub span: LineSpan,
    pub path: PathBuf,
    pub calls: Vec<CallSite>,
}

impl FunctionRecord {
    /// Parameters the auditor looks at: the ordinary positional-or-keyword slots.
    pub fn audited_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params
            .iter()
            .filter(|p| p.kind == ParamKind::PositionalOrKeyword)
    }

    /// Source text of this definition within `source` (the file it came from).
    pub fn source_text(&self, source: &str) -> String {
        self.span.slice(source)
    }
}
