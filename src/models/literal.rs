// src/models/literal.rs

use std::fmt;

/// A value written inline in a query document, as produced by the host's
/// query parser.
///
/// Only [`LiteralNode::String`] is a valid literal for the `HTML` scalar.
/// Every other variant is rejected by `parse_literal`.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralNode {
    /// `$name`
    Variable(String),
    /// Integer literal, kept as its source text.
    Int(String),
    /// Float literal, kept as its source text.
    Float(String),
    /// `"..."` or `"""..."""`. `value` is the already-unescaped content.
    String { value: String, block: bool },
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<LiteralNode>),
    Object(Vec<(String, LiteralNode)>),
}

impl LiteralNode {
    /// Shorthand for a plain (non-block) string literal.
    pub fn string(value: impl Into<String>) -> Self {
        LiteralNode::String {
            value: value.into(),
            block: false,
        }
    }

    pub fn block_string(value: impl Into<String>) -> Self {
        LiteralNode::String {
            value: value.into(),
            block: true,
        }
    }

    pub fn int(value: i64) -> Self {
        LiteralNode::Int(value.to_string())
    }

    pub fn kind(&self) -> LiteralKind {
        match self {
            LiteralNode::Variable(_) => LiteralKind::Variable,
            LiteralNode::Int(_) => LiteralKind::Int,
            LiteralNode::Float(_) => LiteralKind::Float,
            LiteralNode::String { .. } => LiteralKind::String,
            LiteralNode::Boolean(_) => LiteralKind::Boolean,
            LiteralNode::Null => LiteralKind::Null,
            LiteralNode::Enum(_) => LiteralKind::Enum,
            LiteralNode::List(_) => LiteralKind::List,
            LiteralNode::Object(_) => LiteralKind::Object,
        }
    }
}

/// Kind tag of a [`LiteralNode`]. Displays as the GraphQL AST kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Variable,
    Int,
    Float,
    String,
    Boolean,
    Null,
    Enum,
    List,
    Object,
}

impl LiteralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::Variable => "Variable",
            LiteralKind::Int => "IntValue",
            LiteralKind::Float => "FloatValue",
            LiteralKind::String => "StringValue",
            LiteralKind::Boolean => "BooleanValue",
            LiteralKind::Null => "NullValue",
            LiteralKind::Enum => "EnumValue",
            LiteralKind::List => "ListValue",
            LiteralKind::Object => "ObjectValue",
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
