// src/scalar.rs

use crate::{
    defaults::{DEFAULTS, DefaultPolicy},
    error::ScalarError,
    models::{
        literal::LiteralNode,
        policy::{HtmlPolicy, PolicyOptions},
        value::{RawValue, ValueShape},
    },
    utils::{
        html::HtmlSanitizer,
        transform::{TagTransform, simple_transform},
    },
};

pub const HTML_SCALAR_NAME: &str = "HTML";

pub const HTML_SCALAR_DESCRIPTION: &str = "The `HTML` scalar type represents Hypertext Markup Language, a \
     standardized system for tagging text files to achieve font, color, \
     graphic, and hyperlink effects on World Wide Web pages.";

/// Custom scalar as seen by the host type system.
///
/// The host calls `serialize` when writing a field value into a response,
/// `parse_value` when accepting a variable, and `parse_literal` when
/// validating a value written inline in the query document.
pub trait ScalarType {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn serialize(&self, value: &RawValue) -> Result<String, ScalarError>;

    fn parse_value(&self, value: &RawValue) -> Result<String, ScalarError>;

    fn parse_literal(&self, node: &LiteralNode) -> Result<String, ScalarError>;
}

/// The `HTML` scalar.
///
/// Owns one resolved [`HtmlPolicy`] and applies it at all three entry
/// points, so input and output are always cleaned by the same rules.
///
/// ```
/// use graphql_html::{HtmlScalar, PolicyOptions, ScalarType};
/// use serde_json::json;
///
/// let html = HtmlScalar::new(PolicyOptions::new());
/// let out = html.serialize(&json!("Hello<script>evil()</script>")).unwrap();
/// assert_eq!(out, "Hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlScalar {
    policy: HtmlPolicy,
}

impl HtmlScalar {
    pub fn new(options: PolicyOptions) -> Self {
        Self::with_policy(options.resolve())
    }

    /// `None` behaves like an empty override set.
    pub fn build(options: Option<PolicyOptions>) -> Self {
        Self::new(options.unwrap_or_default())
    }

    pub fn with_policy(policy: HtmlPolicy) -> Self {
        tracing::debug!(
            scalar = HTML_SCALAR_NAME,
            allowed_tags = policy.tags().count(),
            unsafe_markup = policy.is_unsafe(),
            "HTML scalar built"
        );
        Self { policy }
    }

    pub fn policy(&self) -> &HtmlPolicy {
        &self.policy
    }

    /// The baseline allow-list, for building extended configurations.
    pub fn defaults() -> &'static DefaultPolicy {
        &DEFAULTS
    }

    /// See [`simple_transform`].
    pub fn simple_transform<I, K, V>(tag_name: impl Into<String>, attributes: I, merge: bool) -> TagTransform
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        simple_transform(tag_name, attributes, merge)
    }

    /// Shared by `serialize` and `parse_value`: strings only, no coercion.
    fn sanitize_value(&self, value: &RawValue, entry_point: &'static str) -> Result<String, ScalarError> {
        match value {
            RawValue::String(s) => Ok(self.sanitize_str(s, entry_point)),
            other => {
                let found = ValueShape::of(other);
                tracing::warn!(entry_point, %found, "HTML scalar rejected a non string value");
                Err(ScalarError::TypeMismatch { found })
            }
        }
    }

    fn sanitize_str(&self, input: &str, entry_point: &'static str) -> String {
        let output = HtmlSanitizer::new(&self.policy).sanitize(input);
        if output != input {
            tracing::debug!(
                entry_point,
                input_len = input.len(),
                output_len = output.len(),
                "HTML sanitized"
            );
        }
        output
    }
}

impl ScalarType for HtmlScalar {
    fn name(&self) -> &str {
        HTML_SCALAR_NAME
    }

    fn description(&self) -> Option<&str> {
        Some(HTML_SCALAR_DESCRIPTION)
    }

    fn serialize(&self, value: &RawValue) -> Result<String, ScalarError> {
        self.sanitize_value(value, "serialize")
    }

    fn parse_value(&self, value: &RawValue) -> Result<String, ScalarError> {
        self.sanitize_value(value, "parseValue")
    }

    fn parse_literal(&self, node: &LiteralNode) -> Result<String, ScalarError> {
        match node {
            LiteralNode::String { value, .. } => Ok(self.sanitize_str(value, "parseLiteral")),
            LiteralNode::Variable(_)
            | LiteralNode::Int(_)
            | LiteralNode::Float(_)
            | LiteralNode::Boolean(_)
            | LiteralNode::Null
            | LiteralNode::Enum(_)
            | LiteralNode::List(_)
            | LiteralNode::Object(_) => {
                let kind = node.kind();
                tracing::warn!(entry_point = "parseLiteral", %kind, "HTML scalar rejected a non string literal");
                Err(ScalarError::Validation { kind })
            }
        }
    }
}
