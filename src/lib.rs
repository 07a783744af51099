// src/lib.rs

//! `HTML` scalar for GraphQL type systems.
//!
//! Every value crossing the scalar is cleaned against one allow-list policy:
//! field values on `serialize`, variables on `parse_value`, and inline
//! literals on `parse_literal`.

pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod scalar;
pub mod utils;

// Re-export specific items for convenience
pub use config::ScalarConfig;
pub use defaults::{DEFAULTS, DefaultPolicy};
pub use error::{ConfigError, ScalarError};
pub use models::{
    literal::{LiteralKind, LiteralNode},
    policy::{ANY_TAG, HtmlPolicy, PolicyOptions, RelativeUrls},
    value::{RawValue, ValueShape},
};
pub use scalar::{HTML_SCALAR_DESCRIPTION, HTML_SCALAR_NAME, HtmlScalar, ScalarType};
pub use utils::{
    html::{HtmlSanitizer, sanitize},
    transform::{TagFrame, TagTransform, TextFilter, simple_transform},
};
