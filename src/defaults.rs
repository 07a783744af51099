// src/defaults.rs

//! Baseline allow-list used whenever a policy leaves a field unset.
//!
//! Callers extend it rather than copy it:
//!
//! ```
//! use graphql_html::{DEFAULTS, HtmlScalar, PolicyOptions};
//!
//! let html = HtmlScalar::new(PolicyOptions::new().extend_tags(["img"]));
//! assert!(!DEFAULTS.allows_tag("img"));
//! assert!(html.policy().allows_tag("img"));
//! ```

/// Read-only baseline table. See [`DEFAULTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPolicy {
    /// Tags kept in the output. Anything else is dropped, keeping its text.
    pub allowed_tags: &'static [&'static str],

    /// Tags dropped together with everything inside them.
    pub non_text_tags: &'static [&'static str],

    /// Attributes kept per tag. Tags not listed keep no attributes.
    pub allowed_attributes: &'static [(&'static str, &'static [&'static str])],

    /// URL schemes accepted in `href`, `src`, `cite` and similar attributes.
    pub allowed_schemes: &'static [&'static str],

    pub strip_comments: bool,
}

impl DefaultPolicy {
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Baseline attributes for `tag`, empty when the tag has none.
    pub fn attributes_for(&self, tag: &str) -> &'static [&'static str] {
        self.allowed_attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .map(|(_, attrs)| *attrs)
            .unwrap_or(&[])
    }
}

pub const DEFAULTS: DefaultPolicy = DefaultPolicy {
    allowed_tags: &[
        // sectioning
        "address", "article", "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6",
        "hgroup", "main", "nav", "section",
        // block text
        "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "hr", "li", "ol", "p",
        "pre", "ul",
        // inline text
        "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd",
        "mark", "q", "rb", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong",
        "sub", "sup", "time", "u", "var", "wbr",
        // tables
        "caption", "col", "colgroup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    ],
    non_text_tags: &["script", "style", "textarea", "option"],
    allowed_attributes: &[
        ("a", &["href", "name", "target"]),
        (
            "img",
            &["src", "srcset", "alt", "title", "width", "height", "loading"],
        ),
    ],
    allowed_schemes: &["http", "https", "ftp", "mailto", "tel"],
    strip_comments: true,
};

/// Script-execution tags removed from every policy unless the caller opts
/// out with `allow_unsafe_markup`.
pub const HARD_DENIED_TAGS: &[&str] = &[
    "script", "iframe", "object", "embed", "applet", "frame", "frameset", "base",
];

/// URL schemes removed from every policy unless the caller opts out.
pub const HARD_DENIED_SCHEMES: &[&str] = &["javascript", "vbscript"];

/// Attributes starting with this prefix (`onclick`, `onerror`, ...) are
/// removed from every policy unless the caller opts out.
pub const EVENT_HANDLER_PREFIX: &str = "on";
