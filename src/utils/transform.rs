// src/utils/transform.rs

use std::{collections::BTreeMap, fmt, sync::Arc};

/// A tag as seen by a transform: its name plus its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFrame {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
}

impl TagFrame {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Rewrites a tag before allow-list filtering runs.
///
/// The rewritten tag is filtered like any other markup, so a transform cannot
/// smuggle in a tag or attribute the policy does not allow.
#[derive(Clone)]
pub enum TagTransform {
    /// Built by [`simple_transform`].
    Simple {
        tag_name: String,
        attributes: BTreeMap<String, String>,
        merge: bool,
    },
    Custom(Arc<dyn Fn(TagFrame) -> TagFrame + Send + Sync>),
}

impl TagTransform {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(TagFrame) -> TagFrame + Send + Sync + 'static,
    {
        TagTransform::Custom(Arc::new(f))
    }

    pub fn apply(&self, frame: TagFrame) -> TagFrame {
        match self {
            TagTransform::Simple {
                tag_name,
                attributes,
                merge,
            } => {
                let mut next = if *merge {
                    frame.attributes
                } else {
                    BTreeMap::new()
                };
                next.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
                TagFrame {
                    tag_name: tag_name.clone(),
                    attributes: next,
                }
            }
            TagTransform::Custom(f) => f(frame),
        }
    }
}

impl fmt::Debug for TagTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagTransform::Simple {
                tag_name,
                attributes,
                merge,
            } => f
                .debug_struct("Simple")
                .field("tag_name", tag_name)
                .field("attributes", attributes)
                .field("merge", merge)
                .finish(),
            TagTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Renames a tag to `tag_name` and sets `attributes` on it.
///
/// With `merge` the new attributes are laid over the existing ones; without
/// it they replace them.
///
/// ```
/// use graphql_html::{HtmlScalar, PolicyOptions, ScalarType, simple_transform};
///
/// let html = HtmlScalar::new(
///     PolicyOptions::new().transform_tag("ol", simple_transform("ul", [("class", "list")], true)),
/// );
/// let out = html.parse_value(&"<ol><li>a</li></ol>".into()).unwrap();
/// assert_eq!(out, "<ul><li>a</li></ul>");
/// ```
pub fn simple_transform<I, K, V>(tag_name: impl Into<String>, attributes: I, merge: bool) -> TagTransform
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    TagTransform::Simple {
        tag_name: tag_name.into(),
        attributes: attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
        merge,
    }
}

/// Hook run on the text of each text node before allow-list filtering.
///
/// Called with the text and the name of the innermost open element as
/// written in the source (`None` at the top level). The filter sees source
/// text with entities left as written, and its output is parsed again by
/// the sanitizer.
#[derive(Clone)]
pub struct TextFilter(Arc<dyn Fn(&str, Option<&str>) -> String + Send + Sync>);

impl TextFilter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, text: &str, tag_name: Option<&str>) -> String {
        (self.0)(text, tag_name)
    }
}

impl fmt::Debug for TextFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TextFilter(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> TagFrame {
        TagFrame::new("a")
            .with_attribute("href", "https://example.com")
            .with_attribute("target", "_self")
    }

    #[test]
    fn test_simple_transform_merge() {
        let t = simple_transform("a", [("target", "_blank")], true);
        let out = t.apply(link());

        assert_eq!(out.tag_name, "a");
        assert_eq!(out.attributes["href"], "https://example.com");
        assert_eq!(out.attributes["target"], "_blank");
    }

    #[test]
    fn test_simple_transform_replace() {
        let t = simple_transform("span", [("class", "x")], false);
        let out = t.apply(link());

        assert_eq!(out.tag_name, "span");
        assert_eq!(out.attributes.len(), 1);
        assert_eq!(out.attributes["class"], "x");
    }

    #[test]
    fn test_custom_transform() {
        let t = TagTransform::custom(|mut frame| {
            frame.attributes.remove("target");
            frame
        });
        let out = t.apply(link());

        assert!(!out.attributes.contains_key("target"));
        assert_eq!(format!("{:?}", t), "Custom(..)");
    }

    #[test]
    fn test_text_filter() {
        let f = TextFilter::new(|text, tag| match tag {
            Some("code") => text.to_string(),
            _ => text.replace("foo", "bar"),
        });
        assert_eq!(f.apply("foo food", Some("p")), "bar bard");
        assert_eq!(f.apply("foo food", None), "bar bard");
        assert_eq!(f.apply("foo food", Some("code")), "foo food");
    }
}
