// src/models/policy.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults::{DEFAULTS, EVENT_HANDLER_PREFIX, HARD_DENIED_SCHEMES, HARD_DENIED_TAGS};
use crate::utils::transform::{TagTransform, TextFilter};

/// Key in `allowed_attributes` for attributes allowed on every tag.
pub const ANY_TAG: &str = "*";

/// What to do with relative URLs in link and media attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelativeUrls {
    #[default]
    PassThrough,
    Deny,
    /// Resolve relative URLs against this absolute base.
    RewriteWithBase(Url),
}

/// Caller-facing policy configuration.
///
/// Every field is an override: `None` means "use the baseline from
/// [`DEFAULTS`]". An empty `PolicyOptions` therefore behaves exactly like the
/// baseline. Deserializes from camelCase JSON, e.g.
/// `{"allowedTags": ["p", "b"], "allowedSchemes": ["https"]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyOptions {
    pub allowed_tags: Option<Vec<String>>,
    pub non_text_tags: Option<Vec<String>>,
    /// Attributes per tag; the `"*"` key applies to every tag.
    pub allowed_attributes: Option<BTreeMap<String, Vec<String>>>,
    pub allowed_classes: Option<BTreeMap<String, Vec<String>>>,
    pub allowed_schemes: Option<Vec<String>>,
    pub relative_urls: Option<RelativeUrls>,
    /// `rel` forced onto links, e.g. `"noopener noreferrer"`. Off unless set;
    /// an empty string also disables it.
    pub link_rel: Option<String>,
    pub strip_comments: Option<bool>,
    pub id_prefix: Option<String>,
    pub allow_unsafe_markup: bool,

    #[serde(skip)]
    pub transform_tags: BTreeMap<String, TagTransform>,
    #[serde(skip)]
    pub text_filter: Option<TextFilter>,
}

impl PolicyOptions {
    /// Empty override set: the baseline governs everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with every list filled in from the baseline, ready to extend.
    pub fn with_defaults() -> Self {
        Self {
            allowed_tags: Some(owned(DEFAULTS.allowed_tags)),
            non_text_tags: Some(owned(DEFAULTS.non_text_tags)),
            allowed_attributes: Some(default_attributes()),
            allowed_schemes: Some(owned(DEFAULTS.allowed_schemes)),
            strip_comments: Some(DEFAULTS.strip_comments),
            ..Self::default()
        }
    }

    /// Replaces the allowed tags.
    pub fn allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Appends to the allowed tags, starting from the baseline when unset.
    pub fn extend_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags
            .get_or_insert_with(|| owned(DEFAULTS.allowed_tags))
            .extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn non_text_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_text_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Appends attributes for `tag` (or [`ANY_TAG`]), starting from the
    /// baseline map when unset.
    pub fn allow_attributes<I, S>(mut self, tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_attributes
            .get_or_insert_with(default_attributes)
            .entry(tag.to_string())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Limits the `class` attribute of `tag` to the listed class names.
    pub fn allow_classes<I, S>(mut self, tag: &str, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_classes
            .get_or_insert_with(BTreeMap::new)
            .entry(tag.to_string())
            .or_default()
            .extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn allowed_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_schemes = Some(schemes.into_iter().map(Into::into).collect());
        self
    }

    pub fn relative_urls(mut self, relative_urls: RelativeUrls) -> Self {
        self.relative_urls = Some(relative_urls);
        self
    }

    /// Forces `rel` onto every kept `<a>`. `None` turns it off again.
    pub fn link_rel(mut self, rel: Option<&str>) -> Self {
        self.link_rel = Some(rel.unwrap_or_default().to_string());
        self
    }

    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = Some(strip);
        self
    }

    /// Prefixes every kept `id` attribute value.
    /// Sanitizing twice under an id prefix prefixes twice.
    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Registers a transform for `tag`, or for every tag with [`ANY_TAG`].
    pub fn transform_tag(mut self, tag: &str, transform: TagTransform) -> Self {
        self.transform_tags.insert(tag.to_ascii_lowercase(), transform);
        self
    }

    /// Hook receiving each text node and its enclosing tag name.
    pub fn text_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.text_filter = Some(TextFilter::new(f));
        self
    }

    /// Disables the hard deny list for script-execution vectors.
    /// Only for callers that really mean to let `<script>` and friends through.
    pub fn allow_unsafe_markup(mut self, allow: bool) -> Self {
        self.allow_unsafe_markup = allow;
        self
    }

    pub fn resolve(&self) -> HtmlPolicy {
        HtmlPolicy::resolve(self)
    }
}

/// Resolved, immutable policy owned by one scalar.
///
/// Resolution fills unset fields from the baseline, applies the hard deny
/// list and settles combinations the allow-list cleaner refuses (a tag both
/// kept and dropped with its content, a caller-allowed `rel` next to a
/// forced one, `class` allowed next to a class list).
#[derive(Debug, Clone)]
pub struct HtmlPolicy {
    pub(crate) tags: BTreeSet<String>,
    pub(crate) clean_content_tags: BTreeSet<String>,
    pub(crate) tag_attributes: BTreeMap<String, BTreeSet<String>>,
    pub(crate) generic_attributes: BTreeSet<String>,
    pub(crate) allowed_classes: BTreeMap<String, BTreeSet<String>>,
    pub(crate) url_schemes: BTreeSet<String>,
    pub(crate) relative_urls: RelativeUrls,
    pub(crate) link_rel: Option<String>,
    pub(crate) strip_comments: bool,
    pub(crate) id_prefix: Option<String>,
    pub(crate) transforms: BTreeMap<String, TagTransform>,
    pub(crate) text_filter: Option<TextFilter>,
    pub(crate) unsafe_markup: bool,
}

impl HtmlPolicy {
    pub fn resolve(options: &PolicyOptions) -> Self {
        // 1. Fill from the baseline
        let mut tags = normalize(
            options
                .allowed_tags
                .clone()
                .unwrap_or_else(|| owned(DEFAULTS.allowed_tags)),
        );
        let mut non_text = normalize(
            options
                .non_text_tags
                .clone()
                .unwrap_or_else(|| owned(DEFAULTS.non_text_tags)),
        );
        let mut url_schemes = normalize(
            options
                .allowed_schemes
                .clone()
                .unwrap_or_else(|| owned(DEFAULTS.allowed_schemes)),
        );

        let attributes = options
            .allowed_attributes
            .clone()
            .unwrap_or_else(default_attributes);
        let mut generic_attributes = BTreeSet::new();
        let mut tag_attributes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (tag, attrs) in attributes {
            let attrs = normalize(attrs);
            if tag == ANY_TAG {
                generic_attributes.extend(attrs);
            } else {
                tag_attributes
                    .entry(tag.trim().to_ascii_lowercase())
                    .or_default()
                    .extend(attrs);
            }
        }

        // 2. Hard deny list
        if options.allow_unsafe_markup {
            tracing::warn!("HTML policy built with allow_unsafe_markup, script vectors are not denied");
        } else {
            for tag in HARD_DENIED_TAGS {
                tags.remove(*tag);
                non_text.insert(tag.to_string());
            }
            for scheme in HARD_DENIED_SCHEMES {
                url_schemes.remove(*scheme);
            }
            generic_attributes.retain(|a| !a.starts_with(EVENT_HANDLER_PREFIX));
            for attrs in tag_attributes.values_mut() {
                attrs.retain(|a| !a.starts_with(EVENT_HANDLER_PREFIX));
            }
        }

        // 3. An explicitly allowed tag keeps its content
        let clean_content_tags = non_text.difference(&tags).cloned().collect();

        // 4. Forced rel is opt-in, and a caller-allowed rel wins over it
        let rel_allowed = generic_attributes.contains("rel")
            || tag_attributes.get("a").is_some_and(|a| a.contains("rel"));
        let link_rel = match options.link_rel.as_deref() {
            _ if rel_allowed => None,
            None | Some("") => None,
            Some(rel) => Some(rel.to_string()),
        };

        // 5. Class lists only for tags that don't allow every class
        let mut allowed_classes = BTreeMap::new();
        if !generic_attributes.contains("class") {
            for (tag, classes) in options.allowed_classes.clone().unwrap_or_default() {
                let tag = tag.trim().to_ascii_lowercase();
                if tag_attributes.get(&tag).is_some_and(|a| a.contains("class")) {
                    continue;
                }
                let classes: BTreeSet<String> = classes
                    .into_iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect();
                if !classes.is_empty() {
                    allowed_classes.insert(tag, classes);
                }
            }
        }

        Self {
            tags,
            clean_content_tags,
            tag_attributes,
            generic_attributes,
            allowed_classes,
            url_schemes,
            relative_urls: options.relative_urls.clone().unwrap_or_default(),
            link_rel,
            strip_comments: options.strip_comments.unwrap_or(DEFAULTS.strip_comments),
            id_prefix: options.id_prefix.clone().filter(|p| !p.is_empty()),
            transforms: options.transform_tags.clone(),
            text_filter: options.text_filter.clone(),
            unsafe_markup: options.allow_unsafe_markup,
        }
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    /// Whether `attribute` survives on `tag`, either per tag or globally.
    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        let attribute = attribute.to_ascii_lowercase();
        self.generic_attributes.contains(&attribute)
            || self
                .tag_attributes
                .get(&tag.to_ascii_lowercase())
                .is_some_and(|a| a.contains(&attribute))
    }

    pub fn allows_scheme(&self, scheme: &str) -> bool {
        self.url_schemes.contains(&scheme.to_ascii_lowercase())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Tags removed together with their content.
    pub fn non_text_tags(&self) -> impl Iterator<Item = &str> {
        self.clean_content_tags.iter().map(String::as_str)
    }

    pub fn link_rel(&self) -> Option<&str> {
        self.link_rel.as_deref()
    }

    pub fn relative_urls(&self) -> &RelativeUrls {
        &self.relative_urls
    }

    pub fn is_unsafe(&self) -> bool {
        self.unsafe_markup
    }
}

impl Default for HtmlPolicy {
    fn default() -> Self {
        Self::resolve(&PolicyOptions::default())
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_attributes() -> BTreeMap<String, Vec<String>> {
    DEFAULTS
        .allowed_attributes
        .iter()
        .map(|(tag, attrs)| (tag.to_string(), owned(attrs)))
        .collect()
}

/// Lowercases, trims and drops empty names.
fn normalize(items: Vec<String>) -> BTreeSet<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
