// src/utils/html.rs

use std::{
    borrow::Cow,
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    rc::Rc,
};

use lol_html::{
    HandlerResult, RewriteStrSettings, doc_text, element,
    errors::RewritingError,
    html_content::{ContentType, Element, EndTag},
    rewrite_str,
};

use crate::models::policy::{ANY_TAG, HtmlPolicy, RelativeUrls};
use crate::utils::transform::{TagFrame, TagTransform};

/// Cleans HTML under a resolved [`HtmlPolicy`].
///
/// Two stages:
/// 1. If the policy carries tag transforms or a text filter, a streaming
///    rewrite pass applies them to the raw input.
/// 2. The allow-list pass (ammonia) keeps only permitted tags, attributes and
///    URL schemes. `<script>`, `<style>` and other non-text tags are removed
///    together with their content.
///
/// Stage 2 always runs, so whatever stage 1 produces is still filtered.
/// Sanitizing never fails: malformed markup is repaired or escaped.
#[derive(Debug, Clone, Copy)]
pub struct HtmlSanitizer<'a> {
    policy: &'a HtmlPolicy,
}

impl<'a> HtmlSanitizer<'a> {
    pub fn new(policy: &'a HtmlPolicy) -> Self {
        Self { policy }
    }

    pub fn sanitize(&self, input: &str) -> String {
        let rewritten = match self.rewrite(input) {
            Ok(Some(output)) => Cow::Owned(output),
            Ok(None) => Cow::Borrowed(input),
            Err(e) => {
                tracing::warn!(error = %e, "HTML rewrite pass failed, cleaning untransformed input");
                Cow::Borrowed(input)
            }
        };

        self.builder().clean(&rewritten).to_string()
    }

    /// Allow-list cleaner configured from the policy.
    fn builder(&self) -> ammonia::Builder<'a> {
        let p = self.policy;
        let mut builder = ammonia::Builder::default();
        builder
            .tags(as_strs(&p.tags))
            .clean_content_tags(as_strs(&p.clean_content_tags))
            .tag_attributes(as_str_map(&p.tag_attributes))
            .generic_attributes(as_strs(&p.generic_attributes))
            .allowed_classes(as_str_map(&p.allowed_classes))
            .url_schemes(as_strs(&p.url_schemes))
            .link_rel(p.link_rel.as_deref())
            .strip_comments(p.strip_comments)
            .id_prefix(p.id_prefix.as_deref());

        match &p.relative_urls {
            RelativeUrls::PassThrough => builder.url_relative(ammonia::UrlRelative::PassThrough),
            RelativeUrls::Deny => builder.url_relative(ammonia::UrlRelative::Deny),
            RelativeUrls::RewriteWithBase(base) => {
                builder.url_relative(ammonia::UrlRelative::RewriteWithBase(base.clone()))
            }
        };

        builder
    }

    /// Applies tag transforms and the text filter.
    /// Returns `Ok(None)` when the policy has neither.
    fn rewrite(&self, input: &str) -> Result<Option<String>, RewritingError> {
        let p = self.policy;
        if p.transforms.is_empty() && p.text_filter.is_none() {
            return Ok(None);
        }

        let mut element_content_handlers = Vec::new();
        let mut document_content_handlers = Vec::new();

        if let Some(filter) = &p.text_filter {
            // Innermost open element, as written in the source.
            let open_tags: Rc<RefCell<Vec<String>>> = Rc::default();

            let stack = Rc::clone(&open_tags);
            element_content_handlers.push(element!("*", move |el| {
                let tag = el.tag_name();
                if let Some(handlers) = el.end_tag_handlers() {
                    stack.borrow_mut().push(tag);
                    let stack = Rc::clone(&stack);
                    handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                        stack.borrow_mut().pop();
                        Ok(())
                    }) as lol_html::EndTagHandler<'static>);
                }
                Ok(())
            }));

            // A text node can arrive in several chunks; filter it as a whole.
            let mut buffer = String::new();
            document_content_handlers.push(doc_text!(move |chunk| {
                buffer.push_str(chunk.as_str());
                if chunk.last_in_text_node() {
                    if !buffer.is_empty() {
                        let filtered = {
                            let open = open_tags.borrow();
                            filter.apply(&buffer, open.last().map(String::as_str))
                        };
                        chunk.replace(&filtered, ContentType::Html);
                        buffer.clear();
                    }
                } else {
                    chunk.remove();
                }
                Ok(())
            }));
        }

        if !p.transforms.is_empty() {
            element_content_handlers.push(element!("*", move |el| {
                let tag = el.tag_name();
                let Some(transform) = p.transforms.get(&tag).or_else(|| p.transforms.get(ANY_TAG))
                else {
                    return Ok(());
                };

                // One bad transform must not cost the rest of the document.
                if let Err(e) = transform_element(el, transform) {
                    tracing::warn!(%tag, error = %e, "tag transform failed, element left untransformed");
                }
                Ok(())
            }));
        }

        rewrite_str(
            input,
            RewriteStrSettings {
                element_content_handlers,
                document_content_handlers,
                ..RewriteStrSettings::new()
            },
        )
        .map(Some)
    }
}

/// Applies `transform` to `el`. On failure the element is put back the way
/// it was and the error is returned.
fn transform_element(el: &mut Element<'_, '_>, transform: &TagTransform) -> HandlerResult {
    let tag = el.tag_name();
    let original: Vec<(String, String)> = el
        .attributes()
        .iter()
        .map(|attr| (attr.name(), attr.value()))
        .collect();
    let next = transform.apply(TagFrame {
        tag_name: tag.clone(),
        attributes: original.iter().cloned().collect(),
    });

    let applied = (|| -> HandlerResult {
        if !next.tag_name.eq_ignore_ascii_case(&tag) {
            el.set_tag_name(&next.tag_name)?;
        }
        for (name, _) in original.iter().filter(|(n, _)| !next.attributes.contains_key(n)) {
            el.remove_attribute(name);
        }
        for (name, value) in &next.attributes {
            el.set_attribute(name, value)?;
        }
        Ok(())
    })();

    if applied.is_err() {
        let _ = el.set_tag_name(&tag);
        for name in next.attributes.keys() {
            el.remove_attribute(name);
        }
        for (name, value) in &original {
            let _ = el.set_attribute(name, value);
        }
    }
    applied
}

/// Sanitizes `input` under `policy`.
pub fn sanitize(input: &str, policy: &HtmlPolicy) -> String {
    HtmlSanitizer::new(policy).sanitize(input)
}

fn as_strs(set: &BTreeSet<String>) -> HashSet<&str> {
    set.iter().map(String::as_str).collect()
}

fn as_str_map(map: &BTreeMap<String, BTreeSet<String>>) -> HashMap<&str, HashSet<&str>> {
    map.iter()
        .map(|(tag, values)| (tag.as_str(), as_strs(values)))
        .collect()
}
