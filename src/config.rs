// src/config.rs

use std::env;

use dotenvy::dotenv;
use url::Url;

use crate::{
    error::ConfigError,
    models::policy::{PolicyOptions, RelativeUrls},
    scalar::HtmlScalar,
};

/// Environment-driven scalar configuration.
///
/// * `HTML_POLICY`: inline `PolicyOptions` JSON, merged over the baseline.
/// * `HTML_EXTRA_TAGS`: comma-separated tags added to the allowed set.
/// * `HTML_BASE_URL`: absolute URL that relative links are resolved against.
/// * `HTML_ALLOW_UNSAFE`: `true`/`1` turns off the script-vector deny list.
#[derive(Debug, Clone, Default)]
pub struct ScalarConfig {
    pub options: PolicyOptions,
}

impl ScalarConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = match lookup("HTML_POLICY") {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<PolicyOptions>(&raw)?,
            _ => PolicyOptions::new(),
        };

        if let Some(extra) = lookup("HTML_EXTRA_TAGS") {
            let extra: Vec<&str> = extra
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if !extra.is_empty() {
                options = options.extend_tags(extra);
            }
        }

        if let Some(base) = lookup("HTML_BASE_URL") {
            let base = Url::parse(base.trim())?;
            options = options.relative_urls(RelativeUrls::RewriteWithBase(base));
        }

        if let Some(flag) = lookup("HTML_ALLOW_UNSAFE") {
            let allow = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            options = options.allow_unsafe_markup(allow);
        }

        Ok(Self { options })
    }

    pub fn into_scalar(self) -> HtmlScalar {
        HtmlScalar::new(self.options)
    }
}
