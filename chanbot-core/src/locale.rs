//! Localized bot texts backed by Fluent bundles.
//!
//! Resources are embedded at compile time; one bundle per supported language. Lookups fall back
//! to the default language, then to the key itself so a missing string never breaks a reply.

use std::collections::HashMap;

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use tracing::warn;
use unic_langid::LanguageIdentifier;

use crate::error::{ChanbotError, Result};

/// Language used when neither the user nor the config picks a supported one.
pub const DEFAULT_LOCALE: &str = "ar";

const RESOURCES: &[(&str, &str)] = &[
    ("ar", include_str!("../locales/ar/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Holds one Fluent bundle per language.
pub struct Localizer {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_locale: String,
}

impl Localizer {
    /// Loads all embedded resources. `default_locale` must be one of the embedded languages.
    pub fn new(default_locale: &str) -> Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, source) in RESOURCES {
            bundles.insert(lang.to_string(), Self::create_bundle(lang, source)?);
        }
        if !bundles.contains_key(default_locale) {
            return Err(ChanbotError::Config(format!(
                "unsupported locale '{}' (available: {})",
                default_locale,
                Self::available().join(", ")
            )));
        }
        Ok(Self {
            bundles,
            default_locale: default_locale.to_string(),
        })
    }

    /// Languages with embedded resources.
    pub fn available() -> Vec<&'static str> {
        RESOURCES.iter().map(|(lang, _)| *lang).collect()
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn create_bundle(lang: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let langid: LanguageIdentifier = lang
            .parse()
            .map_err(|e| ChanbotError::Config(format!("invalid language id {}: {}", lang, e)))?;
        let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errors)| {
            ChanbotError::Config(format!("invalid {} resource: {:?}", lang, errors))
        })?;
        let mut bundle = FluentBundle::new_concurrent(vec![langid]);
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| ChanbotError::Config(format!("{} resource: {:?}", lang, errors)))?;
        Ok(bundle)
    }

    /// Picks the bundle for a client language tag (`en-US` → `en`), else the default.
    fn bundle_for(&self, lang: Option<&str>) -> &FluentBundle<FluentResource> {
        lang.map(|tag| tag.split(['-', '_']).next().unwrap_or(tag).to_ascii_lowercase())
            .and_then(|primary| self.bundles.get(&primary))
            .unwrap_or_else(|| &self.bundles[&self.default_locale])
    }

    /// Message without arguments.
    pub fn t(&self, key: &str, lang: Option<&str>) -> String {
        self.t_args(key, &[], lang)
    }

    /// Message with string arguments.
    pub fn t_args(&self, key: &str, args: &[(&str, &str)], lang: Option<&str>) -> String {
        let bundle = self.bundle_for(lang);
        let bundle = if bundle.has_message(key) {
            bundle
        } else {
            &self.bundles[&self.default_locale]
        };

        let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
            warn!(key = %key, "Missing translation");
            return key.to_string();
        };

        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }

        let mut errors = Vec::new();
        let value = bundle.format_pattern(pattern, Some(&fluent_args), &mut errors);
        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Translation formatted with errors");
        }
        value.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_unknown_default() {
        assert!(Localizer::new("xx").is_err());
    }

    #[test]
    fn test_language_selection_and_fallback() {
        let l10n = Localizer::new("ar").unwrap();
        let en = l10n.t("gate-subscribe-button", Some("en-US"));
        let ar = l10n.t("gate-subscribe-button", None);
        let unknown = l10n.t("gate-subscribe-button", Some("fr"));
        assert!(en.contains("Join"));
        assert_ne!(en, ar);
        assert_eq!(ar, unknown);
    }

    #[test]
    fn test_arguments_are_substituted() {
        let l10n = Localizer::new("en").unwrap();
        let text = l10n.t_args("gate-subscribe-required", &[("channel", "@news")], None);
        assert!(text.contains("@news"));
    }

    #[test]
    fn test_missing_key_returns_key() {
        let l10n = Localizer::new("en").unwrap();
        assert_eq!(l10n.t("no-such-key", None), "no-such-key");
    }

    #[test]
    fn test_every_english_key_exists_in_arabic() {
        let l10n = Localizer::new("en").unwrap();
        let en_source = RESOURCES.iter().find(|(l, _)| *l == "en").unwrap().1;
        for line in en_source.lines() {
            let Some((key, _)) = line.split_once(" =") else {
                continue;
            };
            if key.starts_with(' ') || key.starts_with('#') || key.is_empty() {
                continue;
            }
            assert!(l10n.bundles["ar"].has_message(key), "missing ar key: {}", key);
        }
    }
}
