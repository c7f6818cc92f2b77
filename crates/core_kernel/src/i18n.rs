//! Message localisation
//!
//! Domain code never hardcodes user-facing text. It hands a message key
//! (and optional arguments) to a [`Translator`], which is injected by the
//! application. [`FluentTranslator`] is the production implementation and
//! resolves keys against Fluent (`.ftl`) catalogues.

use std::collections::HashMap;
use std::fmt;

use fluent::{FluentArgs, FluentBundle, FluentResource};
use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use thiserror::Error;
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// Errors raised while loading catalogues or selecting a locale
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocalisationError {
    #[error("Invalid locale identifier: {0}")]
    InvalidLocale(String),

    #[error("Catalogue for {locale} has syntax errors: {details}")]
    InvalidCatalogue {
        locale: String,
        details: String,
    },

    #[error("Catalogue for {locale} redefines existing messages: {details}")]
    DuplicateMessage {
        locale: String,
        details: String,
    },
}

/// Turns a message key into user-facing text.
pub trait Translator: Send + Sync {
    /// Translates a key without arguments
    fn translate(&self, key: &str) -> String {
        self.translate_with(key, &[])
    }

    /// Translates a key, substituting the named arguments
    fn translate_with(&self, key: &str, args: &[(&str, String)]) -> String;
}

/// Translator that returns the key itself.
///
/// Useful when no catalogue is configured and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate_with(&self, key: &str, _args: &[(&str, String)]) -> String {
        key.to_string()
    }
}

/// Fluent-backed translator
///
/// Catalogues are registered per locale; [`FluentTranslator::for_locale`]
/// negotiates the requested locale against the registered ones. Keys that
/// are missing from the selected locale are looked up in the fallback
/// locale and, failing that, returned verbatim.
pub struct FluentTranslator {
    fallback: LanguageIdentifier,
    selected: LanguageIdentifier,
    catalogues: HashMap<LanguageIdentifier, Vec<FluentResource>>,
}

impl FluentTranslator {
    /// Creates an empty translator whose fallback (and initial) locale is `fallback`
    pub fn new(fallback: &str) -> Result<Self, LocalisationError> {
        let fallback = parse_locale(fallback)?;
        Ok(Self {
            selected: fallback.clone(),
            fallback,
            catalogues: HashMap::new(),
        })
    }

    /// Registers a Fluent source for a locale
    ///
    /// The source is parsed eagerly so broken catalogues fail at startup
    /// instead of at translation time.
    pub fn with_catalogue(mut self, locale: &str, source: &str) -> Result<Self, LocalisationError> {
        let langid = parse_locale(locale)?;
        let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errors)| {
            LocalisationError::InvalidCatalogue {
                locale: locale.to_string(),
                details: format!("{:?}", errors),
            }
        })?;

        // Reject duplicate message ids across resources of the same locale.
        let existing = self.catalogues.entry(langid.clone()).or_default();
        let mut bundle = FluentBundle::new(vec![langid]);
        for res in existing.iter() {
            let _ = bundle.add_resource(res);
        }
        if let Err(errors) = bundle.add_resource(&resource) {
            return Err(LocalisationError::DuplicateMessage {
                locale: locale.to_string(),
                details: format!("{:?}", errors),
            });
        }
        drop(bundle);

        existing.push(resource);
        Ok(self)
    }

    /// Selects the best registered locale for the requested one
    pub fn for_locale(mut self, requested: &str) -> Result<Self, LocalisationError> {
        let requested = vec![parse_locale(requested)?];
        let available: Vec<LanguageIdentifier> = self.catalogues.keys().cloned().collect();
        let negotiated = negotiate_languages(
            &requested,
            &available,
            Some(&self.fallback),
            NegotiationStrategy::Lookup,
        );

        if let Some(best) = negotiated.first() {
            self.selected = (*best).clone();
        }
        Ok(self)
    }

    /// The locale currently used for translation
    pub fn locale(&self) -> &LanguageIdentifier {
        &self.selected
    }

    /// Registered locales
    pub fn available_locales(&self) -> Vec<&LanguageIdentifier> {
        self.catalogues.keys().collect()
    }

    fn lookup(
        &self,
        locale: &LanguageIdentifier,
        key: &str,
        args: Option<&FluentArgs>,
    ) -> Option<String> {
        let resources = self.catalogues.get(locale)?;

        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        bundle.set_use_isolating(false);
        for res in resources {
            let _ = bundle.add_resource(res);
        }

        let message = bundle.get_message(key)?;
        let pattern = message.value()?;
        let mut errors = Vec::new();
        let text = bundle.format_pattern(pattern, args, &mut errors).into_owned();
        if !errors.is_empty() {
            warn!(key, locale = %locale, ?errors, "fluent formatting reported errors");
        }
        Some(text)
    }
}

impl Translator for FluentTranslator {
    fn translate_with(&self, key: &str, args: &[(&str, String)]) -> String {
        let fluent_args = if args.is_empty() {
            None
        } else {
            let mut fa = FluentArgs::new();
            for (name, value) in args {
                fa.set(*name, value.clone());
            }
            Some(fa)
        };

        self.lookup(&self.selected, key, fluent_args.as_ref())
            .or_else(|| self.lookup(&self.fallback, key, fluent_args.as_ref()))
            .unwrap_or_else(|| key.to_string())
    }
}

impl fmt::Debug for FluentTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentTranslator")
            .field("fallback", &self.fallback.to_string())
            .field("selected", &self.selected.to_string())
            .field(
                "locales",
                &self.catalogues.keys().map(|l| l.to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn parse_locale(locale: &str) -> Result<LanguageIdentifier, LocalisationError> {
    locale
        .parse::<LanguageIdentifier>()
        .map_err(|_| LocalisationError::InvalidLocale(locale.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN: &str = "car-in-use = Car { $id } is already in use\nplain = Plain text\n";
    const PT: &str = "car-in-use = O carro { $id } já está em uso\n";

    fn translator() -> FluentTranslator {
        FluentTranslator::new("en-US")
            .unwrap()
            .with_catalogue("en-US", EN)
            .unwrap()
            .with_catalogue("pt-BR", PT)
            .unwrap()
    }

    #[test]
    fn test_translates_with_arguments() {
        let t = translator().for_locale("pt-BR").unwrap();
        let text = t.translate_with("car-in-use", &[("id", "CAR-1".to_string())]);
        assert_eq!(text, "O carro CAR-1 já está em uso");
    }

    #[test]
    fn test_missing_key_in_locale_uses_fallback() {
        let t = translator().for_locale("pt-BR").unwrap();
        assert_eq!(t.translate("plain"), "Plain text");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let t = translator();
        assert_eq!(t.translate("no-such-key"), "no-such-key");
    }

    #[test]
    fn test_negotiates_language_only_request() {
        let t = translator().for_locale("pt").unwrap();
        assert_eq!(t.locale().to_string(), "pt-BR");
    }

    #[test]
    fn test_unsupported_locale_keeps_fallback() {
        let t = translator().for_locale("de-DE").unwrap();
        assert_eq!(t.locale().to_string(), "en-US");
    }

    #[test]
    fn test_broken_catalogue_is_rejected() {
        let result = FluentTranslator::new("en-US")
            .unwrap()
            .with_catalogue("en-US", "= missing id\n");
        assert!(matches!(result, Err(LocalisationError::InvalidCatalogue { .. })));
    }

    #[test]
    fn test_key_translator_echoes_key() {
        assert_eq!(KeyTranslator.translate("car-not-found"), "car-not-found");
    }
}
