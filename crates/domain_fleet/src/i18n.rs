//! Embedded message catalogues for fleet errors

use core_kernel::{FluentTranslator, LocalisationError};

/// Locale used when the requested one has no catalogue
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// Every locale shipped with the crate
pub const SUPPORTED_LOCALES: [&str; 2] = ["pt-BR", "en-US"];

const PT_BR: &str = include_str!("../locales/pt-BR/errors.ftl");
const EN_US: &str = include_str!("../locales/en-US/errors.ftl");

/// Builds a translator for the requested locale over the embedded catalogues
pub fn translator(locale: &str) -> Result<FluentTranslator, LocalisationError> {
    FluentTranslator::new(DEFAULT_LOCALE)?
        .with_catalogue("pt-BR", PT_BR)?
        .with_catalogue("en-US", EN_US)?
        .for_locale(locale)
}
