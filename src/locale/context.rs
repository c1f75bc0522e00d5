//! Process-wide language preference
//!
//! The context is the single owner of the active locale. It is created once at
//! startup and passed to whatever needs to render text.

use crate::error::SetuError;
use crate::locale::catalog::{translate, Locale};
use crate::store::KeyValueStore;
use tracing::{info, warn};

/// Storage key holding the locale code
pub const LANGUAGE_KEY: &str = "language";

/// Active locale backed by persistent storage
pub struct LanguageContext<S: KeyValueStore> {
    store: S,
    locale: Locale,
}

impl<S: KeyValueStore> LanguageContext<S> {
    /// Load the saved locale, keeping the default English on any failure
    pub fn load(store: S) -> Self {
        Self::load_with_default(store, Locale::default())
    }

    /// Load the saved locale, keeping `default` on any failure
    pub fn load_with_default(store: S, default: Locale) -> Self {
        let locale = match store.read(LANGUAGE_KEY) {
            Ok(Some(code)) => match Locale::from_code(&code) {
                Some(locale) => locale,
                None => {
                    warn!(code = %code, "ignoring unsupported saved language");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!(error = %e, "failed to load language preference");
                default
            }
        };

        Self { store, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Persist and switch the active locale
    ///
    /// The locale only changes once the write succeeds; on failure the previous
    /// locale stays active and the error is returned.
    pub fn set_language(&mut self, locale: Locale) -> Result<(), SetuError> {
        if let Err(e) = self.store.write(LANGUAGE_KEY, locale.code()) {
            warn!(error = %e, locale = %locale, "failed to save language preference");
            return Err(e);
        }
        info!(from = %self.locale, to = %locale, "language changed");
        self.locale = locale;
        Ok(())
    }

    /// Persist and switch the active locale from a code such as `"hi"`
    pub fn set_language_code(&mut self, code: &str) -> Result<(), SetuError> {
        let locale: Locale = code.parse()?;
        self.set_language(locale)
    }

    /// Translate `key` in the active locale
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        translate(key, self.locale)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
