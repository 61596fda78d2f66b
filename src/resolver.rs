//! Runtime string resolution.
//!
//! A [`Resolver`] is an immutable snapshot of one catalog; lookups never
//! allocate or perform I/O. A [`Translator`] owns the currently active
//! snapshot and swaps it atomically on locale changes.

/// Plural rules
pub mod plural;

use std::path::Path;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};

use serde::{
    Deserialize,
    Serialize,
};

pub use self::plural::PluralRule;
use crate::input::CatalogParseError;
use crate::locale::LocaleId;
use crate::store::CatalogStore;
use crate::types::{
    Message,
    MessageKey,
    MessageStatus,
    Translation,
};

/// How messages marked `unfinished` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnfinishedPolicy {
    /// Show the translation when the translator entered one.
    #[default]
    UseTranslation,
    /// Always show the source text.
    UseSource,
}

/// Knobs shared by every resolver a [`Translator`] hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    pub unfinished: UnfinishedPolicy,
    /// Emit a `trace` event for every lookup that falls back to the source text.
    pub log_missing: bool,
}

/// Read-only view used by UI code to turn source strings into display text.
///
/// Without a catalog every lookup returns the source text unchanged.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    /// `None` answers every lookup with the source text.
    store: Option<Arc<CatalogStore>>,
    /// Rule of the catalog language.
    plural_rule: PluralRule,
    options: ResolveOptions,
}

impl Resolver {
    #[must_use]
    pub fn new(store: Arc<CatalogStore>, options: ResolveOptions) -> Self {
        let plural_rule = store.locale().map_or_else(PluralRule::default, PluralRule::for_locale);
        Self { store: Some(store), plural_rule, options }
    }

    /// Resolver that always answers with the source text.
    #[must_use]
    pub fn source_only() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn store(&self) -> Option<&CatalogStore> {
        self.store.as_deref()
    }

    #[must_use]
    pub fn locale(&self) -> Option<&LocaleId> {
        self.store()?.locale()
    }

    #[must_use]
    pub const fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    /// Display text for `source` in `context`.
    ///
    /// Returns the translation of the matching active message, the empty
    /// string for a finished message translated as empty, and `source`
    /// itself in every other case. Placeholders like `%1` are left as-is.
    #[must_use]
    pub fn translate<'a>(&'a self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        match self.usable_message(context, source, comment) {
            // A blank plural form of an unfinished message is a placeholder.
            Some(message)
                if message.status == MessageStatus::Finished
                    || !message.translation.text().is_empty() =>
            {
                message.translation.text()
            }
            _ => self.fall_back(context, source, comment),
        }
    }

    /// [`Self::translate`] for an explicit key.
    #[must_use]
    pub fn resolve<'a>(&'a self, key: &'a MessageKey) -> &'a str {
        self.translate(&key.context, &key.source, key.comment())
    }

    /// Display text for a plural message and count `n`.
    ///
    /// `%n` is not substituted. Missing or empty forms fall back to `source`.
    #[must_use]
    pub fn translate_n<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        n: i64,
    ) -> &'a str {
        let Some(message) = self.usable_message(context, source, comment) else {
            return self.fall_back(context, source, comment);
        };

        match &message.translation {
            Translation::Single(text) => text.as_str(),
            Translation::Numerus(forms) => {
                let index = self.plural_rule.form_index(n);
                match forms.get(index).filter(|form| !form.is_empty()) {
                    Some(form) => form.as_str(),
                    None => self.fall_back(context, source, comment),
                }
            }
        }
    }

    /// Active message for the key, if the policy allows showing it.
    fn usable_message(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
    ) -> Option<&Message> {
        let message = self.store.as_deref()?.get(context, source, comment)?;
        match message.status {
            MessageStatus::Finished => Some(message),
            MessageStatus::Unfinished => match self.options.unfinished {
                UnfinishedPolicy::UseTranslation if !message.translation.is_empty() => {
                    Some(message)
                }
                _ => None,
            },
            MessageStatus::Obsolete | MessageStatus::Vanished => None,
        }
    }

    /// Returns `source`, tracing the miss when enabled.
    fn fall_back<'a>(&self, context: &str, source: &'a str, comment: Option<&str>) -> &'a str {
        if self.options.log_missing && self.store.is_some() {
            tracing::trace!(context, source, comment = ?comment, "Missing translation");
        }
        source
    }
}

/// Owner of the active catalog.
///
/// Holds the resolver handed to UI code. A locale switch builds the new
/// catalog completely before swapping it in, so readers see either the old
/// or the new catalog, never a partial one.
#[derive(Debug, Default)]
pub struct Translator {
    /// Resolver handed out to readers.
    current: RwLock<Resolver>,
    options: ResolveOptions,
}

impl Translator {
    /// Translator showing source texts until a catalog is installed.
    #[must_use]
    pub fn new(options: ResolveOptions) -> Self {
        Self { current: RwLock::new(Resolver::source_only()), options }
    }

    /// Snapshot of the active catalog; unaffected by later switches.
    #[must_use]
    pub fn resolver(&self) -> Resolver {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Makes `store` the active catalog.
    pub fn install(&self, store: CatalogStore) {
        let resolver = Resolver::new(Arc::new(store), self.options);
        tracing::info!(
            locale = ?resolver.locale().map(ToString::to_string),
            "Activating catalog"
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = resolver;
    }

    /// Loads the catalog at `path` and activates it.
    ///
    /// # Errors
    /// Returns the load error; the previously active catalog stays in place.
    pub fn switch_locale(&self, path: &Path) -> Result<(), CatalogParseError> {
        match CatalogStore::load(path) {
            Ok(store) => {
                self.install(store);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Locale switch aborted, keeping current catalog"
                );
                Err(e)
            }
        }
    }

    /// Returns to the built-in source-language texts.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Resolver::source_only();
    }

    #[must_use]
    pub fn locale(&self) -> Option<LocaleId> {
        self.resolver().locale().cloned()
    }

    /// Owned [`Resolver::translate`] against the active catalog.
    #[must_use]
    pub fn translate(&self, context: &str, source: &str, comment: Option<&str>) -> String {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        current.translate(context, source, comment).to_string()
    }
}
