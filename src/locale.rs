//! Locale identifiers and catalog file name conventions.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use unic_langid::LanguageIdentifier;

/// ISO 639 language codes accepted when guessing a locale from a file name.
///
/// Application prefixes such as `vym` are valid language subtags
/// syntactically, so path detection only trusts codes listed here.
static LANGUAGE_CODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "af", "am", "ar", "as", "az", "be", "bg", "bn", "bo", "br", "bs", "ca", "cs", "cy", "da",
        "de", "dv", "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fil", "fo", "fr", "fy", "ga",
        "gd", "gl", "gu", "he", "hi", "hr", "hu", "hy", "ia", "id", "is", "it", "ja", "ka", "kk",
        "km", "kn", "ko", "kok", "ku", "ky", "la", "lb", "lo", "lt", "lv", "mi", "mk", "ml", "mn",
        "mr", "ms", "mt", "my", "nb", "ne", "nl", "nn", "no", "oc", "or", "pa", "pl", "ps", "pt",
        "qu", "ro", "ru", "sa", "sd", "se", "si", "sk", "sl", "sq", "sr", "sv", "sw", "syr", "ta",
        "te", "tg", "th", "tk", "tl", "tr", "tt", "ug", "uk", "ur", "uz", "vi", "wa", "xh", "yi",
        "zh", "zu",
    ]
    .into_iter()
    .collect()
});

/// A catalog locale such as `de_DE` or `ja`.
///
/// Accepts `-` and `_` separators in any case and ignores POSIX suffixes
/// (`de_DE.UTF-8@euro`). Displays in the underscore form Qt uses in file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleId(LanguageIdentifier);

/// Error for strings that are not locale identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid locale identifier '{0}'")]
pub struct InvalidLocale(pub String);

impl LocaleId {
    /// Parses a locale, returning `None` for malformed input.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.split(['.', '@']).next().unwrap_or_default();
        if value.is_empty() {
            return None;
        }
        let langid: LanguageIdentifier = value.parse().ok()?;
        if langid.language.is_empty() {
            return None;
        }
        Some(Self(langid))
    }

    /// Parses only locales whose language is a known ISO 639 code.
    #[must_use]
    pub fn parse_known(value: &str) -> Option<Self> {
        Self::parse(value).filter(|locale| LANGUAGE_CODES.contains(locale.language()))
    }

    #[must_use]
    pub fn language(&self) -> &str {
        self.0.language.as_str()
    }

    #[must_use]
    pub fn territory(&self) -> Option<&str> {
        self.0.region.as_ref().map(|region| region.as_str())
    }

    /// The same locale without script and territory.
    #[must_use]
    pub fn language_only(&self) -> Self {
        Self(LanguageIdentifier::from_parts(self.0.language, None, None, &[]))
    }

    #[must_use]
    pub fn same_language(&self, other: &Self) -> bool {
        self.0.language == other.0.language
    }

    /// Operating system locale, if it can be determined.
    #[must_use]
    pub fn system() -> Option<Self> {
        sys_locale::get_locale().and_then(|locale| Self::parse(&locale))
    }
}

impl FromStr for LocaleId {
    type Err = InvalidLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidLocale(s.to_string()))
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.language())?;
        if let Some(script) = &self.0.script {
            write!(f, "_{}", script.as_str())?;
        }
        if let Some(territory) = self.territory() {
            write!(f, "_{territory}")?;
        }
        Ok(())
    }
}

/// Lookup order for `requested`, most specific first.
///
/// `de_AT` yields `[de_AT, de]`; a plain language yields just itself.
#[must_use]
pub fn candidate_locales(requested: &LocaleId) -> Vec<LocaleId> {
    let mut candidates = vec![requested.clone()];
    let language_only = requested.language_only();
    if language_only != *requested {
        candidates.push(language_only);
    }
    candidates
}

/// Detects the locale of a catalog from its path.
///
/// Tries, in order: dot-separated parts of the file stem from the right,
/// an underscore suffix of the stem, and the parent directory name.
///
/// # Examples
/// - `lang/vym.de_DE.ts` → `de_DE`
/// - `translations/myapp_pt_BR.ts` → `pt_BR`
/// - `i18n/ja/app.ts` → `ja`
#[must_use]
pub fn detect_locale_from_path(path: &Path) -> Option<LocaleId> {
    let stem = path.file_stem()?.to_string_lossy();

    for part in stem.rsplit('.') {
        if let Some(locale) = LocaleId::parse_known(part) {
            return Some(locale);
        }
    }

    let segments: Vec<&str> = stem.split(['_', '-']).collect();
    for take in [2, 1] {
        if segments.len() <= take {
            continue;
        }
        if let Some(suffix) = segments.get(segments.len() - take..)
            && let Some(locale) = LocaleId::parse_known(&suffix.join("_"))
        {
            return Some(locale);
        }
    }

    let parent = path.parent()?.file_name()?.to_string_lossy();
    LocaleId::parse_known(&parent)
}
