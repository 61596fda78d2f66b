//! Plural form selection for `numerus="yes"` messages.
//!
//! Each catalog stores one `<numerusform>` per plural form of its language;
//! the rule picks which one applies to a count.

use crate::locale::LocaleId;

/// Plural rule families, in the order Qt Linguist assigns forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluralRule {
    /// One form for every count (Japanese, Chinese, ...).
    Single,
    /// `1` / everything else.
    #[default]
    OneOther,
    /// `0, 1` / everything else (French, Brazilian Portuguese).
    ZeroOneOther,
    /// `…1` / `…2-4` / everything else, with teens in the last form.
    Slavic,
    /// `1` / `2-4` / everything else.
    Czech,
    /// `1` / `…2-4` except teens / everything else.
    Polish,
    Lithuanian,
    /// `…1` except `11` / non-zero / zero.
    Latvian,
    Romanian,
    /// `…01` / `…02` / `…03-04` / everything else.
    Slovenian,
    /// `1` / `2` / everything else.
    Irish,
    /// `…1` except `11` / everything else.
    Macedonian,
    /// `0` / `1` / `2` / `…03-10` / `…11-99` / everything else.
    Arabic,
}

impl PluralRule {
    /// Rule for a catalog locale; unknown languages use [`PluralRule::OneOther`].
    #[must_use]
    pub fn for_locale(locale: &LocaleId) -> Self {
        match (locale.language(), locale.territory()) {
            ("pt", Some("BR")) => Self::ZeroOneOther,
            (language, _) => Self::for_language(language),
        }
    }

    #[must_use]
    pub fn for_language(language: &str) -> Self {
        match language {
            "ja" | "zh" | "ko" | "vi" | "th" | "id" | "ms" | "fa" | "my" | "bo" | "lo" | "km"
            | "ka" | "ug" => Self::Single,
            "fr" | "hy" | "tl" | "fil" | "oc" | "br" => Self::ZeroOneOther,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::Slavic,
            "cs" | "sk" => Self::Czech,
            "pl" => Self::Polish,
            "lt" => Self::Lithuanian,
            "lv" => Self::Latvian,
            "ro" => Self::Romanian,
            "sl" => Self::Slovenian,
            "ga" => Self::Irish,
            "mk" | "is" => Self::Macedonian,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    /// Number of `<numerusform>` entries a complete translation has.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::OneOther | Self::ZeroOneOther | Self::Macedonian => 2,
            Self::Slavic
            | Self::Czech
            | Self::Polish
            | Self::Lithuanian
            | Self::Latvian
            | Self::Romanian
            | Self::Irish => 3,
            Self::Slovenian => 4,
            Self::Arabic => 6,
        }
    }

    /// Index of the form used for `n`.
    #[must_use]
    pub fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let mod10 = n % 10;
        let mod100 = n % 100;
        let teen = (11..=19).contains(&mod100);

        match self {
            Self::Single => 0,
            Self::OneOther => usize::from(n != 1),
            Self::ZeroOneOther => usize::from(n > 1),
            Self::Slavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Lithuanian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 >= 2 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Macedonian => usize::from(!(mod10 == 1 && mod100 != 11)),
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if (3..=10).contains(&mod100) => 3,
                _ if mod100 >= 11 => 4,
                _ => 5,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("de_DE", PluralRule::OneOther)]
    #[case("ja_JP", PluralRule::Single)]
    #[case("zh_CN", PluralRule::Single)]
    #[case("pt_BR", PluralRule::ZeroOneOther)]
    #[case("pt_PT", PluralRule::OneOther)]
    #[case("fr", PluralRule::ZeroOneOther)]
    #[case("ru_RU", PluralRule::Slavic)]
    #[case("xx", PluralRule::OneOther)]
    fn test_for_locale(#[case] locale: &str, #[case] expected: PluralRule) {
        assert_eq!(PluralRule::for_locale(&LocaleId::parse(locale).unwrap()), expected);
    }

    #[rstest]
    #[case(PluralRule::Single, &[0, 0, 0, 0, 0])]
    #[case(PluralRule::OneOther, &[1, 0, 1, 1, 1])]
    #[case(PluralRule::ZeroOneOther, &[0, 0, 1, 1, 1])]
    #[case(PluralRule::Slavic, &[2, 0, 1, 2, 2])]
    #[case(PluralRule::Czech, &[2, 0, 1, 2, 2])]
    #[case(PluralRule::Arabic, &[0, 1, 2, 3, 4])]
    fn test_form_index_small_counts(#[case] rule: PluralRule, #[case] expected: &[usize]) {
        // Counts 0, 1, 2, 5, 11.
        let indexes: Vec<usize> = [0, 1, 2, 5, 11].iter().map(|&n| rule.form_index(n)).collect();
        assert_eq!(indexes, expected);
    }

    #[rstest]
    #[case(PluralRule::Slavic, 21, 0)]
    #[case(PluralRule::Slavic, 22, 1)]
    #[case(PluralRule::Slavic, 12, 2)]
    #[case(PluralRule::Polish, 22, 1)]
    #[case(PluralRule::Polish, 21, 2)]
    #[case(PluralRule::Lithuanian, 21, 0)]
    #[case(PluralRule::Lithuanian, 15, 2)]
    #[case(PluralRule::Latvian, 0, 2)]
    #[case(PluralRule::Romanian, 119, 1)]
    #[case(PluralRule::Romanian, 120, 2)]
    #[case(PluralRule::Slovenian, 103, 2)]
    #[case(PluralRule::Irish, 2, 1)]
    #[case(PluralRule::Macedonian, 11, 1)]
    #[case(PluralRule::Arabic, 102, 5)]
    #[case(PluralRule::OneOther, -1, 0)]
    #[case(PluralRule::Slavic, 14, 2)]
    #[case(PluralRule::Slavic, 24, 1)]
    #[case(PluralRule::Romanian, 101, 1)]
    #[case(PluralRule::Arabic, 103, 3)]
    #[case(PluralRule::Arabic, 110, 3)]
    #[case(PluralRule::Macedonian, 21, 0)]
    #[case(PluralRule::ZeroOneOther, 2, 1)]
    fn test_form_index_edge_counts(
        #[case] rule: PluralRule,
        #[case] n: i64,
        #[case] expected: usize,
    ) {
        assert_eq!(rule.form_index(n), expected);
    }

    #[rstest]
    fn test_form_index_within_form_count() {
        let rules = [
            PluralRule::Single,
            PluralRule::OneOther,
            PluralRule::ZeroOneOther,
            PluralRule::Slavic,
            PluralRule::Czech,
            PluralRule::Polish,
            PluralRule::Lithuanian,
            PluralRule::Latvian,
            PluralRule::Romanian,
            PluralRule::Slovenian,
            PluralRule::Irish,
            PluralRule::Macedonian,
            PluralRule::Arabic,
        ];
        for rule in rules {
            for n in 0..250 {
                assert!(rule.form_index(n) < rule.form_count(), "{rule:?} n={n}");
            }
        }
    }
}
