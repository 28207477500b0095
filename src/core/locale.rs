//! Locale spelling utilities.
//!
//! Locale tags show up in translation trees under many spellings (`zh_CN`, `zh-cn`,
//! `ZH-CN`). Everything in the index compares locales through [`normalize_locale`],
//! while the raw spelling is kept on each entry for display.

use std::sync::LazyLock;

use regex::Regex;

/// Locale assigned to files whose path carries no recognizable locale.
pub const UNKNOWN_LOCALE: &str = "unknown";

/// ISO 639-1 language codes.
const LANGUAGE_CODES: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg", "bh",
    "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv", "cy", "da",
    "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi", "fj", "fo", "fr",
    "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz",
    "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja", "jv", "ka", "kg", "ki", "kj",
    "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln",
    "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "na", "nb",
    "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv", "ny", "oc", "oj", "om", "or", "os", "pa", "pi",
    "pl", "ps", "pt", "qu", "rm", "rn", "ro", "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk",
    "sl", "sm", "sn", "so", "sq", "sr", "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti",
    "tk", "tl", "tn", "to", "tr", "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo",
    "wa", "wo", "xh", "yi", "yo", "za", "zh", "zu",
];

/// Locale names that don't follow the `xx` / `xx-YY` shape.
const COMPOUND_LOCALES: &[&str] = &[
    "zh-Hans",
    "zh-Hant",
    "zh-Hans-CN",
    "zh-Hans-SG",
    "zh-Hant-TW",
    "zh-Hant-HK",
    "sr-Latn",
    "sr-Cyrl",
    "az-Latn",
    "az-Cyrl",
    "uz-Latn",
    "uz-Cyrl",
    "bs-Latn",
    "pa-Guru",
    "pa-Arab",
    "es-419",
];

static LOCALE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([a-z]{2})(?:[-_]([a-z]{2}|[0-9]{3}))?$").unwrap());

/// Returns true if `token` reads as a locale name.
///
/// Accepts `xx`, `xx-YY` and `xx_YY` where `xx` is an ISO 639-1 code, plus the
/// compound names in a fixed table. Matching is case-insensitive.
pub fn is_locale_name(token: &str) -> bool {
    let unified = token.replace('_', "-");
    if COMPOUND_LOCALES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(&unified))
    {
        return true;
    }

    LOCALE_PATTERN.captures(token).is_some_and(|caps| {
        let language = caps[1].to_ascii_lowercase();
        LANGUAGE_CODES.binary_search(&language.as_str()).is_ok()
    })
}

/// Normalize a locale spelling: lower-case language, title-case script,
/// upper-case region, `-` as the only separator.
///
/// ```
/// use keyscope::core::locale::normalize_locale;
///
/// assert_eq!(normalize_locale("zh_cn"), "zh-CN");
/// assert_eq!(normalize_locale("ZH-hant-tw"), "zh-Hant-TW");
/// assert_eq!(normalize_locale("es_419"), "es-419");
/// ```
pub fn normalize_locale(raw: &str) -> String {
    raw.trim()
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(index, part)| {
            if index == 0 {
                part.to_ascii_lowercase()
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                part.to_ascii_uppercase()
            } else if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let lower = part.to_ascii_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => lower,
                }
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns true if both spellings name the same locale.
pub fn locales_match(a: &str, b: &str) -> bool {
    normalize_locale(a) == normalize_locale(b)
}

/// Expand a requested locale into its fallback search order.
///
/// The requested locale comes first, followed by each shorter form with the last
/// subtag removed. Duplicates are dropped, order is kept.
pub fn build_locale_candidates(requested: &str) -> Vec<String> {
    let normalized = normalize_locale(requested);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<String> = Vec::new();
    let mut current = normalized.as_str();
    loop {
        if !candidates.iter().any(|c| c == current) {
            candidates.push(current.to_string());
        }
        match current.rsplit_once('-') {
            Some((shorter, _)) => current = shorter,
            None => break,
        }
    }
    candidates
}

/// Pick one spelling to display among variants of the same locale.
///
/// Spellings already in canonical form win, then the ones whose letter casing is
/// closest to canonical, then shorter ones, then the lexicographically smallest.
pub fn choose_display_locale<S: AsRef<str>>(variants: &[S]) -> Option<String> {
    variants
        .iter()
        .map(AsRef::as_ref)
        .min_by_key(|raw| {
            let canonical = normalize_locale(raw);
            let casing_distance = raw
                .chars()
                .zip(canonical.chars())
                .filter(|(a, b)| a != b && a.eq_ignore_ascii_case(b))
                .count();
            (canonical != *raw, casing_distance, raw.len(), raw.to_string())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use crate::core::locale::*;

    #[test]
    fn test_language_table_is_sorted() {
        let mut sorted = LANGUAGE_CODES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, LANGUAGE_CODES);
    }

    #[test]
    fn test_is_locale_name() {
        assert!(is_locale_name("en"));
        assert!(is_locale_name("EN"));
        assert!(is_locale_name("zh-CN"));
        assert!(is_locale_name("zh_cn"));
        assert!(is_locale_name("pt-BR"));
        assert!(is_locale_name("es-419"));
        assert!(is_locale_name("zh-hans"));
        assert!(is_locale_name("ZH_HANT_TW"));

        assert!(!is_locale_name("common"));
        assert!(!is_locale_name("ui"));
        assert!(!is_locale_name("db"));
        assert!(!is_locale_name("en-"));
        assert!(!is_locale_name("english"));
        assert!(!is_locale_name(""));
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("en"), "en");
        assert_eq!(normalize_locale("EN"), "en");
        assert_eq!(normalize_locale("en_us"), "en-US");
        assert_eq!(normalize_locale("en-US"), "en-US");
        assert_eq!(normalize_locale("zh_hans"), "zh-Hans");
        assert_eq!(normalize_locale(" pt_br "), "pt-BR");
        assert_eq!(normalize_locale(""), "");
    }

    #[test]
    fn test_build_locale_candidates() {
        assert_eq!(build_locale_candidates("zh-CN"), vec!["zh-CN", "zh"]);
        assert_eq!(build_locale_candidates("en"), vec!["en"]);
        assert_eq!(build_locale_candidates("zh_cn"), vec!["zh-CN", "zh"]);
        assert_eq!(
            build_locale_candidates("zh-Hant-TW"),
            vec!["zh-Hant-TW", "zh-Hant", "zh"]
        );
        assert!(build_locale_candidates("").is_empty());
    }

    #[test]
    fn test_choose_display_locale() {
        assert_eq!(
            choose_display_locale(&["zh_CN", "zh-CN", "ZH-cn"]),
            Some("zh-CN".to_string())
        );
        assert_eq!(
            choose_display_locale(&["en_us", "en_US", "EN_US"]),
            Some("en_US".to_string())
        );
        assert_eq!(choose_display_locale::<&str>(&[]), None);
    }

    #[test]
    fn test_locales_match() {
        assert!(locales_match("zh_CN", "zh-cn"));
        assert!(!locales_match("zh", "zh-CN"));
    }
}
