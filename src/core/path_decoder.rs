//! Derives the namespace context of a translation file from its location.
//!
//! Two layouts are recognized below an i18n directory:
//!
//! - directory-style: `locales/en/billing/invoice.json` (locale `en`, business unit
//!   `billing`, key prefix `billing.invoice.`)
//! - suffix-style: `locales/common.zh_CN.yaml` (locale `zh_CN`, empty key prefix)

use std::path::{Component, Path};

use crate::core::locale::{UNKNOWN_LOCALE, is_locale_name};

/// Directory names that hold code rather than name a module.
const GENERIC_SEGMENTS: &[&str] = &[
    "src",
    "main",
    "resources",
    "public",
    "assets",
    "app",
    "lib",
    "static",
];

/// File stems that never contribute to the key prefix.
const TRANSPARENT_STEMS: &[&str] = &["index", "messages", "translation", "translations"];

/// Context decoded from a translation file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    /// Locale as spelled in the path, or `unknown`.
    pub locale: String,
    pub module: Option<String>,
    pub business_unit: Option<String>,
    /// Prepended verbatim to every key parsed from the file. Empty or ends with `.`.
    pub key_prefix: String,
}

impl PathContext {
    fn unknown(module: Option<String>) -> Self {
        Self {
            locale: UNKNOWN_LOCALE.to_string(),
            module,
            business_unit: None,
            key_prefix: String::new(),
        }
    }

    pub fn has_locale(&self) -> bool {
        self.locale != UNKNOWN_LOCALE
    }
}

#[derive(Debug, Clone)]
pub struct PathDecoder {
    i18n_dirs: Vec<String>,
}

impl PathDecoder {
    pub fn new(i18n_dirs: &[String]) -> Self {
        Self {
            i18n_dirs: i18n_dirs.iter().map(|d| d.to_ascii_lowercase()).collect(),
        }
    }

    /// Returns true if `name` is one of the canonical i18n directory names.
    pub fn is_i18n_dir(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.i18n_dirs.iter().any(|d| *d == lower)
    }

    /// Decode `file_path` relative to `base`.
    pub fn decode(&self, file_path: &Path, base: &Path) -> PathContext {
        let relative = file_path.strip_prefix(base).unwrap_or(file_path);
        let segments: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();

        let Some((file_name, dirs)) = segments.split_last() else {
            return PathContext::unknown(None);
        };
        let stem = file_stem(file_name);

        let anchor = dirs.iter().rposition(|d| self.is_i18n_dir(d));
        let (above, below) = match anchor {
            Some(index) => (&dirs[..index], &dirs[index + 1..]),
            None => (&dirs[..0], dirs),
        };

        let module = above
            .iter()
            .rev()
            .find(|segment| {
                !GENERIC_SEGMENTS
                    .iter()
                    .any(|g| g.eq_ignore_ascii_case(segment))
            })
            .map(|segment| segment.to_string());

        if let Some(locale_index) = below.iter().position(|d| is_locale_name(d)) {
            let rest = &below[locale_index + 1..];
            let stem = split_locale_suffix(stem).map_or(stem, |(name, _)| name);

            let mut key_prefix = String::new();
            for dir in rest {
                key_prefix.push_str(dir);
                key_prefix.push('.');
            }
            if !is_transparent_stem(stem) {
                key_prefix.push_str(stem);
                key_prefix.push('.');
            }

            return PathContext {
                locale: below[locale_index].to_string(),
                module,
                business_unit: rest.first().map(|d| d.to_string()),
                key_prefix,
            };
        }

        if is_locale_name(stem) {
            return PathContext {
                locale: stem.to_string(),
                module,
                business_unit: None,
                key_prefix: String::new(),
            };
        }

        match split_locale_suffix(stem) {
            Some((_, locale)) => PathContext {
                locale: locale.to_string(),
                module,
                business_unit: None,
                key_prefix: String::new(),
            },
            None => PathContext::unknown(module),
        }
    }
}

fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

fn is_transparent_stem(stem: &str) -> bool {
    is_locale_name(stem)
        || TRANSPARENT_STEMS
            .iter()
            .any(|t| t.eq_ignore_ascii_case(stem))
}

/// Split `name.LOCALE`, `name_LOCALE` or `name-LOCALE` at the leftmost separator
/// whose tail is a locale.
fn split_locale_suffix(stem: &str) -> Option<(&str, &str)> {
    stem.char_indices()
        .filter(|(index, c)| *index > 0 && matches!(c, '.' | '_' | '-'))
        .map(|(index, _)| (&stem[..index], &stem[index + 1..]))
        .find(|(_, tail)| is_locale_name(tail))
}
