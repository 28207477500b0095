use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::locale::is_locale_name;

pub const CONFIG_FILE_NAME: &str = ".keyscoperc.json";

/// Accepted range for `debounceMillis`.
pub const DEBOUNCE_RANGE: std::ops::RangeInclusive<u64> = 50..=5000;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_i18n_dirs")]
    pub i18n_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_namespace_hooks")]
    pub namespace_hooks: Vec<String>,
    #[serde(default = "default_translation_functions")]
    pub translation_functions: Vec<String>,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default = "default_debounce_millis")]
    pub debounce_millis: u64,
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<String>>,
}

pub fn default_i18n_dirs() -> Vec<String> {
    [
        "locales",
        "locale",
        "i18n",
        "lang",
        "langs",
        "languages",
        "messages",
        "translations",
        "translation",
        "l10n",
    ]
    .map(String::from)
    .to_vec()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_namespace_hooks() -> Vec<String> {
    [
        "useTranslations",
        "getTranslations",
        "useTranslation",
        "useI18n",
    ]
    .map(String::from)
    .to_vec()
}

fn default_translation_functions() -> Vec<String> {
    ["t", "$t"].map(String::from).to_vec()
}

fn default_source_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
        .map(String::from)
        .to_vec()
}

fn default_debounce_millis() -> u64 {
    400
}

impl Default for Config {
    fn default() -> Self {
        Self {
            i18n_dirs: default_i18n_dirs(),
            exclude_dirs: Vec::new(),
            ignores: Vec::new(),
            default_locale: default_locale(),
            namespace_hooks: default_namespace_hooks(),
            translation_functions: default_translation_functions(),
            source_extensions: default_source_extensions(),
            debounce_millis: default_debounce_millis(),
            modules: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if !is_locale_name(&self.default_locale) {
            bail!(
                "Invalid locale in 'defaultLocale': \"{}\"",
                self.default_locale
            );
        }

        if self.namespace_hooks.is_empty() {
            bail!("'namespaceHooks' must name at least one hook");
        }

        if self.i18n_dirs.is_empty() {
            bail!("'i18nDirs' must name at least one directory");
        }

        if !DEBOUNCE_RANGE.contains(&self.debounce_millis) {
            bail!(
                "'debounceMillis' must be between {} and {}, got {}",
                DEBOUNCE_RANGE.start(),
                DEBOUNCE_RANGE.end(),
                self.debounce_millis
            );
        }

        Ok(())
    }

    /// Compiled `ignores` patterns. Invalid patterns are dropped; `validate` reports them.
    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        self.ignores
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect()
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
