use std::{fmt, fs, path::Path};

use serde_json::Value;

/// The i18n library a project appears to use. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Framework {
    #[default]
    Unknown,
    NextIntl,
    I18next,
    VueI18n,
    ReactIntl,
    NgxTranslate,
}

/// Package names checked in order; the first dependency found wins.
const PACKAGE_HINTS: &[(&str, Framework)] = &[
    ("next-intl", Framework::NextIntl),
    ("vue-i18n", Framework::VueI18n),
    ("@nuxtjs/i18n", Framework::VueI18n),
    ("react-intl", Framework::ReactIntl),
    ("@ngx-translate/core", Framework::NgxTranslate),
    ("react-i18next", Framework::I18next),
    ("next-i18next", Framework::I18next),
    ("i18next", Framework::I18next),
];

impl Framework {
    /// Detect the framework from the dependencies declared in `root/package.json`.
    pub fn detect(root: &Path) -> Self {
        let Ok(content) = fs::read_to_string(root.join("package.json")) else {
            return Framework::Unknown;
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(manifest) => Self::from_manifest(&manifest),
            Err(e) => {
                tracing::debug!("ignoring unreadable package.json: {}", e);
                Framework::Unknown
            }
        }
    }

    fn from_manifest(manifest: &Value) -> Self {
        let declared = |name: &str| {
            ["dependencies", "devDependencies", "peerDependencies"]
                .iter()
                .any(|section| manifest.get(section).and_then(|d| d.get(name)).is_some())
        };

        PACKAGE_HINTS
            .iter()
            .find(|(package, _)| declared(package))
            .map_or(Framework::Unknown, |(_, framework)| *framework)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framework::Unknown => write!(f, "unknown"),
            Framework::NextIntl => write!(f, "next-intl"),
            Framework::I18next => write!(f, "i18next"),
            Framework::VueI18n => write!(f, "vue-i18n"),
            Framework::ReactIntl => write!(f, "react-intl"),
            Framework::NgxTranslate => write!(f, "ngx-translate"),
        }
    }
}
