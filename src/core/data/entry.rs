use std::{
    fmt,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
    sync::Arc,
};

/// Stable identity of a file: its path as discovered by the scanner.
///
/// Cheap to clone and usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileRef(Arc<Path>);

impl FileRef {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn extension(&self) -> Option<&str> {
        self.0.extension().and_then(|e| e.to_str())
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&Path> for FileRef {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for FileRef {
    fn from(path: PathBuf) -> Self {
        Self(Arc::from(path))
    }
}

impl AsRef<Path> for FileRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// One defined key in one file for one locale.
///
/// Two entries are the same entry when they come from the same position of the same
/// file; the key, value and locale follow from that.
#[derive(Debug, Clone)]
pub struct TranslationEntry {
    /// Fully qualified key, including the file's key prefix.
    pub key: String,
    pub value: String,
    /// Locale as spelled in the file path.
    pub locale: String,
    pub file: FileRef,
    /// Byte offset of the key's defining token.
    pub offset: usize,
    /// Byte length of the key's defining token.
    pub length: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    pub module: Option<String>,
}

impl PartialEq for TranslationEntry {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file && self.offset == other.offset
    }
}

impl Eq for TranslationEntry {}

impl Hash for TranslationEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file.hash(state);
        self.offset.hash(state);
    }
}
