//! Key file discovery and loading.
//!
//! Scans a keys directory for `*.key` files and builds a `KeySet`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rfctl_lirc::Sample;
use tracing::{debug, error, info, warn};

use crate::error::{KeyError, KeyResult};
use crate::parser::{parse_key_content, KeyFile};
use crate::template::KeyTemplate;
use crate::KEY_FILE_EXTENSION;

/// Named key templates, read-only once built.
///
/// Keys are ordered by name so matching order is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySet {
    keys: BTreeMap<String, Vec<Sample>>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, replacing any key with the same name.
    pub fn insert(&mut self, name: impl Into<String>, samples: Vec<Sample>) {
        self.keys.insert(name.into(), samples);
    }

    pub fn get(&self, name: &str) -> Option<&[Sample]> {
        self.keys.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Sample])> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Length of the longest template, 0 when empty.
    pub fn max_len(&self) -> usize {
        self.keys.values().map(Vec::len).max().unwrap_or(0)
    }
}

impl FromIterator<KeyFile> for KeySet {
    fn from_iter<I: IntoIterator<Item = KeyFile>>(iter: I) -> Self {
        let mut set = KeySet::new();
        for file in iter {
            set.insert(file.name, file.samples);
        }
        set
    }
}

/// Result of loading key files from a directory.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Successfully parsed files, in path order.
    pub files: Vec<KeyFile>,
    /// Errors of skipped files.
    pub errors: Vec<KeyError>,
}

impl LoadResult {
    pub fn into_key_set(self) -> KeySet {
        self.files.into_iter().collect()
    }
}

/// Load every `*.key` file in `dir`.
///
/// A file that fails to read or parse is logged, recorded in
/// `LoadResult::errors`, and skipped. A missing directory yields an empty
/// result.
pub fn load_dir(dir: &Path) -> LoadResult {
    let mut result = LoadResult::default();

    if !dir.exists() {
        debug!(path = %dir.display(), "Keys directory does not exist");
        return result;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!(path = %dir.display(), error = %e, "Failed to read keys directory");
            result.errors.push(KeyError::Read {
                path: dir.to_path_buf(),
                source: e,
            });
            return result;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == KEY_FILE_EXTENSION))
        .collect();
    paths.sort();

    for path in paths {
        match load_file(&path) {
            Ok(file) => {
                debug!(key = %file.name, len = file.samples.len(), "Loaded key");
                result.files.push(file);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping key file");
                result.errors.push(e);
            }
        }
    }

    info!(
        path = %dir.display(),
        key_count = result.files.len(),
        error_count = result.errors.len(),
        "Keys loaded"
    );

    result
}

/// Load a single key file.
pub fn load_file(path: &Path) -> KeyResult<KeyFile> {
    let content = std::fs::read_to_string(path).map_err(|e| KeyError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_key_content(&content, path)
}

/// A fresh key file name: a random 32-hex-digit id plus the extension.
pub fn new_key_file_name() -> String {
    format!("{}.{KEY_FILE_EXTENSION}", uuid::Uuid::new_v4().simple())
}

/// Write `template` to a new file in `dir` and return its path.
pub fn save_template(dir: &Path, template: &KeyTemplate) -> KeyResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| KeyError::Write {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(new_key_file_name());
    std::fs::write(&path, template.render()).map_err(|e| KeyError::Write {
        path: path.clone(),
        source: e,
    })?;

    info!(path = %path.display(), len = template.len(), "Saved key");
    Ok(path)
}
