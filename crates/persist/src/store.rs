//! File-backed key/value storage for the high score.
//!
//! Layout of the store file:
//! ```text
//! {
//!   "schema_version": 1,
//!   "entries": { "pina-game-high-score": "120" }
//! }
//! ```
//! Values are kept as strings and parsed leniently on read, so a hand-edited
//! or foreign value degrades to a clamped number or an error, never a panic.

use joyrun_kernel::{HIGH_SCORE_KEY, HighScoreStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current schema version of the store file.
const STORE_SCHEMA_VERSION: u32 = 1;

/// Default file name inside a data directory.
pub const STORE_FILE_NAME: &str = "scores.json";

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("value under `{key}` is not a number: {value:?}")]
    MalformedValue { key: String, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// A small JSON key/value file. Every write rewrites the whole file through a
/// temporary sibling and a rename.
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    path: PathBuf,
}

impl KeyValueFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.read()?.entries.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: String) -> Result<(), PersistError> {
        let (mut file, _) = self.read_for_update()?;
        file.entries.insert(key.to_string(), value);
        self.write(&file)
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>, PersistError> {
        let (mut file, replaced) = self.read_for_update()?;
        let removed = file.entries.remove(key);
        if removed.is_some() || replaced {
            self.write(&file)?;
        }
        Ok(removed)
    }

    /// Like `read`, but an unreadable or foreign-schema file is replaced
    /// rather than blocking every later write. The flag reports a reset.
    fn read_for_update(&self) -> Result<(StoreFile, bool), PersistError> {
        match self.read() {
            Ok(file) => Ok((file, false)),
            Err(err @ (PersistError::Json(_) | PersistError::SchemaMismatch { .. })) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "store file unusable, starting fresh"
                );
                Ok((StoreFile::default(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn read(&self) -> Result<StoreFile, PersistError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let file: StoreFile = serde_json::from_reader(std::fs::File::open(&self.path)?)?;
        if file.schema_version != STORE_SCHEMA_VERSION {
            return Err(PersistError::SchemaMismatch {
                file_version: file.schema_version,
                expected_version: STORE_SCHEMA_VERSION,
            });
        }
        Ok(file)
    }

    fn write(&self, file: &StoreFile) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        serde_json::to_writer_pretty(std::fs::File::create(&tmp)?, file)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// High score persisted in a [`KeyValueFile`] under [`HIGH_SCORE_KEY`].
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    file: KeyValueFile,
}

impl FileHighScoreStore {
    /// Store backed by `scores.json` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(STORE_FILE_NAME))
    }

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: KeyValueFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the stored value without going through the session.
    pub fn read(&self) -> Result<Option<u32>, PersistError> {
        match self.file.get(HIGH_SCORE_KEY)? {
            Some(raw) => parse_score(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn write(&self, value: u32) -> Result<(), PersistError> {
        self.file.set(HIGH_SCORE_KEY, value.to_string())?;
        tracing::debug!(value, path = %self.file.path().display(), "high score written");
        Ok(())
    }

    /// Forget the stored high score.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.file.remove(HIGH_SCORE_KEY)?;
        Ok(())
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> StoreResult<Option<u32>> {
        Ok(self.read()?)
    }

    fn save(&mut self, value: u32) -> StoreResult<()> {
        Ok(self.write(value)?)
    }
}

/// Parse a stored score: leading integer, negatives clamp to zero.
fn parse_score(raw: &str) -> Result<u32, PersistError> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    let malformed = || PersistError::MalformedValue {
        key: HIGH_SCORE_KEY.to_string(),
        value: raw.to_string(),
    };
    let value: i64 = trimmed[..end].parse().map_err(|_| malformed())?;
    Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use joyrun_kernel::{GameSession, SimConfig};

    #[test]
    fn missing_file_loads_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHighScoreStore::in_dir(tmp.path());
        assert_eq!(store.read().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn write_then_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileHighScoreStore::in_dir(tmp.path().join("nested"));
        store.save(340).unwrap();

        let reopened = FileHighScoreStore::in_dir(tmp.path().join("nested"));
        assert_eq!(reopened.load().unwrap(), Some(340));
    }

    #[test]
    fn other_keys_survive_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        let kv = KeyValueFile::new(&path);
        kv.set("volume", "0.5".into()).unwrap();

        FileHighScoreStore::new(&path).write(10).unwrap();
        assert_eq!(kv.get("volume").unwrap().as_deref(), Some("0.5"));
        assert_eq!(kv.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("10"));
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(parse_score("120").unwrap(), 120);
        assert_eq!(parse_score(" 42abc").unwrap(), 42);
        assert_eq!(parse_score("-5").unwrap(), 0);
        assert_eq!(parse_score("99999999999").unwrap(), u32::MAX);
        assert!(matches!(
            parse_score("abc"),
            Err(PersistError::MalformedValue { .. })
        ));
    }

    #[test]
    fn clear_removes_value() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHighScoreStore::in_dir(tmp.path());
        store.write(5).unwrap();
        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        std::fs::write(&path, r#"{"schema_version": 999, "entries": {}}"#).unwrap();

        match FileHighScoreStore::new(&path).read() {
            Err(PersistError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, STORE_SCHEMA_VERSION);
            }
            other => panic!("expected SchemaMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_is_replaced_on_save() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileHighScoreStore::in_dir(tmp.path());
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_err());

        store.save(120).unwrap();
        assert_eq!(store.load().unwrap(), Some(120));
    }

    #[test]
    fn foreign_schema_is_replaced_on_save() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileHighScoreStore::in_dir(tmp.path());
        std::fs::write(
            store.path(),
            r#"{"schema_version": 99, "entries": {"high_score": "7"}}"#,
        )
        .unwrap();

        store.save(55).unwrap();
        assert_eq!(store.load().unwrap(), Some(55));
    }

    #[test]
    fn clear_resets_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHighScoreStore::in_dir(tmp.path());
        std::fs::write(store.path(), "garbage").unwrap();

        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn corrupt_file_degrades_to_zero_in_session() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(STORE_FILE_NAME);
        std::fs::write(&path, "not json at all").unwrap();

        let session = GameSession::new(
            SimConfig::default(),
            1,
            Box::new(FileHighScoreStore::new(&path)),
        );
        assert_eq!(session.high_score(), 0);
    }

    #[test]
    fn session_reads_persisted_value() {
        let tmp = tempfile::tempdir().unwrap();
        FileHighScoreStore::in_dir(tmp.path()).write(250).unwrap();
        let session = GameSession::new(
            SimConfig::default(),
            1,
            Box::new(FileHighScoreStore::in_dir(tmp.path())),
        );
        assert_eq!(session.high_score(), 250);
    }
}
