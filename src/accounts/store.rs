//! Key-Value Stores
//!
//! アカウント情報を保存する文字列キー・文字列値のストア。

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// ストアのエラー型
#[derive(Error, Debug)]
pub enum StoreError {
    /// ファイルの読み書きに失敗
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),

    /// ストアファイルがJSONオブジェクトとして読めない
    #[error("Store file is not a valid JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// 文字列キー・文字列値のストア
pub trait KeyValueStore {
    /// 値を取得する
    fn get(&self, key: &str) -> Option<String>;

    /// 値を保存する（既存の値は上書き）
    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// 値を削除する（存在しない場合は何もしない）
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

/// メモリ上のストア
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 1つのJSONオブジェクトとしてディスクに保存するストア
///
/// 内容は開いた時点でメモリに読み込み、変更のたびにファイル全体を書き直します。
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// ストアファイルを開く（存在しない場合は空のストア）
    ///
    /// # 戻り値
    ///
    /// * `Ok(JsonFileStore)` - 読み込みに成功した場合
    /// * `Err(StoreError::Json)` - ファイルが文字列値のJSONオブジェクトでない場合
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = entries.len(), "store opened");
        Ok(Self { path, entries })
    }

    /// ストアファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("users"), None);

        store.put("users", "[]".to_string()).unwrap();
        assert_eq!(store.get("users"), Some("[]".to_string()));

        store.delete("users").unwrap();
        assert_eq!(store.get("users"), None);
        store.delete("users").unwrap();
    }

    #[test]
    fn test_json_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("accounts.json")).unwrap();
        assert_eq!(store.get("session"), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_json_file_store_persists_mutations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.put("users", "[1]".to_string()).unwrap();
            store.put("session", "{}".to_string()).unwrap();
            store.delete("session").unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("users"), Some("[1]".to_string()));
        assert_eq!(reopened.get("session"), None);
    }

    #[test]
    fn test_json_file_store_rejects_invalid_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
    }
}
