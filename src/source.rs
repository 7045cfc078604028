//! Source Module
//!
//! 入力ファイルハンドルを抽象化し、メモリ上のバイト列として読み込むモジュール。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 名前付きの入力ファイル
///
/// バッチ処理の1要素です。読み込みは1回のみ試行され、リトライはしません。
pub trait FileSource {
    /// 失敗レポートに表示するファイル名
    fn name(&self) -> &str;

    /// ファイル全体をバイト列として読み込む
    fn read_bytes(&self) -> io::Result<Vec<u8>>;
}

impl<T: FileSource + ?Sized> FileSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        (**self).read_bytes()
    }
}

impl<T: FileSource + ?Sized> FileSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        (**self).read_bytes()
    }
}

/// ファイルシステム上のファイル
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
    name: String,
}

impl FileInput {
    /// パスから入力ファイルを生成
    ///
    /// 表示名にはパスの最終要素（ファイル名）を使用します。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// 入力ファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for FileInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// メモリ上のファイル（アップロード済みのバッファなど）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    name: String,
    data: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}
