//! Security Module
//!
//! 入力ファイルに対するセキュリティ制限を実装するモジュール。
//! デコーダーに渡す前に、入力サイズの上限とZIPコンテナの構造
//! （ZIP bomb、パストラバーサル）を検査します。

use std::io::Cursor;

use tracing::debug;
use zip::ZipArchive;

use crate::error::ListError;

/// ZIPローカルファイルヘッダーのマジックナンバー
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_input_file_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 展開後の単一エントリの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// 展開後の合計最大サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 104_857_600, // 100MB
            max_file_count: 10_000,
            max_file_size: 104_857_600,           // 100MB
            max_decompressed_size: 1_073_741_824, // 1GB
        }
    }
}

impl SecurityConfig {
    /// 読み込んだバッファを検査する
    ///
    /// # 引数
    ///
    /// * `buffer` - 入力ファイル全体のバイト列
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 制限内の場合（ZIP以外の形式はサイズのみ検査）
    /// * `Err(ListError::SecurityViolation)` - 制限に違反した場合
    /// * `Err(ListError::CorruptFile)` - ZIPシグネチャを持つがアーカイブとして読めない場合
    pub fn check_buffer(&self, buffer: &[u8]) -> Result<(), ListError> {
        let size = buffer.len() as u64;
        if size > self.max_input_file_size {
            return Err(ListError::SecurityViolation(format!(
                "tamaño de entrada {} bytes (máximo: {} bytes)",
                size, self.max_input_file_size
            )));
        }

        if buffer.starts_with(&ZIP_MAGIC) {
            self.check_archive(buffer)?;
        }

        Ok(())
    }

    /// ZIPアーカイブのエントリ数・展開サイズ・パスを検査する
    fn check_archive(&self, buffer: &[u8]) -> Result<(), ListError> {
        let mut archive =
            ZipArchive::new(Cursor::new(buffer)).map_err(|e| ListError::CorruptFile {
                reason: e.to_string(),
            })?;

        if archive.len() > self.max_file_count {
            return Err(ListError::SecurityViolation(format!(
                "{} entradas en el archivo comprimido (máximo: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total: u64 = 0;
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| ListError::CorruptFile {
                    reason: e.to_string(),
                })?;

            validate_zip_path(entry.name()).map_err(ListError::SecurityViolation)?;

            if entry.size() > self.max_file_size {
                return Err(ListError::SecurityViolation(format!(
                    "la entrada '{}' ocupa {} bytes (máximo: {} bytes)",
                    entry.name(),
                    entry.size(),
                    self.max_file_size
                )));
            }

            total = total.saturating_add(entry.size());
            if total > self.max_decompressed_size {
                return Err(ListError::SecurityViolation(format!(
                    "tamaño descomprimido supera {} bytes",
                    self.max_decompressed_size
                )));
            }
        }

        debug!(entries = archive.len(), decompressed = total, "archive checked");
        Ok(())
    }
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ZIPエントリのパスを検証します。
///
/// # 引数
///
/// * `path` - 検証するファイルパス
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("ruta vacía en el archivo comprimido".to_string());
    }

    // 絶対パスを拒否（Unix形式の`/`やWindows形式のドライブレター）
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("ruta absoluta no permitida: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("recorrido de directorios detectado: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("barra invertida no permitida: {}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, FileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("xl/workbook.xml").is_ok());
        assert!(validate_zip_path("xl/worksheets/sheet1.xml").is_ok());
        assert!(validate_zip_path("[Content_Types].xml").is_ok());
    }

    #[test]
    fn test_validate_zip_path_rejects_dangerous_paths() {
        assert!(validate_zip_path("").is_err());
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("C:\\Windows\\system32").is_err());
        assert!(validate_zip_path("c:/xl/workbook.xml").is_err());
        assert!(validate_zip_path("../etc/passwd").is_err());
        assert!(validate_zip_path("xl/../../etc/passwd").is_err());
        assert!(validate_zip_path("xl\\workbook.xml").is_err());
    }

    #[test]
    fn test_check_buffer_non_zip_passes() {
        let config = SecurityConfig::default();
        assert!(config.check_buffer(b"not a spreadsheet").is_ok());
        assert!(config.check_buffer(&[]).is_ok());
    }

    #[test]
    fn test_check_buffer_input_size_limit() {
        let config = SecurityConfig {
            max_input_file_size: 4,
            ..SecurityConfig::default()
        };
        let result = config.check_buffer(b"12345");
        assert!(matches!(result, Err(ListError::SecurityViolation(_))));
    }

    #[test]
    fn test_check_buffer_valid_zip() {
        let data = build_zip(&[("xl/workbook.xml", b"<workbook/>")]);
        assert!(SecurityConfig::default().check_buffer(&data).is_ok());
    }

    #[test]
    fn test_check_buffer_truncated_zip_is_corrupt() {
        let mut data = ZIP_MAGIC.to_vec();
        data.extend_from_slice(b"garbage");
        let result = SecurityConfig::default().check_buffer(&data);
        assert!(matches!(result, Err(ListError::CorruptFile { .. })));
    }

    #[test]
    fn test_check_buffer_too_many_entries() {
        let data = build_zip(&[("a.xml", b"a"), ("b.xml", b"b"), ("c.xml", b"c")]);
        let config = SecurityConfig {
            max_file_count: 2,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            config.check_buffer(&data),
            Err(ListError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_check_buffer_oversized_entry() {
        let payload = vec![b'x'; 64];
        let data = build_zip(&[("xl/big.xml", &payload)]);
        let config = SecurityConfig {
            max_file_size: 32,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            config.check_buffer(&data),
            Err(ListError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_check_buffer_total_decompressed_limit() {
        let payload = vec![b'x'; 40];
        let data = build_zip(&[("a.xml", &payload), ("b.xml", &payload)]);
        let config = SecurityConfig {
            max_decompressed_size: 64,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            config.check_buffer(&data),
            Err(ListError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_check_buffer_traversal_entry() {
        let data = build_zip(&[("../evil.xml", b"x")]);
        assert!(matches!(
            SecurityConfig::default().check_buffer(&data),
            Err(ListError::SecurityViolation(_))
        ));
    }
}
