//! calamineによるワークブックデコーダー

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use super::WorkbookDecoder;
use crate::error::ListError;
use crate::types::{CellValue, Sheet};

/// calamineを使用したデコーダー
///
/// ワークブック形式はバイト列から自動判別します。
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineDecoder;

impl CalamineDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl WorkbookDecoder for CalamineDecoder {
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<Sheet>, ListError> {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(corrupt)?;

        let Some(name) = workbook.sheet_names().first().cloned() else {
            return Ok(None);
        };

        let range = match workbook.worksheet_range_at(0) {
            Some(result) => result.map_err(corrupt)?,
            None => return Ok(None),
        };

        let rows = range_to_rows(&range);
        debug!(sheet = %name, rows = rows.len(), "first sheet decoded");

        Ok(Some(Sheet::new(name, rows)))
    }
}

fn corrupt(error: calamine::Error) -> ListError {
    ListError::CorruptFile {
        reason: error.to_string(),
    }
}

/// calamineの範囲を行データに変換
///
/// 範囲は最初の使用セルから始まるため、先頭行がヘッダー行になります。
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect()
}

/// セル値の変換
///
/// 日付はシリアル値（数値）のまま扱います。
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        #[allow(unreachable_patterns)]
        _ => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert_cell(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(
            convert_cell(&Data::String("agua".to_string())),
            CellValue::String("agua".to_string())
        );
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert!(matches!(
            convert_cell(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Error(_)
        ));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let result = CalamineDecoder.first_sheet(b"definitely not a workbook");
        assert!(matches!(result, Err(ListError::CorruptFile { .. })));
    }

    #[test]
    fn test_empty_buffer_is_corrupt() {
        let result = CalamineDecoder.first_sheet(&[]);
        assert!(matches!(result, Err(ListError::CorruptFile { .. })));
    }

    // 実際のXLSXを使ったデコードは統合テスト（tests/）で検証します。
}
