//! Normalize Module
//!
//! ヘッダーをキーとしたレコードを正規化済みの行に変換するモジュール。
//! 値の変換は全域関数であり、エラーは発生しません。

use crate::schema::{COLUMN_BARCODE, COLUMN_CLASSIFICATION, COLUMN_DESCRIPTION};
use crate::types::{CellValue, NormalizedRow, Record};

/// レコード列を正規化する
///
/// 説明が空になる行は黙って除外します（エラーにはなりません）。
/// 元の順序は保持されます。
pub fn normalize_records(records: &[Record]) -> Vec<NormalizedRow> {
    records.iter().filter_map(normalize_record).collect()
}

/// 1レコードを正規化する
///
/// # 戻り値
///
/// * `Some(NormalizedRow)` - 説明が空でない場合
/// * `None` - 説明がトリム・大文字化後に空の場合
pub fn normalize_record(record: &Record) -> Option<NormalizedRow> {
    let description = clean(record.get(COLUMN_DESCRIPTION)).to_uppercase();
    if description.is_empty() {
        return None;
    }

    Some(NormalizedRow {
        description,
        barcode: clean(record.get(COLUMN_BARCODE)),
        classification: clean(record.get(COLUMN_CLASSIFICATION)),
        price: String::new(),
    })
}

/// 文字列化してトリムする（BOMも除去）
fn clean(value: Option<&CellValue>) -> String {
    let raw = value.map(CellValue::as_raw_string).unwrap_or_default();
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_string()
}
