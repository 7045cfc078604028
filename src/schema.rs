//! Schema Module
//!
//! 先頭シートのヘッダー行を必須列と照合する検証ゲート。副作用はありません。

use crate::error::ListError;
use crate::types::{CellValue, Sheet};

/// 説明列
pub const COLUMN_DESCRIPTION: &str = "Descripcion";
/// バーコード列
pub const COLUMN_BARCODE: &str = "Código de Barras Para Venta";
/// 分類列
pub const COLUMN_CLASSIFICATION: &str = "C/P";
/// 価格列（存在は必須だが値は使用しない）
pub const COLUMN_PRICE: &str = "Precio Regular Derma";

/// 必須列（この順序で欠落列を報告する）
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COLUMN_DESCRIPTION,
    COLUMN_BARCODE,
    COLUMN_CLASSIFICATION,
    COLUMN_PRICE,
];

/// デコード結果を検証し、成功時はシートをそのまま返す
///
/// # 引数
///
/// * `sheet` - デコーダーが返した先頭シート（`None`はシートが0枚）
///
/// # 戻り値
///
/// * `Ok(Sheet)` - 検証に成功したシート（未変更）
/// * `Err(ListError::EmptyWorkbook)` - シートが存在しない
/// * `Err(ListError::EmptySheet)` - 先頭シートに行がない
/// * `Err(ListError::MissingColumns)` - 必須列が欠落している
pub fn validate(sheet: Option<Sheet>) -> Result<Sheet, ListError> {
    let sheet = sheet.ok_or(ListError::EmptyWorkbook)?;

    let header = sheet.header().ok_or(ListError::EmptySheet)?;

    let missing = missing_columns(header);
    if !missing.is_empty() {
        return Err(ListError::MissingColumns(missing));
    }

    Ok(sheet)
}

/// ヘッダー行に存在しない必須列を列挙する
///
/// 照合は文字列セルとの完全一致（大文字小文字を区別）のみです。
pub fn missing_columns(header: &[CellValue]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| {
            !header
                .iter()
                .any(|cell| matches!(cell, CellValue::String(label) if label == *required))
        })
        .map(|name| name.to_string())
        .collect()
}
