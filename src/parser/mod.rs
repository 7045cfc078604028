//! Parser Module
//!
//! バイト列をシート構造にデコードする境界。
//! デフォルト実装はcalamineを使用し、xlsx/xlsm/xlsb/xls/odsを自動判別します。

mod workbook;

pub use workbook::CalamineDecoder;

use crate::error::ListError;
use crate::types::Sheet;

/// ワークブックデコーダー
///
/// 任意のスプレッドシートエンジンをこのトレイトの背後に差し替えられます。
pub trait WorkbookDecoder {
    /// 先頭シートをデコードする
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(Sheet))` - 先頭シート（行が0件の場合もある）
    /// * `Ok(None)` - ワークブックにシートが存在しない場合
    /// * `Err(ListError::CorruptFile)` - デコードに失敗した場合
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<Sheet>, ListError>;
}
