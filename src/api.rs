//! Public API Types
//!
//! 公開APIで使用する列挙型と結果型を定義するモジュール。

use serde::Serialize;

/// 用紙サイズ
///
/// 既定はUSレター（215.9 × 279.4 mm）です。
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum PageSize {
    /// USレター（215.9 × 279.4 mm）
    Letter,

    /// A4（210 × 297 mm）
    A4,

    /// 任意サイズ（mm単位）
    Custom {
        /// 幅（mm）
        width_mm: f32,
        /// 高さ（mm）
        height_mm: f32,
    },
}

impl PageSize {
    /// (幅, 高さ) をmm単位で取得
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::Letter => (215.9, 279.4),
            PageSize::A4 => (210.0, 297.0),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Letter
    }
}

/// 処理に失敗したファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    /// 入力ファイル名
    pub file_name: String,

    /// 利用者に表示するエラーメッセージ
    pub message: String,
}

/// 確定済みの出力ドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDocument {
    /// 出力ファイル名（既定: `Listas.pdf`）
    pub file_name: String,

    /// PDFのバイト列
    pub bytes: Vec<u8>,

    /// 物理ページ数（1ファイルの表が複数ページにまたがる場合を含む）
    pub page_count: usize,
}

/// バッチ処理の結果
///
/// すべてのファイルが失敗した場合も正常に返り、`success_count == 0`となります。
/// その扱い（全体失敗として表示するかどうか）は呼び出し側の方針です。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    /// 成功したファイル数
    pub success_count: usize,

    /// 失敗したファイル（入力順）
    pub failures: Vec<FileFailure>,

    /// 出力ドキュメント（`success_count > 0`の場合のみ）
    #[serde(skip)]
    pub document: Option<ListDocument>,
}

impl ProcessResult {
    /// すべてのファイルが失敗したかどうか
    pub fn is_total_failure(&self) -> bool {
        self.success_count == 0
    }
}
