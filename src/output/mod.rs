//! Output Module
//!
//! 正規化済みの行を表として描画するレポートレンダラーの境界。
//! 任意のPDFエンジンを`ReportRenderer`トレイトの背後に差し替えられます。

pub(crate) mod metrics;
mod pdf;

pub use pdf::{PdfReport, PdfStyle};

use crate::error::ListError;
use crate::types::NormalizedRow;

/// セル内の水平方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// 列幅の指定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// 残りの幅をすべて使う
    Auto,
    /// 固定幅（mm）
    Fixed(f32),
}

/// 列の定義
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// ヘッダーラベル
    pub header: &'static str,
    /// 本文セルの配置（ヘッダーは常に中央揃え）
    pub align: Align,
    /// 列幅
    pub width: ColumnWidth,
}

/// 在庫リストの列構成
///
/// 説明（可変幅・左揃え）、SKU、P/C、空欄列（SKUと同じ幅）の順です。
pub const LIST_COLUMNS: [ColumnSpec; 4] = [
    ColumnSpec {
        header: "DESCRIPCIÓN",
        align: Align::Left,
        width: ColumnWidth::Auto,
    },
    ColumnSpec {
        header: "SKU",
        align: Align::Center,
        width: ColumnWidth::Fixed(35.0),
    },
    ColumnSpec {
        header: "P/C",
        align: Align::Center,
        width: ColumnWidth::Fixed(15.0),
    },
    ColumnSpec {
        header: "",
        align: Align::Center,
        width: ColumnWidth::Fixed(35.0),
    },
];

/// 固定幅列の合計（mm）
pub fn fixed_columns_width_mm(columns: &[ColumnSpec]) -> f32 {
    columns
        .iter()
        .map(|column| match column.width {
            ColumnWidth::Fixed(width) => width,
            ColumnWidth::Auto => 0.0,
        })
        .sum()
}

/// 1ファイル分の表
#[derive(Debug, Clone, PartialEq)]
pub struct ListTable {
    /// 列定義
    pub columns: Vec<ColumnSpec>,
    /// 本文（各行は列数と同じ長さ）
    pub body: Vec<Vec<String>>,
}

impl ListTable {
    /// ソート済みの行から在庫リストの表を構築する
    ///
    /// 価格フィールドは描画しません。4列目は常に空欄です。
    pub fn from_rows(rows: Vec<NormalizedRow>) -> Self {
        let body = rows
            .into_iter()
            .map(|row| {
                vec![
                    row.description,
                    row.barcode,
                    row.classification,
                    String::new(),
                ]
            })
            .collect();

        Self {
            columns: LIST_COLUMNS.to_vec(),
            body,
        }
    }

    /// 本文の行数
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// レンダリング結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// ドキュメントのバイト列
    pub bytes: Vec<u8>,
    /// 物理ページ数
    pub page_count: usize,
}

/// レポートレンダラー
///
/// 生成直後のドキュメントは空のページを1枚持ちます（最初の表はそこに描画される）。
/// オーケストレーターは2件目以降の成功ファイルの前に`add_page`を呼び出します。
pub trait ReportRenderer {
    /// 新しいページを追加する
    fn add_page(&mut self) -> Result<(), ListError>;

    /// 現在のページに表を描画する（溢れた場合は自動的に改ページ）
    fn draw_table(&mut self, table: &ListTable) -> Result<(), ListError>;

    /// ドキュメントを確定してバイト列を返す
    fn finish(self) -> Result<RenderedReport, ListError>
    where
        Self: Sized;
}
