//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::collections::HashMap;

use serde::Serialize;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）。日付セルはシリアル値のまま保持する
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値を文字列として取得（トリム前）
    ///
    /// 偽と評価される値（空文字列、`0`、`NaN`、`false`、エラー値、空セル）は
    /// すべて空文字列になります。それ以外の数値は末尾の`.0`を付けない
    /// 最短の10進表記で出力します。
    ///
    /// ```rust
    /// use listas_pdf::CellValue;
    ///
    /// assert_eq!(CellValue::Number(7501234567890.0).as_raw_string(), "7501234567890");
    /// assert_eq!(CellValue::Number(12.5).as_raw_string(), "12.5");
    /// assert_eq!(CellValue::Number(0.0).as_raw_string(), "");
    /// assert_eq!(CellValue::Bool(true).as_raw_string(), "true");
    /// ```
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(true) => "true".to_string(),
            CellValue::Bool(false) | CellValue::Error(_) | CellValue::Empty => String::new(),
        }
    }

    /// ヘッダーラベルとしての文字列表現
    ///
    /// `as_raw_string`と異なり、`0`や`false`もラベルとして残します。
    pub(crate) fn as_label(&self) -> String {
        match self {
            CellValue::Number(n) if *n == 0.0 => "0".to_string(),
            CellValue::Bool(false) => "false".to_string(),
            CellValue::Error(e) => e.clone(),
            other => other.as_raw_string(),
        }
    }
}

/// 数値を文字列に変換する
///
/// 最短の往復可能な10進数字列を求め、小数点の位置に応じて固定小数点表記
/// （`123456789012345680000`、`0.000001`）または指数表記（`1e+21`、`1e-7`）で
/// 出力します。
fn format_number(n: f64) -> String {
    if n == 0.0 || n.is_nan() {
        return String::new();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}`は最短の仮数部を返す（例: "1.2345678901234568e20"）
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    // 小数点は先頭から`point`桁目の後ろ
    let k = digits.len() as i32;
    let point = exponent + 1;
    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let sign = if point - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (point - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (point - 1).abs())
        }
    };

    if n < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// ヘッダーラベルをキーとしたレコード（1行分）
///
/// 空セルはキー自体が存在しません。
pub type Record = HashMap<String, CellValue>;

/// デコード済みのシート（生のヘッダー配列形式）
///
/// 先頭行をヘッダー行として扱います。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// シート名
    pub name: String,

    /// 行データ（先頭行がヘッダー）
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// 新しいシートを生成
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// ヘッダー行（先頭行）を取得
    pub fn header(&self) -> Option<&[CellValue]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// レコードキーとして使用するヘッダーラベルを生成
    ///
    /// - 空のヘッダーセルは`__EMPTY`
    /// - 重複するラベルには`_1`, `_2`, ... を付与
    pub fn header_keys(&self) -> Vec<String> {
        let Some(header) = self.header() else {
            return Vec::new();
        };

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut keys = Vec::with_capacity(header.len());

        for cell in header {
            let mut base = cell.as_label();
            if base.is_empty() {
                base = "__EMPTY".to_string();
            }

            let mut key = base.clone();
            let mut counter = seen.get(&base).copied().unwrap_or(0);
            while keys.contains(&key) {
                counter += 1;
                key = format!("{}_{}", base, counter);
            }
            seen.insert(base, counter);
            keys.push(key);
        }

        keys
    }

    /// ヘッダー行以降をレコード形式に変換
    ///
    /// すべてのセルが空の行はスキップします。
    pub fn records(&self) -> Vec<Record> {
        let keys = self.header_keys();

        self.rows
            .iter()
            .skip(1)
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|row| {
                row.iter()
                    .zip(keys.iter())
                    .filter(|(cell, _)| !cell.is_empty())
                    .map(|(cell, key)| (key.clone(), cell.clone()))
                    .collect()
            })
            .collect()
    }
}

/// 正規化済みの行
///
/// 在庫リストの1行を表す正規形です。`description`は常に空ではありません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRow {
    /// 商品説明（トリム・大文字化済み、空でない）
    pub description: String,

    /// バーコード（トリム済み、空の場合あり）
    pub barcode: String,

    /// 分類コード「C/P」（トリム済み、空の場合あり）
    pub classification: String,

    /// 価格（予約フィールド。常に空で、描画もされない）
    pub price: String,
}

impl NormalizedRow {
    /// 新しい行を生成（`price`は常に空）
    pub fn new(
        description: impl Into<String>,
        barcode: impl Into<String>,
        classification: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            barcode: barcode.into(),
            classification: classification.into(),
            price: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> CellValue {
        CellValue::String(value.to_string())
    }

    #[test]
    fn test_as_raw_string_numbers() {
        assert_eq!(CellValue::Number(1.0).as_raw_string(), "1");
        assert_eq!(CellValue::Number(-3.0).as_raw_string(), "-3");
        assert_eq!(CellValue::Number(0.25).as_raw_string(), "0.25");
        assert_eq!(CellValue::Number(f64::NAN).as_raw_string(), "");
        assert_eq!(CellValue::Number(0.0).as_raw_string(), "");
    }

    #[test]
    fn test_as_raw_string_large_and_tiny_numbers() {
        let cases = [
            (1.2345678901234568e20, "123456789012345680000"),
            (9007199254740993.0, "9007199254740992"),
            (1e21, "1e+21"),
            (-1.5e22, "-1.5e+22"),
            (1e-7, "1e-7"),
            (2.5e-7, "2.5e-7"),
            (0.000001, "0.000001"),
            (123.456, "123.456"),
            (-0.5, "-0.5"),
            (f64::INFINITY, "Infinity"),
        ];
        for (value, expected) in cases {
            assert_eq!(CellValue::Number(value).as_raw_string(), expected, "{:e}", value);
        }
    }

    #[test]
    fn test_as_raw_string_falsy_values() {
        assert_eq!(CellValue::Bool(false).as_raw_string(), "");
        assert_eq!(CellValue::Error("#N/A".to_string()).as_raw_string(), "");
        assert_eq!(CellValue::Empty.as_raw_string(), "");
        assert_eq!(s("").as_raw_string(), "");
    }

    #[test]
    fn test_header_keys_dedup_and_empty() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![vec![
                s("Descripcion"),
                CellValue::Empty,
                s("Descripcion"),
                CellValue::Empty,
                CellValue::Number(0.0),
            ]],
        );

        assert_eq!(
            sheet.header_keys(),
            vec!["Descripcion", "__EMPTY", "Descripcion_1", "__EMPTY_1", "0"]
        );
    }

    #[test]
    fn test_records_skip_blank_rows_and_empty_cells() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![
                vec![s("A"), s("B")],
                vec![s("a1"), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Empty],
                vec![CellValue::Number(2.0), s("b3")],
            ],
        );

        let records = sheet.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("A"), Some(&s("a1")));
        assert!(!records[0].contains_key("B"));
        assert_eq!(records[1].get("A"), Some(&CellValue::Number(2.0)));
        assert_eq!(records[1].get("B"), Some(&s("b3")));
    }

    #[test]
    fn test_records_ignore_cells_beyond_header() {
        let sheet = Sheet::new(
            "Sheet1",
            vec![vec![s("A")], vec![s("a"), s("orphan")]],
        );
        let records = sheet.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn test_header_of_empty_sheet() {
        let sheet = Sheet::default();
        assert!(sheet.header().is_none());
        assert!(sheet.header_keys().is_empty());
        assert!(sheet.records().is_empty());
    }

    #[test]
    fn test_normalized_row_price_always_empty() {
        let row = NormalizedRow::new("PAN", "222", "a");
        assert_eq!(row.price, "");
    }
}
