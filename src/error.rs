//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! ファイル単位のエラーのメッセージ（`Display`）は、そのまま失敗レポートとして
//! 利用者に表示されるため、スペイン語の固定文言を使用します。

use thiserror::Error;

/// listas_pdfクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// ファイル単位（バッチ内で隔離される）:
///
/// - `Read`: ファイルの読み込みに失敗
/// - `CorruptFile`: スプレッドシートとしてデコードできない
/// - `EmptyWorkbook` / `EmptySheet`: 構造的に空の入力
/// - `MissingColumns`: 必須列が見つからない
/// - `SecurityViolation`: 入力サイズやZIP構造の制限違反
///
/// 呼び出し全体が失敗するもの:
///
/// - `EmptyBatch`: 処理対象のファイルが0件
/// - `Render`: PDFの確定処理中のエラー（表の描画中に発生した場合は
///   そのファイルの失敗として記録される）
/// - `Config`: ビルダー設定の検証エラー
///
/// # 使用例
///
/// ```rust
/// use listas_pdf::ListError;
///
/// let error = ListError::MissingColumns(vec!["C/P".to_string()]);
/// assert_eq!(error.to_string(), "Faltan columnas requeridas: C/P");
/// assert!(error.is_per_file());
/// ```
#[derive(Error, Debug)]
pub enum ListError {
    /// ファイルハンドルから読み込めなかったエラー
    ///
    /// 元のI/Oエラーは`source()`から取得できます。
    #[error("Error de lectura de archivo.")]
    Read(#[from] std::io::Error),

    /// デコーダーがバイト列を解析できなかったエラー
    ///
    /// `reason`にはデコーダー由来の詳細が入りますが、表示メッセージには含めません。
    #[error("El archivo está corrupto o no es un formato Excel válido.")]
    CorruptFile {
        /// デコーダーが報告した詳細
        reason: String,
    },

    /// ワークブックにシートが1枚も存在しない
    #[error("El archivo Excel no contiene hojas de cálculo.")]
    EmptyWorkbook,

    /// 先頭シートに行が存在しない
    #[error("La hoja de cálculo está vacía.")]
    EmptySheet,

    /// ヘッダー行に必須列が含まれていない
    ///
    /// 欠落している列名を正規の順序で保持します。
    #[error("Faltan columnas requeridas: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力サイズの上限、ZIP bomb、パストラバーサルなど。
    #[error("El archivo excede los límites de seguridad: {0}")]
    SecurityViolation(String),

    /// 処理対象のファイルが0件で呼び出された
    #[error("No hay archivos para procesar.")]
    EmptyBatch,

    /// レポートの描画または確定処理に失敗したエラー
    #[error("Error al generar el PDF: {0}")]
    Render(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ListProcessorBuilder::build()`時に無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ListError {
    /// バッチ内で隔離されるファイル単位のエラーかどうか
    ///
    /// `true`の場合、オーケストレーターはこのエラーを失敗レコードに変換して
    /// 次のファイルの処理を続行します。
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            ListError::Read(_)
                | ListError::CorruptFile { .. }
                | ListError::EmptyWorkbook
                | ListError::EmptySheet
                | ListError::MissingColumns(_)
                | ListError::SecurityViolation(_)
        )
    }
}
