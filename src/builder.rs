//! Builder Module
//!
//! Fluent Builder APIを提供し、`ListProcessor`インスタンスを段階的に構築する。
//! `ListProcessor`はファイル群を順番に処理し、1つのPDFにまとめるオーケストレーターです。

use tracing::{debug, info, warn};

use crate::api::{FileFailure, ListDocument, PageSize, ProcessResult};
use crate::error::ListError;
use crate::normalize::normalize_records;
use crate::output::{fixed_columns_width_mm, ListTable, PdfReport, PdfStyle, ReportRenderer, LIST_COLUMNS};
use crate::parser::{CalamineDecoder, WorkbookDecoder};
use crate::schema;
use crate::security::SecurityConfig;
use crate::sort::sort_rows;
use crate::source::FileSource;

/// 既定の出力ファイル名
pub const DEFAULT_OUTPUT_NAME: &str = "Listas.pdf";

/// 処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ProcessingConfig {
    /// 出力ファイル名
    pub output_name: String,

    /// 用紙サイズ
    pub page_size: PageSize,

    /// 余白（mm）
    pub margin_mm: f32,

    /// フォントサイズ（pt）
    pub font_size: f32,

    /// コンテンツストリームを圧縮するか
    pub compression: bool,

    /// 入力ファイルのセキュリティ制限
    pub security: SecurityConfig,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        let style = PdfStyle::default();
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            page_size: style.page_size,
            margin_mm: style.margin_mm,
            font_size: style.font_size,
            compression: style.compress,
            security: SecurityConfig::default(),
        }
    }
}

impl ProcessingConfig {
    /// 描画スタイルに変換する
    ///
    /// ドキュメントのタイトルには出力ファイル名の拡張子を除いた部分を使用します。
    fn pdf_style(&self) -> PdfStyle {
        let title = self
            .output_name
            .get(..self.output_name.len().saturating_sub(4))
            .unwrap_or(&self.output_name)
            .to_string();

        PdfStyle {
            page_size: self.page_size,
            margin_mm: self.margin_mm,
            font_size: self.font_size,
            compress: self.compression,
            title,
            ..PdfStyle::default()
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use listas_pdf::{ListProcessorBuilder, PageSize};
///
/// # fn main() -> Result<(), listas_pdf::ListError> {
/// let processor = ListProcessorBuilder::new()
///     .with_page_size(PageSize::A4)
///     .with_font_size(9.0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ListProcessorBuilder {
    /// 内部設定（構築中）
    config: ProcessingConfig,
}

impl ListProcessorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 出力ファイル名: `Listas.pdf`
    /// - 用紙: USレター
    /// - 余白: 10 mm
    /// - フォントサイズ: 8 pt
    /// - 圧縮: 有効
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力ファイル名を指定する
    ///
    /// # 引数
    ///
    /// * `name` - `.pdf`で終わるファイル名
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_name = name.into();
        self
    }

    /// 用紙サイズを指定する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use listas_pdf::{ListProcessorBuilder, PageSize};
    ///
    /// let builder = ListProcessorBuilder::new()
    ///     .with_page_size(PageSize::Custom { width_mm: 250.0, height_mm: 300.0 });
    /// ```
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// 上下左右の余白（mm）を指定する
    pub fn with_margin_mm(mut self, margin_mm: f32) -> Self {
        self.config.margin_mm = margin_mm;
        self
    }

    /// フォントサイズ（pt）を指定する
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.config.font_size = font_size;
        self
    }

    /// コンテンツストリームの圧縮を有効/無効にする
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.config.compression = compression;
        self
    }

    /// 入力ファイルのセキュリティ制限を指定する
    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`ListProcessor`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ListProcessor)` - 設定が有効な場合
    /// * `Err(ListError::Config)` - 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * 出力ファイル名が`.pdf`で終わらない
    /// * フォントサイズが正でない、または余白が負
    /// * 用紙の幅に固定幅列と余白が収まらない
    pub fn build(self) -> Result<ListProcessor, ListError> {
        let config = &self.config;

        // 1. 出力ファイル名の検証
        let lower = config.output_name.to_lowercase();
        if !lower.ends_with(".pdf") || lower.len() <= 4 {
            return Err(ListError::Config(format!(
                "Invalid output name: '{}' (must end in .pdf)",
                config.output_name
            )));
        }

        // 2. フォントと余白の検証
        if !config.font_size.is_finite() || config.font_size <= 0.0 {
            return Err(ListError::Config(format!(
                "Font size must be positive: {}",
                config.font_size
            )));
        }
        if !config.margin_mm.is_finite() || config.margin_mm < 0.0 {
            return Err(ListError::Config(format!(
                "Margin must be non-negative: {}",
                config.margin_mm
            )));
        }

        // 3. 用紙サイズの検証
        let (width, height) = config.page_size.dimensions_mm();
        if !(width > 0.0 && height > 0.0) {
            return Err(ListError::Config(format!(
                "Invalid page size: {} x {} mm",
                width, height
            )));
        }
        let padding = PdfStyle::default().cell_padding_mm;
        let description_width =
            width - 2.0 * config.margin_mm - fixed_columns_width_mm(&LIST_COLUMNS);
        if description_width <= 2.0 * padding {
            return Err(ListError::Config(format!(
                "Page width {} mm cannot fit the fixed columns ({} mm) with {} mm margins",
                width,
                fixed_columns_width_mm(&LIST_COLUMNS),
                config.margin_mm
            )));
        }
        if height - 2.0 * config.margin_mm <= 0.0 {
            return Err(ListError::Config(format!(
                "Page height {} mm leaves no room inside {} mm margins",
                height, config.margin_mm
            )));
        }

        Ok(ListProcessor::new(self.config))
    }
}

/// バッチ処理のファサード
///
/// ファイルを入力順に1件ずつ処理し、成功したファイルごとに1つの表を
/// 共有ドキュメントに追加します。ファイル単位のエラーは隔離され、
/// 残りのファイルの処理は続行されます。
///
/// # 使用例
///
/// ```rust,no_run
/// use listas_pdf::{FileInput, ListProcessorBuilder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let processor = ListProcessorBuilder::new().build()?;
/// let files = vec![FileInput::new("sucursal_a.xlsx"), FileInput::new("sucursal_b.xlsx")];
///
/// let result = processor.process(&files)?;
/// for failure in &result.failures {
///     eprintln!("{}: {}", failure.file_name, failure.message);
/// }
/// if let Some(document) = result.document {
///     std::fs::write(&document.file_name, &document.bytes)?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ListProcessor {
    /// 処理設定
    config: ProcessingConfig,
}

impl ListProcessor {
    pub(crate) fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// 出力ファイル名
    pub fn output_name(&self) -> &str {
        &self.config.output_name
    }

    /// ファイル群を処理し、calamineとlopdfで1つのPDFを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ProcessResult)` - 成功件数、失敗一覧、（1件以上成功した場合）ドキュメント
    /// * `Err(ListError::EmptyBatch)` - ファイルが0件の場合
    /// * `Err(ListError::Render)` - PDFの確定に失敗した場合
    pub fn process<S: FileSource>(&self, files: &[S]) -> Result<ProcessResult, ListError> {
        if files.is_empty() {
            return Err(ListError::EmptyBatch);
        }

        let renderer = PdfReport::new(self.config.pdf_style());
        self.process_with(files, &CalamineDecoder::new(), renderer)
    }

    /// デコーダーとレンダラーを指定してファイル群を処理する
    ///
    /// # 引数
    ///
    /// * `files` - 入力ファイル（この順序でページが並ぶ）
    /// * `decoder` - ワークブックデコーダー
    /// * `renderer` - レポートレンダラー（`finish`で消費される）
    ///
    /// # 処理フロー
    ///
    /// 1. ファイルが0件なら`EmptyBatch`（コラボレーターには一切触れない）
    /// 2. 各ファイルについて: 読み込み → セキュリティ検査 → デコード → 列検証
    ///    → 正規化 → ソート → 描画
    /// 3. ファイル単位のエラーは`FileFailure`として記録して続行
    ///    （`add_page`/`draw_table`の失敗もそのファイルの失敗になる）
    /// 4. 1件以上成功した場合のみドキュメントを確定
    pub fn process_with<S, R>(
        &self,
        files: &[S],
        decoder: &dyn WorkbookDecoder,
        mut renderer: R,
    ) -> Result<ProcessResult, ListError>
    where
        S: FileSource,
        R: ReportRenderer,
    {
        if files.is_empty() {
            return Err(ListError::EmptyBatch);
        }

        let mut result = ProcessResult::default();

        for file in files {
            let table = match self.build_table(file, decoder) {
                Ok(table) => table,
                Err(error) if error.is_per_file() => {
                    warn!(file = file.name(), error = %error, "file skipped");
                    result.failures.push(FileFailure {
                        file_name: file.name().to_string(),
                        message: error.to_string(),
                    });
                    continue;
                }
                Err(error) => return Err(error),
            };

            // 2件目以降の成功ファイルは新しいページから始める
            let drawn = if result.success_count > 0 {
                renderer.add_page()
            } else {
                Ok(())
            }
            .and_then(|()| renderer.draw_table(&table));

            if let Err(error) = drawn {
                warn!(file = file.name(), error = %error, "file could not be drawn");
                result.failures.push(FileFailure {
                    file_name: file.name().to_string(),
                    message: error.to_string(),
                });
                continue;
            }
            result.success_count += 1;

            info!(file = file.name(), rows = table.len(), "file processed");
        }

        if result.success_count > 0 {
            let rendered = renderer.finish()?;
            result.document = Some(ListDocument {
                file_name: self.config.output_name.clone(),
                bytes: rendered.bytes,
                page_count: rendered.page_count,
            });
        }

        info!(
            succeeded = result.success_count,
            failed = result.failures.len(),
            "batch finished"
        );

        Ok(result)
    }

    /// 1ファイル分の表を構築する
    fn build_table<S: FileSource>(
        &self,
        file: &S,
        decoder: &dyn WorkbookDecoder,
    ) -> Result<ListTable, ListError> {
        let bytes = file.read_bytes()?;
        self.config.security.check_buffer(&bytes)?;

        let sheet = schema::validate(decoder.first_sheet(&bytes)?)?;
        let records = sheet.records();
        let mut rows = normalize_records(&records);
        debug!(
            file = file.name(),
            sheet = %sheet.name,
            records = records.len(),
            kept = rows.len(),
            "rows normalized"
        );

        sort_rows(&mut rows);
        Ok(ListTable::from_rows(rows))
    }
}
