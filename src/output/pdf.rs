//! PDF Renderer
//!
//! lopdfを使用して、罫線付きの表をページ単位で描画するレンダラー。
//! 標準Type1フォント（Helvetica / Helvetica-Bold）を使用するため、
//! フォントの埋め込みは行いません。

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::debug;

use super::metrics::{encode_win_ansi, wrap_text, FontFace};
use super::{Align, ColumnSpec, ColumnWidth, ListTable, RenderedReport, ReportRenderer};
use crate::api::PageSize;
use crate::error::ListError;

const PT_PER_MM: f32 = 72.0 / 25.4;
const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// ベースラインの位置（フォントサイズに対する比率）
const ASCENT_RATIO: f32 = 0.8;

/// PDFの描画スタイル
#[derive(Debug, Clone, PartialEq)]
pub struct PdfStyle {
    /// 用紙サイズ
    pub page_size: PageSize,
    /// 上下左右の余白（mm）
    pub margin_mm: f32,
    /// フォントサイズ（pt）
    pub font_size: f32,
    /// セル内余白（mm）
    pub cell_padding_mm: f32,
    /// 罫線の太さ（mm）
    pub line_width_mm: f32,
    /// 行送り（フォントサイズに対する倍率）
    pub line_height_factor: f32,
    /// コンテンツストリームを圧縮するか
    pub compress: bool,
    /// ドキュメント情報のタイトル
    pub title: String,
}

impl Default for PdfStyle {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            margin_mm: 10.0,
            font_size: 8.0,
            cell_padding_mm: 0.7,
            line_width_mm: 0.1,
            line_height_factor: 1.15,
            compress: true,
            title: "Listas".to_string(),
        }
    }
}

/// 折り返し済みの1行分のセル
#[derive(Debug)]
struct RowLayout {
    cells: Vec<Vec<String>>,
    height: f32,
}

impl RowLayout {
    fn new(cells: Vec<Vec<String>>, line_height: f32, padding: f32) -> Self {
        let max_lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = max_lines as f32 * line_height + 2.0 * padding;
        Self { cells, height }
    }

    /// 先頭`max_lines`行だけを残し、残りの行を新しい`RowLayout`として返す
    fn split_off(&mut self, max_lines: usize, line_height: f32, padding: f32) -> RowLayout {
        let rest: Vec<Vec<String>> = self
            .cells
            .iter_mut()
            .map(|lines| {
                if lines.len() > max_lines {
                    lines.split_off(max_lines)
                } else {
                    Vec::new()
                }
            })
            .collect();
        *self = RowLayout::new(std::mem::take(&mut self.cells), line_height, padding);
        RowLayout::new(rest, line_height, padding)
    }
}

/// 表形式のPDFレポート
///
/// 生成直後は空のページを1枚持ちます。描画位置（カーソル）はページ上端からの
/// 距離（pt）で管理します。
#[derive(Debug)]
pub struct PdfReport {
    style: PdfStyle,
    pages: Vec<Vec<Operation>>,
    cursor: f32,
}

impl PdfReport {
    pub fn new(style: PdfStyle) -> Self {
        let mut report = Self {
            style,
            pages: Vec::new(),
            cursor: 0.0,
        };
        report.new_page();
        report
    }

    /// 現在の物理ページ数
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_width(&self) -> f32 {
        self.style.page_size.dimensions_mm().0 * PT_PER_MM
    }

    fn page_height(&self) -> f32 {
        self.style.page_size.dimensions_mm().1 * PT_PER_MM
    }

    fn margin(&self) -> f32 {
        self.style.margin_mm * PT_PER_MM
    }

    fn padding(&self) -> f32 {
        self.style.cell_padding_mm * PT_PER_MM
    }

    fn line_height(&self) -> f32 {
        self.style.font_size * self.style.line_height_factor
    }

    fn new_page(&mut self) {
        let line_width = self.style.line_width_mm * PT_PER_MM;
        self.pages.push(vec![
            Operation::new("w", vec![Object::Real(line_width)]),
            Operation::new("RG", gray(0)),
            Operation::new("rg", gray(0)),
        ]);
        self.cursor = self.margin();
    }

    /// 列幅（pt）を計算する
    ///
    /// 可変幅の列は、表の幅から固定幅列の合計を引いた残りを均等に分け合います。
    fn column_widths(&self, columns: &[ColumnSpec]) -> Result<Vec<f32>, ListError> {
        let table_width = self.page_width() - 2.0 * self.margin();
        let fixed: f32 = columns
            .iter()
            .map(|column| match column.width {
                ColumnWidth::Fixed(mm) => mm * PT_PER_MM,
                ColumnWidth::Auto => 0.0,
            })
            .sum();
        let auto_count = columns
            .iter()
            .filter(|column| column.width == ColumnWidth::Auto)
            .count();

        let remaining = table_width - fixed;
        if auto_count > 0 && remaining <= 2.0 * self.padding() {
            return Err(ListError::Render(format!(
                "las columnas fijas ({:.1} pt) no caben en el ancho de la tabla ({:.1} pt)",
                fixed, table_width
            )));
        }
        let auto_width = if auto_count > 0 {
            remaining / auto_count as f32
        } else {
            0.0
        };

        Ok(columns
            .iter()
            .map(|column| match column.width {
                ColumnWidth::Fixed(mm) => mm * PT_PER_MM,
                ColumnWidth::Auto => auto_width,
            })
            .collect())
    }

    fn layout_row(&self, cells: &[String], widths: &[f32], font: FontFace) -> RowLayout {
        let padding = self.padding();
        let cells: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let text = cells.get(index).map(String::as_str).unwrap_or("");
                wrap_text(text, width - 2.0 * padding, font, self.style.font_size)
            })
            .collect();

        RowLayout::new(cells, self.line_height(), padding)
    }

    /// 高さ`available`（pt）に収まる本文の行数
    fn line_capacity(&self, available: f32) -> usize {
        let lines = (available - 2.0 * self.padding()) / self.line_height();
        if lines >= 1.0 {
            lines.floor() as usize
        } else {
            0
        }
    }

    fn continue_on_new_page(&mut self, header: &RowLayout, widths: &[f32], columns: &[ColumnSpec]) {
        self.new_page();
        self.draw_row(header, widths, columns, true);
    }

    fn draw_row(&mut self, row: &RowLayout, widths: &[f32], columns: &[ColumnSpec], header: bool) {
        let page_height = self.page_height();
        let padding = self.padding();
        let line_height = self.line_height();
        let font_size = self.style.font_size;
        let top = self.cursor;
        let (font_face, font_name) = if header {
            (FontFace::Bold, FONT_BOLD)
        } else {
            (FontFace::Regular, FONT_REGULAR)
        };

        let mut operations = Vec::new();
        let mut x = self.margin();

        for (index, lines) in row.cells.iter().enumerate() {
            let width = widths[index];
            let rect = vec![
                Object::Real(x),
                Object::Real(page_height - top - row.height),
                Object::Real(width),
                Object::Real(row.height),
            ];

            if header {
                // 白背景 + 罫線
                operations.push(Operation::new("rg", gray(1)));
                operations.push(Operation::new("re", rect));
                operations.push(Operation::new("B", vec![]));
                operations.push(Operation::new("rg", gray(0)));
            } else {
                operations.push(Operation::new("re", rect));
                operations.push(Operation::new("S", vec![]));
            }

            let align = if header {
                Align::Center
            } else {
                columns.get(index).map(|c| c.align).unwrap_or(Align::Left)
            };

            // 垂直方向は中央揃え
            let block_top = top + (row.height - lines.len() as f32 * line_height) / 2.0;
            for (line_index, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let text_width = font_face.text_width(line, font_size);
                let text_x = match align {
                    Align::Left => x + padding,
                    Align::Center => x + (width - text_width) / 2.0,
                    Align::Right => x + width - padding - text_width,
                };
                let baseline = block_top
                    + line_index as f32 * line_height
                    + (line_height - font_size) / 2.0
                    + font_size * ASCENT_RATIO;

                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font_name.as_bytes().to_vec()), Object::Real(font_size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Real(text_x), Object::Real(page_height - baseline)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }

            x += width;
        }

        if let Some(page) = self.pages.last_mut() {
            page.extend(operations);
        }
        self.cursor += row.height;
    }
}

impl ReportRenderer for PdfReport {
    fn add_page(&mut self) -> Result<(), ListError> {
        self.new_page();
        Ok(())
    }

    fn draw_table(&mut self, table: &ListTable) -> Result<(), ListError> {
        let widths = self.column_widths(&table.columns)?;
        let header_cells: Vec<String> = table
            .columns
            .iter()
            .map(|column| column.header.to_string())
            .collect();
        let header = self.layout_row(&header_cells, &widths, FontFace::Bold);
        let bottom = self.page_height() - self.margin();

        if self.cursor > self.margin() && self.cursor + header.height > bottom {
            self.new_page();
        }
        self.draw_row(&header, &widths, &table.columns, true);

        let page_top = self.margin() + header.height;
        let line_height = self.line_height();
        let padding = self.padding();

        // 溢れた行は次のページへ送り、ヘッダーを再描画する
        for cells in &table.body {
            let mut row = self.layout_row(cells, &widths, FontFace::Regular);
            let at_page_top = self.cursor <= page_top;
            if !at_page_top && self.cursor + row.height > bottom && page_top + row.height <= bottom {
                self.continue_on_new_page(&header, &widths, &table.columns);
            }

            // 1ページに収まらない行は行単位で分割する
            while self.cursor + row.height > bottom {
                let capacity = self.line_capacity(bottom - self.cursor);
                if capacity == 0 {
                    if self.cursor <= page_top {
                        return Err(ListError::Render(format!(
                            "la página no tiene espacio para una línea ({:.1} pt)",
                            bottom - self.cursor
                        )));
                    }
                    self.continue_on_new_page(&header, &widths, &table.columns);
                    continue;
                }
                let rest = row.split_off(capacity, line_height, padding);
                self.draw_row(&row, &widths, &table.columns, false);
                row = rest;
                self.continue_on_new_page(&header, &widths, &table.columns);
            }
            self.draw_row(&row, &widths, &table.columns, false);
        }

        debug!(rows = table.len(), pages = self.pages.len(), "table drawn");
        Ok(())
    }

    fn finish(self) -> Result<RenderedReport, ListError> {
        let page_count = self.pages.len();
        let (width, height) = (self.page_width(), self.page_height());

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular_id,
                FONT_BOLD => bold_id,
            },
        });

        let mut kids = Vec::with_capacity(page_count);
        for operations in self.pages {
            let content = Content { operations };
            let encoded = content.encode().map_err(render_error)?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(width),
                Object::Real(height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(&self.style.title)),
            "Producer" => Object::string_literal(concat!("listas_pdf ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(Local::now().format("D:%Y%m%d%H%M%S").to_string()),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        if self.style.compress {
            doc.compress();
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(render_error)?;

        debug!(pages = page_count, bytes = bytes.len(), "pdf finalized");
        Ok(RenderedReport { bytes, page_count })
    }
}

/// RGBの各成分が同じ色
fn gray(level: i64) -> Vec<Object> {
    vec![Object::Integer(level); 3]
}

fn render_error(error: impl std::fmt::Display) -> ListError {
    ListError::Render(error.to_string())
}
