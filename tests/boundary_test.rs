//! Boundary Value Tests
//!
//! 入力の境界値（空のシート、長いセル、特殊なセル型、ヘッダーの揺れ）に対する
//! 動作を検証します。

use std::cell::RefCell;
use std::rc::Rc;

use listas_pdf::{
    CalamineDecoder, ListError, ListProcessorBuilder, ListTable, MemoryFile, ProcessResult,
    RenderedReport, ReportRenderer,
};
use rust_xlsxwriter::*;

const HEADERS: [&str; 4] = [
    "Descripcion",
    "Código de Barras Para Venta",
    "C/P",
    "Precio Regular Derma",
];

// Helper module for generating boundary value test fixtures
mod fixtures {
    use super::*;

    pub fn write_headers(worksheet: &mut Worksheet, row: u32) -> Result<(), XlsxError> {
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(row, col as u16, *header)?;
        }
        Ok(())
    }

    /// Generate a sheet holding only the header row
    pub fn generate_header_only() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_headers(worksheet, 0)?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a row with a very long description
    pub fn generate_long_cell() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_headers(worksheet, 0)?;

        let long_text = "Crema humectante corporal ".repeat(100);
        worksheet.write_string(1, 0, &long_text)?;
        worksheet.write_string(1, 1, "123")?;
        worksheet.write_string(1, 2, "a")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate boolean and date cells in the inventory columns
    pub fn generate_typed_cells() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_headers(worksheet, 0)?;

        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        worksheet.write_string(1, 0, "Caducidad")?;
        worksheet.write_number_with_format(1, 1, 45000.0, &date_format)?;
        worksheet.write_boolean(1, 2, true)?;

        worksheet.write_boolean(2, 0, false)?;
        worksheet.write_string(2, 1, "999")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate headers in a different order with extra columns
    pub fn generate_reordered_headers() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let headers = [
            "Precio Regular Derma",
            "Marca",
            "C/P",
            "Descripcion",
            "Código de Barras Para Venta",
        ];
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }
        worksheet.write_number(1, 0, 15.0)?;
        worksheet.write_string(1, 1, "Genérica")?;
        worksheet.write_string(1, 2, "a")?;
        worksheet.write_string(1, 3, "Talco")?;
        worksheet.write_string(1, 4, "321")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a header row whose labels differ only in case or accents
    pub fn generate_near_miss_headers() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let headers = [
            "descripcion",
            "Codigo de Barras Para Venta",
            "C/P",
            "Precio Regular Derma",
        ];
        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a duplicated description column
    pub fn generate_duplicate_description() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_headers(worksheet, 0)?;
        worksheet.write_string(0, 4, "Descripcion")?;

        worksheet.write_string(1, 0, "primera")?;
        worksheet.write_string(1, 4, "segunda")?;
        worksheet.write_string(2, 4, "solo en la copia")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate blank rows between data rows
    pub fn generate_blank_rows() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_headers(worksheet, 0)?;

        worksheet.write_string(1, 0, "uno")?;
        worksheet.write_string(5, 0, "dos")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a corrupted file (truncated ZIP)
    pub fn generate_corrupted_file() -> Vec<u8> {
        let mut data = generate_header_only().unwrap_or_default();
        data.truncate(data.len() / 2);
        data
    }
}

#[derive(Clone, Default)]
struct TableCapture {
    tables: Rc<RefCell<Vec<ListTable>>>,
}

impl ReportRenderer for TableCapture {
    fn add_page(&mut self) -> Result<(), ListError> {
        Ok(())
    }

    fn draw_table(&mut self, table: &ListTable) -> Result<(), ListError> {
        self.tables.borrow_mut().push(table.clone());
        Ok(())
    }

    fn finish(self) -> Result<RenderedReport, ListError> {
        Ok(RenderedReport {
            bytes: Vec::new(),
            page_count: 1,
        })
    }
}

fn capture(data: Vec<u8>) -> (ProcessResult, Vec<ListTable>) {
    let capture = TableCapture::default();
    let processor = ListProcessorBuilder::new().build().unwrap();
    let result = processor
        .process_with(
            &[MemoryFile::new("limite.xlsx", data)],
            &CalamineDecoder::new(),
            capture.clone(),
        )
        .unwrap();
    let tables = capture.tables.borrow().clone();
    (result, tables)
}

#[test]
fn test_header_only_sheet_renders_empty_table() {
    let (result, tables) = capture(fixtures::generate_header_only().unwrap());

    // データ行がなくても成功扱い（ヘッダーのみの表が描画される）
    assert_eq!(result.success_count, 1);
    assert_eq!(tables.len(), 1);
    assert!(tables[0].is_empty());
}

#[test]
fn test_very_long_cell_content() {
    let data = fixtures::generate_long_cell().unwrap();
    let (result, tables) = capture(data.clone());
    assert_eq!(result.success_count, 1);
    assert!(tables[0].body[0][0].starts_with("CREMA HUMECTANTE CORPORAL"));
    assert!(!tables[0].body[0][0].ends_with(' '));

    // 折り返しても1ページに収まる
    let document = ListProcessorBuilder::new()
        .build()
        .unwrap()
        .process(&[MemoryFile::new("larga.xlsx", data)])
        .unwrap()
        .document
        .unwrap();
    assert_eq!(document.page_count, 1);
}

#[test]
fn test_boolean_and_date_cells() {
    let (_, tables) = capture(fixtures::generate_typed_cells().unwrap());

    // 日付はシリアル値、真偽値はtrue/空欄、偽の説明は除外
    assert_eq!(tables[0].body, vec![vec!["CADUCIDAD", "45000", "true", ""]]);
}

#[test]
fn test_reordered_headers_and_extra_columns() {
    let (result, tables) = capture(fixtures::generate_reordered_headers().unwrap());
    assert_eq!(result.success_count, 1);
    assert_eq!(tables[0].body, vec![vec!["TALCO", "321", "a", ""]]);
}

#[test]
fn test_near_miss_headers_are_missing() {
    let (result, _) = capture(fixtures::generate_near_miss_headers().unwrap());
    assert_eq!(result.success_count, 0);
    assert_eq!(
        result.failures[0].message,
        "Faltan columnas requeridas: Descripcion, Código de Barras Para Venta"
    );
}

#[test]
fn test_duplicate_description_column_uses_first() {
    let (_, tables) = capture(fixtures::generate_duplicate_description().unwrap());
    assert_eq!(tables[0].body, vec![vec!["PRIMERA", "", "", ""]]);
}

#[test]
fn test_blank_rows_are_skipped() {
    let (_, tables) = capture(fixtures::generate_blank_rows().unwrap());
    let descriptions: Vec<&str> = tables[0].body.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(descriptions, vec!["DOS", "UNO"]);
}

#[test]
fn test_corrupted_file() {
    let (result, tables) = capture(fixtures::generate_corrupted_file());
    assert_eq!(result.success_count, 0);
    assert!(tables.is_empty());
    assert_eq!(
        result.failures[0].message,
        "El archivo está corrupto o no es un formato Excel válido."
    );
}

#[test]
fn test_empty_input_bytes() {
    let (result, _) = capture(Vec::new());
    assert_eq!(
        result.failures[0].message,
        "El archivo está corrupto o no es un formato Excel válido."
    );
}
