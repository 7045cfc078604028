use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use listas_pdf::{FileInput, ListProcessorBuilder, PageSize, DEFAULT_OUTPUT_NAME};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listas")]
#[command(about = "Merge inventory spreadsheets into one sorted PDF list")]
#[command(version)]
struct Cli {
    #[arg(required = true, help = "Spreadsheet files, in page order")]
    files: Vec<PathBuf>,
    #[arg(long, short, value_name = "PATH", help = "Output PDF path")]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "letter", help = "Paper size")]
    page_size: PaperSize,
    #[arg(long, value_name = "MM", default_value_t = 10.0, help = "Page margins in millimetres")]
    margin: f32,
    #[arg(long, value_name = "PT", default_value_t = 8.0, help = "Table font size in points")]
    font_size: f32,
    #[arg(long, help = "Write uncompressed content streams")]
    no_compress: bool,
    #[arg(long, help = "Print the batch result as JSON on stdout")]
    json: bool,
    #[arg(long, short, help = "Verbose mode: log every pipeline stage")]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum PaperSize {
    Letter,
    A4,
}

impl From<PaperSize> for PageSize {
    fn from(size: PaperSize) -> Self {
        match size {
            PaperSize::Letter => PageSize::Letter,
            PaperSize::A4 => PageSize::A4,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_NAME));
    let output_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string());

    let processor = ListProcessorBuilder::new()
        .with_output_name(output_name)
        .with_page_size(cli.page_size.into())
        .with_margin_mm(cli.margin)
        .with_font_size(cli.font_size)
        .with_compression(!cli.no_compress)
        .build()
        .context("invalid options")?;

    let files: Vec<FileInput> = cli.files.into_iter().map(FileInput::new).collect();
    let result = processor.process(&files).context("processing failed")?;

    if let Some(document) = &result.document {
        fs::write(&output, &document.bytes)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for failure in &result.failures {
            eprintln!("{}: {}", failure.file_name, failure.message);
        }
        if let Some(document) = &result.document {
            println!(
                "{} ({} archivos, {} páginas)",
                output.display(),
                result.success_count,
                document.page_count
            );
        }
    }

    if result.is_total_failure() {
        eprintln!("Todos los archivos fallaron. Por favor revise los errores detallados.");
        return Ok(ExitCode::from(1));
    }

    Ok(ExitCode::SUCCESS)
}
