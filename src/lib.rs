//! sibsclean - SIBS billing report cleaner
//!
//! SIBSの請求レポート（`.xls` / `.xlsx`）から明細行を抽出し、
//! 整形済みのXLSXワークブックとして書き出すクレートです。
//!
//! 処理は直線的なパイプラインです。
//!
//! バイト列 → `Grid`（calamine） → `extract` → `RecordSet` → `WorkbookWriter` → XLSXバイト列
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sibsclean::{CleanerBuilder, InputFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cleaner = CleanerBuilder::new().build()?;
//!
//!     let input = InputFile::new("relatorio.xls", std::fs::read("relatorio.xls")?);
//!     let cleaned = cleaner.clean_file(&input)?;
//!
//!     // relatorio_LIMPO.xlsx
//!     std::fs::write(&cleaned.name, &cleaned.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! # Batch Processing
//!
//! 複数ファイルは順番に処理され、認識できないファイルはスキップされます。
//! 成功が2件以上ならZIPアーカイブにまとめられます。
//!
//! ```rust,no_run
//! use sibsclean::{CleanerBuilder, InputFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cleaner = CleanerBuilder::new()
//!         .apply_billing_split(true)
//!         .build()?;
//!
//!     let inputs = vec![
//!         InputFile::new("jan.xls", std::fs::read("jan.xls")?),
//!         InputFile::new("fev.xlsx", std::fs::read("fev.xlsx")?),
//!     ];
//!
//!     let report = cleaner.clean_batch(&inputs);
//!     for skipped in &report.skipped {
//!         eprintln!("skipped {}: {}", skipped.name, skipped.reason);
//!     }
//!     if let Some(delivery) = report.into_delivery()? {
//!         std::fs::write(delivery.name(), delivery.bytes())?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Using the Core Directly
//!
//! ```rust
//! use sibsclean::{extract, filter_billing, BillingKeywords, CellValue, Grid, SibsLayout};
//!
//! let mut row = vec![CellValue::Empty; 20];
//! row[4] = CellValue::String("Soda 2L".to_string());
//! row[12] = CellValue::Number(20000.0);
//! row[17] = CellValue::Number(3.5);
//! row[19] = CellValue::Number(70.0);
//!
//! let grid = Grid::from_rows(vec![vec![CellValue::String("Código".to_string())], row]);
//! let records = extract(&grid, &SibsLayout::default()).unwrap();
//! let billing = filter_billing(&records, &BillingKeywords::default());
//! assert_eq!(billing.len(), 1);
//! ```

mod api;
mod builder;
mod error;
mod extractor;
mod filter;
mod formatter;
mod grid;
mod output;
mod parser;
mod security;
mod types;
mod writer;

// 公開API
pub use api::{
    BillingKeywords, InputFormat, SibsLayout, WriteOptions, ALL_RECORDS_SHEET, BILLING_SHEET,
    BILLING_SHEET_PREFIX, DEFAULT_SHEET, OUTPUT_HEADERS,
};
pub use builder::{Cleaner, CleanerBuilder};
pub use error::SibsError;
pub use extractor::{extract, extract_with_stats, ExtractionStats};
pub use filter::filter_billing;
pub use formatter::{
    FormatEntry, FormatOperation, FormatReport, FormatStatus, COLUMN_WIDTH, MONEY_FORMAT,
    QUANTITY_FORMAT,
};
pub use grid::Grid;
pub use output::{
    cleaned_file_name, package_archive, BatchReport, CleanedFile, Delivery, PackagedArchive,
    SkippedFile, ARCHIVE_NAME, CLEANED_SUFFIX,
};
pub use types::{CellValue, InputFile, Record, RecordSet};
pub use writer::{WorkbookWriter, WriteOutcome};
