//! Writer Module
//!
//! `RecordSet`をXLSXワークブックに書き出すモジュール。
//!
//! 書式適用が有効な場合でも、保存（シリアライズ）に失敗したときは
//! 書式なしのワークブックを作り直して返します。データは失われません。

use log::warn;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::api::{
    BillingKeywords, WriteOptions, ALL_RECORDS_SHEET, BILLING_SHEET, DEFAULT_SHEET, OUTPUT_HEADERS,
};
use crate::error::SibsError;
use crate::filter::filter_billing;
use crate::formatter::{FormatReport, SheetFormatter, SheetPlan};
use crate::types::RecordSet;

/// 書き出し結果
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// XLSXファイルのバイト列
    pub bytes: Vec<u8>,

    /// 書式適用の記録（書式なしの場合は空）
    pub report: FormatReport,

    /// 書式付きの保存に失敗し、書式なしに切り替えた場合の理由
    pub fallback_reason: Option<String>,
}

impl WriteOutcome {
    /// 書式付きで保存できたか
    pub fn is_formatted(&self) -> bool {
        !self.report.entries().is_empty() && self.fallback_reason.is_none()
    }
}

/// ワークブックライター
///
/// # 使用例
///
/// ```rust
/// use sibsclean::{BillingKeywords, Record, RecordSet, WorkbookWriter, WriteOptions};
///
/// let records: RecordSet = vec![Record::new(2.0, "Soda 2L", 3.5, 70.0)].into();
/// let writer = WorkbookWriter::new(BillingKeywords::default());
/// let outcome = writer
///     .write(&records, WriteOptions { apply_formatting: true, apply_billing_split: true })
///     .unwrap();
/// assert!(!outcome.bytes.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkbookWriter {
    keywords: BillingKeywords,
}

impl WorkbookWriter {
    pub fn new(keywords: BillingKeywords) -> Self {
        Self { keywords }
    }

    /// レコードをXLSXとして書き出す
    ///
    /// # 戻り値
    ///
    /// * `Ok(WriteOutcome)` - 書式付き、またはフォールバックした書式なしのバイト列
    /// * `Err(SibsError::Write)` - 書式なしでも保存できなかった場合
    pub fn write(&self, records: &RecordSet, options: WriteOptions) -> Result<WriteOutcome, SibsError> {
        let billing;
        let sheets: Vec<(&str, &RecordSet)> = if options.apply_billing_split {
            billing = filter_billing(records, &self.keywords);
            vec![(ALL_RECORDS_SHEET, records), (BILLING_SHEET, &billing)]
        } else {
            vec![(DEFAULT_SHEET, records)]
        };

        if !options.apply_formatting {
            let bytes = build_workbook(&sheets, None)?.save_to_buffer()?;
            return Ok(WriteOutcome {
                bytes,
                report: FormatReport::new(),
                fallback_reason: None,
            });
        }

        let mut report = FormatReport::new();
        let formatted = build_workbook(&sheets, Some((&mut report, options.apply_billing_split)))
            .and_then(|mut workbook| Ok(workbook.save_to_buffer()?));

        match formatted {
            Ok(bytes) => Ok(WriteOutcome {
                bytes,
                report,
                fallback_reason: None,
            }),
            Err(e) => {
                warn!("formatting failed, writing unformatted workbook: {}", e);
                let bytes = build_workbook(&sheets, None)?.save_to_buffer()?;
                Ok(WriteOutcome {
                    bytes,
                    report,
                    fallback_reason: Some(e.to_string()),
                })
            }
        }
    }
}

/// シートごとに値を書き込み、必要なら書式を適用したワークブックを作る
///
/// `formatting`は書式の記録先と請求分割の有無。`None`なら値のみ。
fn build_workbook(
    sheets: &[(&str, &RecordSet)],
    mut formatting: Option<(&mut FormatReport, bool)>,
) -> Result<Workbook, SibsError> {
    let mut workbook = Workbook::new();
    let formatter = SheetFormatter::new();

    for (idx, (name, records)) in sheets.iter().enumerate() {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(*name)?;
        write_records(&mut worksheet, records)?;

        if let Some((report, billing_split)) = formatting.as_mut() {
            let plan = SheetPlan {
                name,
                records,
                is_first: idx == 0,
                billing_split: *billing_split,
            };
            formatter.apply(&mut worksheet, &plan, report);
        }

        workbook.push_worksheet(worksheet);
    }

    Ok(workbook)
}

/// ヘッダー行と値を書き込む（書式なし）
fn write_records(worksheet: &mut Worksheet, records: &RecordSet) -> Result<(), SibsError> {
    for (col, header) in OUTPUT_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_number(row, 0, record.quantity)?;
        worksheet.write_string(row, 1, record.item.as_str())?;
        worksheet.write_number(row, 2, record.unit_value)?;
        worksheet.write_number(row, 3, record.total_value)?;
    }

    Ok(())
}
