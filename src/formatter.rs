//! Formatter Module
//!
//! 出力シートの書式適用（数値書式、列幅、合計行、オートフィルタ）を提供するモジュール。
//!
//! 書式の適用はセル単位のベストエフォートです。個々の操作の失敗は
//! `FormatReport`に記録され、残りのセルの処理は続行されます。

use rust_xlsxwriter::{Format, Worksheet, XlsxError};

use crate::api::BILLING_SHEET_PREFIX;
use crate::types::{CellCoord, RecordSet};

/// 数量列の表示形式
pub const QUANTITY_FORMAT: &str = "0.00";

/// 金額列の表示形式
pub const MONEY_FORMAT: &str = "\"R$\" #,##0.00";

/// A〜D列の列幅
pub const COLUMN_WIDTH: f64 = 20.0;

/// 書式操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOperation {
    /// セルの数値書式
    NumberFormat,

    /// 列幅
    ColumnWidth,

    /// 合計行（ラベルと数式）
    TotalRow,

    /// オートフィルタ
    AutoFilter,
}

/// 書式操作の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatStatus {
    Applied,
    Failed(String),
}

/// 1件の書式操作の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEntry {
    /// シート名
    pub sheet: String,

    /// 対象（A1記法のセル、列、または範囲）
    pub target: String,

    pub operation: FormatOperation,

    pub status: FormatStatus,
}

/// 書式適用の結果一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatReport {
    entries: Vec<FormatEntry>,
}

impl FormatReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FormatEntry] {
        &self.entries
    }

    /// 成功した操作の数
    pub fn applied_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == FormatStatus::Applied)
            .count()
    }

    /// 失敗した操作
    pub fn failures(&self) -> impl Iterator<Item = &FormatEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, FormatStatus::Failed(_)))
    }

    /// 失敗が1件もないか
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    fn record<T>(
        &mut self,
        sheet: &str,
        target: String,
        operation: FormatOperation,
        result: Result<T, XlsxError>,
    ) {
        let status = match result {
            Ok(_) => FormatStatus::Applied,
            Err(e) => FormatStatus::Failed(e.to_string()),
        };
        self.entries.push(FormatEntry {
            sheet: sheet.to_string(),
            target,
            operation,
            status,
        });
    }
}

/// 書式を適用するシートの情報
pub(crate) struct SheetPlan<'a> {
    /// シート名
    pub name: &'a str,

    /// シートに書き出したレコード（ヘッダーの次の行から）
    pub records: &'a RecordSet,

    /// 先頭シートか（合計行は先頭シートのみ）
    pub is_first: bool,

    /// 請求分割が有効か（オートフィルタの条件）
    pub billing_split: bool,
}

impl SheetPlan<'_> {
    /// 請求用シートとしてオートフィルタを付けるか
    fn wants_autofilter(&self) -> bool {
        self.billing_split && self.name.to_lowercase().starts_with(BILLING_SHEET_PREFIX)
    }

    /// ヘッダーを含めた最終行（0始まり）
    fn last_row(&self) -> u32 {
        self.records.len() as u32
    }
}

/// シート単位の書式適用
pub(crate) struct SheetFormatter {
    quantity: Format,
    money: Format,
    bold: Format,
    bold_money: Format,
}

impl SheetFormatter {
    pub fn new() -> Self {
        Self {
            quantity: Format::new().set_num_format(QUANTITY_FORMAT),
            money: Format::new().set_num_format(MONEY_FORMAT),
            bold: Format::new().set_bold(),
            bold_money: Format::new().set_bold().set_num_format(MONEY_FORMAT),
        }
    }

    /// 書き出し済みのシートに書式を適用する
    ///
    /// 値は書き出し済みのものと同じ値で上書きし、書式だけを付与します。
    pub fn apply(&self, worksheet: &mut Worksheet, plan: &SheetPlan<'_>, report: &mut FormatReport) {
        // 1. 数値書式（2行目以降）
        for (idx, record) in plan.records.iter().enumerate() {
            let row = idx as u32 + 1;
            let cells = [
                (0u16, record.quantity, &self.quantity),
                (2, record.unit_value, &self.money),
                (3, record.total_value, &self.money),
            ];
            for (col, value, format) in cells {
                let result = worksheet.write_number_with_format(row, col, value, format);
                report.record(
                    plan.name,
                    CellCoord::new(row, col).to_a1_notation(),
                    FormatOperation::NumberFormat,
                    result,
                );
            }
        }

        // 2. 列幅
        for col in 0u16..4 {
            let result = worksheet.set_column_width(col, COLUMN_WIDTH);
            let letter = CellCoord::new(0, col).to_a1_notation();
            let letter = letter.trim_end_matches('1');
            report.record(
                plan.name,
                format!("{}:{}", letter, letter),
                FormatOperation::ColumnWidth,
                result,
            );
        }

        // 3. オートフィルタ（請求用シートのみ）
        if plan.wants_autofilter() {
            let last_row = plan.last_row();
            let result = worksheet.autofilter(0, 0, last_row, 3);
            report.record(
                plan.name,
                format!("A1:{}", CellCoord::new(last_row, 3).to_a1_notation()),
                FormatOperation::AutoFilter,
                result,
            );
        }

        // 4. 合計行（先頭シートのみ）
        if plan.is_first {
            self.apply_total_row(worksheet, plan, report);
        }
    }

    /// 最終行の直下に「Total」ラベルと合計金額のSUM数式を追加する
    fn apply_total_row(&self, worksheet: &mut Worksheet, plan: &SheetPlan<'_>, report: &mut FormatReport) {
        let last_row = plan.last_row();
        let total_row = last_row + 1;

        let label_cell = CellCoord::new(total_row, 2);
        let result = worksheet.write_string_with_format(total_row, 2, "Total", &self.bold);
        report.record(
            plan.name,
            label_cell.to_a1_notation(),
            FormatOperation::TotalRow,
            result,
        );

        let formula = sum_formula(last_row);
        let sum_cell = CellCoord::new(total_row, 3);
        let result = worksheet.write_formula_with_format(total_row, 3, formula.as_str(), &self.bold_money);
        report.record(
            plan.name,
            sum_cell.to_a1_notation(),
            FormatOperation::TotalRow,
            result,
        );
    }
}

/// 合計金額列（D列）のSUM数式
///
/// `last_row`はヘッダーを含めた最終行（0始まり）。データは2行目から始まる。
pub(crate) fn sum_formula(last_row: u32) -> String {
    format!(
        "=SUM(D2:{})",
        CellCoord::new(last_row, 3).to_a1_notation()
    )
}
