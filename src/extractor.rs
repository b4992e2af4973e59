//! Extractor Module
//!
//! SIBSレポートのグリッドからヘッダー行を探し、明細行を`Record`に正規化する。
//!
//! 1. 先頭`header_scan_rows`行のA列からヘッダーマーカーを探す
//! 2. ヘッダーの次の行から、A列に終端文字列を含む行の手前までを走査する
//! 3. 品目・数量・合計の列がそろい、数値に変換できる行だけをレコードにする
//!
//! 不正な行はエラーにせずスキップします。

use log::debug;

use crate::api::SibsLayout;
use crate::error::SibsError;
use crate::grid::Grid;
use crate::types::{CellValue, Record, RecordSet};

/// 抽出処理の統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// ヘッダー行（0始まり）
    pub header_row: usize,

    /// 終端行（見つからずにシート末尾まで読んだ場合は`None`）
    pub terminator_row: Option<usize>,

    /// ヘッダーと終端の間で走査した行数
    pub rows_scanned: usize,

    /// スキップした行数
    pub rows_skipped: usize,
}

/// 行をスキップした理由（ログ出力用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSkip {
    /// 必須列が空
    Missing(&'static str),

    /// 数値に変換できない
    NotNumeric(&'static str),
}

/// グリッドからレコードを抽出する
///
/// # 戻り値
///
/// * `Ok(RecordSet)` - 1件以上のレコードが得られた場合
/// * `Err(SibsError::UnrecognizedLayout)` - ヘッダーが見つからない、またはレコードが0件の場合
///
/// # 使用例
///
/// ```rust
/// use sibsclean::{extract, CellValue, Grid, SibsLayout};
///
/// let mut data_row = vec![CellValue::Empty; 20];
/// data_row[4] = CellValue::String("Soda 2L".to_string());
/// data_row[12] = CellValue::Number(20000.0);
/// data_row[19] = CellValue::Number(70.0);
///
/// let grid = Grid::from_rows(vec![
///     vec![CellValue::String("Código".to_string())],
///     data_row,
/// ]);
///
/// let records = extract(&grid, &SibsLayout::default()).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records.as_slice()[0].quantity, 2.0);
/// assert_eq!(records.as_slice()[0].unit_value, 0.0);
/// ```
pub fn extract(grid: &Grid, layout: &SibsLayout) -> Result<RecordSet, SibsError> {
    extract_with_stats(grid, layout).map(|(records, _)| records)
}

/// 統計情報付きでレコードを抽出する
pub fn extract_with_stats(
    grid: &Grid,
    layout: &SibsLayout,
) -> Result<(RecordSet, ExtractionStats), SibsError> {
    let header_row = find_header_row(grid, layout).ok_or_else(|| {
        SibsError::UnrecognizedLayout(format!(
            "header marker '{}' not found in the first {} rows",
            layout.header_marker, layout.header_scan_rows
        ))
    })?;

    let mut stats = ExtractionStats {
        header_row,
        ..Default::default()
    };
    let mut records = RecordSet::new();

    for row in (header_row + 1)..grid.height() {
        if is_terminator_row(grid, row, layout) {
            stats.terminator_row = Some(row);
            break;
        }
        stats.rows_scanned += 1;

        match parse_row(grid, row, layout) {
            Ok(record) => records.push(record),
            Err(skip) => {
                debug!("skipping row {}: {:?}", row + 1, skip);
                stats.rows_skipped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(SibsError::UnrecognizedLayout(format!(
            "no valid records below header row {}",
            header_row + 1
        )));
    }

    Ok((records, stats))
}

/// ヘッダー行を探す
///
/// A列の値（前後の空白を除去）がマーカーと完全一致する最初の行を返します。
pub(crate) fn find_header_row(grid: &Grid, layout: &SibsLayout) -> Option<usize> {
    let limit = layout.header_scan_rows.min(grid.height());
    (0..limit).find(|&row| {
        grid.cell(row, 0)
            .filter(|value| value.is_present())
            .is_some_and(|value| value.as_raw_string().trim() == layout.header_marker)
    })
}

/// 終端行かを判定（A列に終端文字列を含む）
fn is_terminator_row(grid: &Grid, row: usize, layout: &SibsLayout) -> bool {
    grid.cell(row, 0)
        .filter(|value| value.is_present())
        .is_some_and(|value| value.as_raw_string().contains(layout.terminator.as_str()))
}

/// 1行をレコードに変換する
fn parse_row(grid: &Grid, row: usize, layout: &SibsLayout) -> Result<Record, RowSkip> {
    let item = present(grid, row, layout.item_col).ok_or(RowSkip::Missing("item"))?;
    let quantity = present(grid, row, layout.quantity_col).ok_or(RowSkip::Missing("quantity"))?;
    let total = present(grid, row, layout.total_value_col).ok_or(RowSkip::Missing("total"))?;

    let quantity = quantity.to_f64().ok_or(RowSkip::NotNumeric("quantity"))?;
    let unit_value = match present(grid, row, layout.unit_value_col) {
        Some(value) => value.to_f64().ok_or(RowSkip::NotNumeric("unit value"))?,
        None => 0.0,
    };
    let total_value = total.to_f64().ok_or(RowSkip::NotNumeric("total"))?;

    Ok(Record {
        quantity: quantity / layout.quantity_divisor,
        item: item.as_raw_string().trim().to_string(),
        unit_value,
        total_value,
    })
}

/// 値が存在するセルだけを返す（空セルとNaNは除外）
fn present(grid: &Grid, row: usize, col: usize) -> Option<&CellValue> {
    grid.cell(row, col).filter(|value| value.is_present())
}
