//! Grid Module
//!
//! デコード済みシートを、ライブラリに依存しない矩形グリッドとして保持するモジュール。
//! 抽出処理はこの抽象だけに依存し、calamineの型には触れません。

use calamine::{Data, Range};

use crate::types::CellValue;

/// 0始まりの矩形グリッド
///
/// 座標は常にシート上の絶対位置です。calamineの`Range`は最初の非空セルから
/// 始まるため、構築時にその開始位置の分だけ空セルで埋めます。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// グリッドデータ（行 × 列）
    cells: Vec<Vec<CellValue>>,

    /// 列数（全行で共通）
    width: usize,
}

impl Grid {
    /// 行の並びからグリッドを構築する
    ///
    /// 行ごとの長さが異なる場合は、最長の行に合わせて空セルで埋めます。
    ///
    /// ```rust
    /// use sibsclean::{CellValue, Grid};
    ///
    /// let grid = Grid::from_rows(vec![
    ///     vec![CellValue::String("Código".to_string())],
    ///     vec![CellValue::Empty, CellValue::Number(1.0)],
    /// ]);
    /// assert_eq!(grid.width(), 2);
    /// assert!(grid.cell(0, 1).is_none());
    /// assert_eq!(grid.cell(1, 1), Some(&CellValue::Number(1.0)));
    /// ```
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { cells, width }
    }

    /// calamineの`Range`からグリッドを構築する
    pub(crate) fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };
        let Some((end_row, end_col)) = range.end() else {
            return Self::default();
        };

        let height = end_row as usize + 1;
        let width = end_col as usize + 1;
        let mut cells = vec![vec![CellValue::Empty; width]; height];

        for (row, col, data) in range.cells() {
            let abs_row = start_row as usize + row;
            let abs_col = start_col as usize + col;
            cells[abs_row][abs_col] = convert_data(data);
        }

        Self { cells, width }
    }

    /// 行数
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 指定座標のセル値を取得する
    ///
    /// 範囲外の座標と空セルはどちらも`None`を返します。
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .filter(|value| !matches!(value, CellValue::Empty))
    }
}

/// calamineのセル値を変換する
///
/// 日付・時刻は数値ではなく`CellValue::DateTime`（表示用の文字列）にします。
/// エラー値はExcelの表記（`#DIV/0!`など）で保持します。
fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(
            dt.as_datetime()
                .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
        other => CellValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn test_from_rows_pads_to_rectangle() {
        let grid = Grid::from_rows(vec![
            vec![s("a")],
            vec![s("b"), s("c"), s("d")],
            vec![],
        ]);

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.cell(0, 0), Some(&s("a")));
        assert_eq!(grid.cell(0, 2), None);
        assert_eq!(grid.cell(1, 2), Some(&s("d")));
        assert_eq!(grid.cell(2, 0), None);
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let grid = Grid::from_rows(vec![vec![s("a")]]);
        assert_eq!(grid.cell(0, 19), None);
        assert_eq!(grid.cell(5, 0), None);
        assert_eq!(grid.cell(usize::MAX, usize::MAX), None);
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::from_rows(Vec::new());
        assert!(grid.is_empty());
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.cell(0, 0), None);
    }

    #[test]
    fn test_from_range_keeps_absolute_coordinates() {
        // データがC3から始まるシート
        let mut range: Range<Data> = Range::new((2, 2), (3, 4));
        range.set_value((2, 2), Data::String("Código".to_string()));
        range.set_value((3, 4), Data::Float(70.0));
        range.set_value((3, 3), Data::Int(5));

        let grid = Grid::from_range(&range);

        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.cell(2, 2), Some(&s("Código")));
        assert_eq!(grid.cell(3, 4), Some(&CellValue::Number(70.0)));
        assert_eq!(grid.cell(3, 3), Some(&CellValue::Number(5.0)));
        assert_eq!(grid.cell(0, 0), None);
    }

    #[test]
    fn test_from_empty_range() {
        let range: Range<Data> = Range::empty();
        let grid = Grid::from_range(&range);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_convert_data() {
        assert_eq!(convert_data(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(convert_data(&Data::Empty), CellValue::Empty);
        assert_eq!(
            convert_data(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Error("#DIV/0!".to_string())
        );
        assert_eq!(
            convert_data(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Error("#N/A".to_string())
        );
    }

    #[test]
    fn test_convert_dates_are_not_numbers() {
        let date = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        let value = convert_data(&Data::DateTime(date));

        assert_eq!(value, CellValue::DateTime("2024-01-01 00:00:00".to_string()));
        assert_eq!(value.to_f64(), None);

        let iso = convert_data(&Data::DateTimeIso("2024-01-01T10:00:00".to_string()));
        assert_eq!(iso.to_f64(), None);
        assert_eq!(iso.as_raw_string(), "2024-01-01T10:00:00");
    }
}
