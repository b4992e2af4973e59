//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付・時刻（表示用の文字列）
    ///
    /// 数値には変換できません。
    DateTime(String),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が存在するかを判定
    ///
    /// 空セルとNaNの数値は「存在しない」として扱います。
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Number(n) => !n.is_nan(),
            _ => true,
        }
    }

    /// 値を浮動小数点数に変換する
    ///
    /// 文字列は前後の空白を除いてからパースします。
    /// 日付、エラー値、空セル、および有限でない結果（`inf`, `nan`, `1e999`）は変換できません。
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::DateTime(_) | CellValue::Error(_) | CellValue::Empty => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// 値を文字列として取得（書式適用前）
    ///
    /// 整数値の数値は小数部なしで出力します（例: `12.0` -> `"12"`）。
    /// 論理値は`True` / `False`になります。
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::DateTime(s) | CellValue::Error(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u16,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(col: u16) -> String {
        let mut col = col as u32;
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// 正規化された請求明細1行
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 数量（生の値を係数で割ったもの）
    pub quantity: f64,

    /// 品目名（前後の空白を除去済み）
    pub item: String,

    /// 単価（元のセルが空の場合は0）
    pub unit_value: f64,

    /// 合計金額
    pub total_value: f64,
}

impl Record {
    pub fn new(quantity: f64, item: impl Into<String>, unit_value: f64, total_value: f64) -> Self {
        Self {
            quantity,
            item: item.into(),
            unit_value,
            total_value,
        }
    }
}

/// 1ファイルから抽出されたレコードの並び
///
/// 元の行順を保持し、重複の統合は行いません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// 先頭`n`件（プレビュー用）
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// 合計金額の総和
    pub fn total_value(&self) -> f64 {
        self.records.iter().map(|r| r.total_value).sum()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// 名前付きの入力ファイル
///
/// 名前は出力ファイル名とデコード方式（拡張子）の決定に使います。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_is_present() {
        assert!(CellValue::Number(0.0).is_present());
        assert!(CellValue::String(String::new()).is_present());
        assert!(CellValue::Bool(false).is_present());
        assert!(CellValue::Error("#N/A".to_string()).is_present());
        assert!(!CellValue::Number(f64::NAN).is_present());
        assert!(!CellValue::Empty.is_present());
    }

    #[test]
    fn test_cell_value_to_f64() {
        assert_eq!(CellValue::Number(3.5).to_f64(), Some(3.5));
        assert_eq!(CellValue::String(" 70.25 ".to_string()).to_f64(), Some(70.25));
        assert_eq!(CellValue::String("abc".to_string()).to_f64(), None);
        assert_eq!(CellValue::String(String::new()).to_f64(), None);
        assert_eq!(CellValue::Bool(true).to_f64(), Some(1.0));
        assert_eq!(CellValue::Error("#DIV/0!".to_string()).to_f64(), None);
        assert_eq!(CellValue::Empty.to_f64(), None);
        assert_eq!(CellValue::DateTime("2024-01-01 00:00:00".to_string()).to_f64(), None);
    }

    #[test]
    fn test_non_finite_strings_do_not_coerce() {
        for text in ["inf", "-inf", "nan", "NaN", "1e999", "infinity"] {
            assert_eq!(CellValue::String(text.to_string()).to_f64(), None, "{}", text);
        }
        assert_eq!(CellValue::Number(f64::INFINITY).to_f64(), None);
    }

    #[test]
    fn test_cell_value_as_raw_string() {
        assert_eq!(CellValue::Number(12.0).as_raw_string(), "12");
        assert_eq!(CellValue::Number(1.5).as_raw_string(), "1.5");
        assert_eq!(CellValue::String("  Soda  ".to_string()).as_raw_string(), "  Soda  ");
        assert_eq!(CellValue::Bool(true).as_raw_string(), "True");
        assert_eq!(CellValue::Bool(false).as_raw_string(), "False");
        assert_eq!(
            CellValue::DateTime("2024-01-01 00:00:00".to_string()).as_raw_string(),
            "2024-01-01 00:00:00"
        );
        assert_eq!(CellValue::Empty.as_raw_string(), "");
    }

    #[test]
    fn test_cell_coord_to_a1_notation() {
        assert_eq!(CellCoord::new(0, 0).to_a1_notation(), "A1");
        assert_eq!(CellCoord::new(1, 3).to_a1_notation(), "D2");
        assert_eq!(CellCoord::new(9, 25).to_a1_notation(), "Z10");
        assert_eq!(CellCoord::new(0, 26).to_a1_notation(), "AA1");
        assert_eq!(CellCoord::new(0, 701).to_a1_notation(), "ZZ1");
        assert_eq!(CellCoord::new(0, 702).to_a1_notation(), "AAA1");
    }

    #[test]
    fn test_record_set_order_and_head() {
        let records: RecordSet = vec![
            Record::new(1.0, "A", 1.0, 1.0),
            Record::new(2.0, "B", 2.0, 4.0),
            Record::new(3.0, "C", 3.0, 9.0),
        ]
        .into();

        let items: Vec<&str> = records.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, vec!["A", "B", "C"]);
        assert_eq!(records.head(2).len(), 2);
        assert_eq!(records.head(20).len(), 3);
        assert_eq!(records.total_value(), 14.0);
    }

    #[test]
    fn test_record_set_keeps_duplicates() {
        let record = Record::new(1.0, "Soda", 2.0, 2.0);
        let records: RecordSet = vec![record.clone(), record].into_iter().collect();
        assert_eq!(records.len(), 2);
    }

    #[allow(unused_doc_comments)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_a1_notation_row_part(row in 0u32..100_000, col in 0u16..16_384) {
                let a1 = CellCoord::new(row, col).to_a1_notation();

                prop_assert!(a1.chars().next().unwrap().is_ascii_uppercase());
                let row_part: String = a1.chars().filter(|c| c.is_ascii_digit()).collect();
                let letters: String = a1.chars().take_while(|c| c.is_ascii_uppercase()).collect();
                prop_assert_eq!(letters.len() + row_part.len(), a1.len());
                prop_assert_eq!(row_part.parse::<u32>().unwrap(), row + 1);
            }

            #[test]
            fn test_number_string_coercion(n in -1.0e9f64..1.0e9) {
                let cell = CellValue::String(format!("  {}  ", n));
                prop_assert_eq!(cell.to_f64(), Some(n));
            }
        }
    }
}
