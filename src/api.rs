//! Public API Types
//!
//! 公開APIで使用する設定型を定義するモジュール。
//!
//! SIBSエクスポートの列位置やキーワードは文書化されていないドメイン知識のため、
//! コードに埋め込まず設定値として扱い、JSONからも読み込めるようにしています。

use serde::{Deserialize, Serialize};

use crate::error::SibsError;

/// 出力シートの列見出し（A〜D列）
pub const OUTPUT_HEADERS: [&str; 4] = [
    "Quantidade",
    "Item",
    "Valor unitário [R$]",
    "Valor total [R$]",
];

/// 全レコードを出力するシート名
pub const ALL_RECORDS_SHEET: &str = "Todos";

/// 請求用ビューのシート名
pub const BILLING_SHEET: &str = "Faturamento";

/// 分割しない場合のシート名
pub const DEFAULT_SHEET: &str = "Sheet1";

/// 請求用シートとみなすシート名の接頭辞（小文字で比較）
pub const BILLING_SHEET_PREFIX: &str = "fatur";

/// SIBSエクスポートのレイアウト定義
///
/// ヘッダー行の探索条件と、抽出対象の4列の位置（0始まり）を保持します。
/// デフォルト値は既知のSIBSレポート形式に合わせてあります。
///
/// # 使用例
///
/// ```rust
/// use sibsclean::SibsLayout;
///
/// let layout = SibsLayout::from_json(r#"{ "header_scan_rows": 40 }"#).unwrap();
/// assert_eq!(layout.header_scan_rows, 40);
/// assert_eq!(layout.item_col, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SibsLayout {
    /// ヘッダー行を示すA列の文字列（前後の空白を除いて完全一致）
    pub header_marker: String,

    /// データ終端を示すA列の部分文字列（大文字小文字を区別）
    pub terminator: String,

    /// ヘッダーを探索する先頭からの行数
    pub header_scan_rows: usize,

    /// 品目名の列
    pub item_col: usize,

    /// 数量（生の整数値）の列
    pub quantity_col: usize,

    /// 単価の列（空でもよい）
    pub unit_value_col: usize,

    /// 合計金額の列
    pub total_value_col: usize,

    /// 数量の生の値を割る係数
    pub quantity_divisor: f64,
}

impl Default for SibsLayout {
    fn default() -> Self {
        Self {
            header_marker: "Código".to_string(),
            terminator: "Total".to_string(),
            header_scan_rows: 30,
            item_col: 4,
            quantity_col: 12,
            unit_value_col: 17,
            total_value_col: 19,
            quantity_divisor: 10_000.0,
        }
    }
}

impl SibsLayout {
    /// JSON文字列からレイアウトを読み込む
    ///
    /// 省略されたフィールドはデフォルト値になります。
    pub fn from_json(json: &str) -> Result<Self, SibsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 抽出対象の4列（品目、数量、単価、合計）
    pub fn columns(&self) -> [usize; 4] {
        [
            self.item_col,
            self.quantity_col,
            self.unit_value_col,
            self.total_value_col,
        ]
    }
}

/// 請求用ビューに含める品目のキーワード
///
/// 品目名に対して大文字小文字を区別しない部分一致で判定します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct BillingKeywords(Vec<String>);

impl From<Vec<String>> for BillingKeywords {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<BillingKeywords> for Vec<String> {
    fn from(keywords: BillingKeywords) -> Self {
        keywords.0
    }
}

impl Default for BillingKeywords {
    fn default() -> Self {
        Self::new(["mil", "sod"])
    }
}

impl BillingKeywords {
    /// キーワードの一覧から生成する（内部では小文字で保持）
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// 品目名がいずれかのキーワードを含むかを判定
    pub fn matches(&self, item: &str) -> bool {
        let item = item.to_lowercase();
        self.0
            .iter()
            .any(|keyword| !keyword.is_empty() && item.contains(keyword.as_str()))
    }

    /// 空でないキーワードが1つ以上あるか
    pub fn is_usable(&self) -> bool {
        self.0.iter().any(|k| !k.is_empty())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// 入力ファイルのデコード方式
///
/// 拡張子のみで判定し、中身の判別は行いません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputFormat {
    /// 旧形式のExcelバイナリ（BIFF）
    Xls,

    /// Office Open XML
    Xlsx,
}

impl InputFormat {
    /// ファイル名の拡張子から判定する
    ///
    /// `.xls`（大文字小文字を区別しない）のみ`Xls`、それ以外はすべて`Xlsx`。
    ///
    /// ```rust
    /// use sibsclean::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_file_name("REL.XLS"), InputFormat::Xls);
    /// assert_eq!(InputFormat::from_file_name("rel.xlsx"), InputFormat::Xlsx);
    /// ```
    pub fn from_file_name(name: &str) -> Self {
        if name.to_lowercase().ends_with(".xls") {
            InputFormat::Xls
        } else {
            InputFormat::Xlsx
        }
    }
}

/// 書き出しオプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// 数値書式、列幅、合計行、フィルタを適用するか
    pub apply_formatting: bool,

    /// 「Todos」と「Faturamento」の2シートに分けるか
    pub apply_billing_split: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            apply_formatting: true,
            apply_billing_split: false,
        }
    }
}
