//! Output Module
//!
//! 処理結果（出力ファイル名、バッチ結果、配布形態）を表す型を提供するモジュール。

mod archive;

use crate::error::SibsError;
use crate::extractor::ExtractionStats;
use crate::formatter::FormatReport;
use crate::types::RecordSet;

pub use archive::{package_archive, PackagedArchive};

/// 出力ファイル名に付ける接尾辞
pub const CLEANED_SUFFIX: &str = "_LIMPO";

/// 複数ファイルをまとめたアーカイブの名前
pub const ARCHIVE_NAME: &str = "SIBS_LIMPAS.zip";

/// 入力ファイル名から出力ファイル名を作る
///
/// 最後の拡張子を取り除き、`_LIMPO.xlsx`を付けます。
///
/// ```rust
/// use sibsclean::cleaned_file_name;
///
/// assert_eq!(cleaned_file_name("relatorio.xls"), "relatorio_LIMPO.xlsx");
/// assert_eq!(cleaned_file_name("jan.2024.xlsx"), "jan.2024_LIMPO.xlsx");
/// assert_eq!(cleaned_file_name("sem_extensao"), "sem_extensao_LIMPO.xlsx");
/// ```
pub fn cleaned_file_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    };
    format!("{}{}.xlsx", stem, CLEANED_SUFFIX)
}

/// 1ファイル分の処理結果
#[derive(Debug, Clone)]
pub struct CleanedFile {
    /// 入力ファイル名
    pub source_name: String,

    /// 出力ファイル名（`_LIMPO.xlsx`）
    pub name: String,

    /// 出力XLSXのバイト列
    pub bytes: Vec<u8>,

    /// 抽出されたレコード（プレビュー用）
    pub records: RecordSet,

    pub stats: ExtractionStats,

    /// 書式適用の記録
    pub format_report: FormatReport,

    /// 書式なしにフォールバックした場合の理由
    pub fallback_reason: Option<String>,
}

/// スキップされたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// バッチ処理の結果
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// 処理に成功したファイル（入力順）
    pub outputs: Vec<CleanedFile>,

    /// スキップされたファイル（入力順）
    pub skipped: Vec<SkippedFile>,
}

/// 利用者に渡す最終成果物
#[derive(Debug, Clone)]
pub enum Delivery {
    /// 1ファイルのみ成功した場合はそのまま渡す
    Single(CleanedFile),

    /// 複数ファイルはZIPにまとめる
    ///
    /// `rejected`はエントリ名を安全にできずアーカイブから外したファイル。
    Archive {
        name: String,
        bytes: Vec<u8>,
        rejected: Vec<SkippedFile>,
    },
}

impl Delivery {
    pub fn name(&self) -> &str {
        match self {
            Delivery::Single(file) => &file.name,
            Delivery::Archive { name, .. } => name,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Delivery::Single(file) => &file.bytes,
            Delivery::Archive { bytes, .. } => bytes,
        }
    }
}

impl BatchReport {
    /// 成果物にまとめる
    ///
    /// * 成功0件: `None`
    /// * 成功1件: `Delivery::Single`
    /// * 成功2件以上: `Delivery::Archive`（`SIBS_LIMPAS.zip`）
    pub fn into_delivery(self) -> Result<Option<Delivery>, SibsError> {
        match self.outputs.len() {
            0 => Ok(None),
            1 => Ok(self.outputs.into_iter().next().map(Delivery::Single)),
            _ => {
                let packaged = package_archive(&self.outputs)?;
                Ok(Some(Delivery::Archive {
                    name: ARCHIVE_NAME.to_string(),
                    bytes: packaged.bytes,
                    rejected: packaged.rejected,
                }))
            }
        }
    }

    /// 成功した全ファイルのレコード数の合計
    pub fn total_records(&self) -> usize {
        self.outputs.iter().map(|f| f.records.len()).sum()
    }
}
