//! Builder Module
//!
//! Fluent Builder APIを提供し、`Cleaner`インスタンスを段階的に構築する。

use log::{debug, info, warn};

use crate::api::{BillingKeywords, InputFormat, SibsLayout, WriteOptions};
use crate::error::SibsError;
use crate::extractor::extract_with_stats;
use crate::output::{cleaned_file_name, BatchReport, CleanedFile, SkippedFile};
use crate::parser::WorkbookParser;
use crate::security::SecurityConfig;
use crate::types::InputFile;
use crate::writer::WorkbookWriter;

/// xlsxの列数の上限
const MAX_COLUMNS: usize = 16_384;

/// 処理設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct CleanerConfig {
    /// SIBSレイアウト
    pub layout: SibsLayout,

    /// 請求用ビューのキーワード
    pub keywords: BillingKeywords,

    /// 書き出しオプション
    pub write_options: WriteOptions,

    /// 入力サイズの上限など
    pub security: SecurityConfig,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            layout: SibsLayout::default(),
            keywords: BillingKeywords::default(),
            write_options: WriteOptions::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sibsclean::CleanerBuilder;
///
/// # fn main() -> Result<(), sibsclean::SibsError> {
/// let cleaner = CleanerBuilder::new()
///     .apply_billing_split(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CleanerBuilder {
    /// 内部設定（構築中）
    config: CleanerConfig,
}

impl Default for CleanerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - レイアウト: ヘッダー`Código`、終端`Total`、走査30行、列4/12/17/19、係数10000
    /// - キーワード: `mil`, `sod`
    /// - 書式適用: あり
    /// - 請求分割: なし
    /// - 入力サイズ上限: 2GB
    pub fn new() -> Self {
        Self {
            config: CleanerConfig::default(),
        }
    }

    /// SIBSレイアウトを指定する
    pub fn with_layout(mut self, layout: SibsLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// 請求用ビューのキーワードを指定する
    ///
    /// ```rust,no_run
    /// use sibsclean::{BillingKeywords, CleanerBuilder};
    ///
    /// let builder = CleanerBuilder::new()
    ///     .with_billing_keywords(BillingKeywords::new(["mil", "sod", "agua"]));
    /// ```
    pub fn with_billing_keywords(mut self, keywords: BillingKeywords) -> Self {
        self.config.keywords = keywords;
        self
    }

    /// 数値書式、列幅、合計行、オートフィルタを適用するか
    pub fn apply_formatting(mut self, apply: bool) -> Self {
        self.config.write_options.apply_formatting = apply;
        self
    }

    /// 「Todos」と「Faturamento」の2シートに分けるか
    pub fn apply_billing_split(mut self, apply: bool) -> Self {
        self.config.write_options.apply_billing_split = apply;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Cleaner`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SibsError::Config(String)`: 設定の検証に失敗した場合
    ///   * ヘッダーマーカーまたは終端文字列が空
    ///   * 走査行数が0
    ///   * 数量の係数が0または有限でない
    ///   * 抽出列が重複している、または列数の上限を超える
    ///   * 有効なキーワードが1つもない
    pub fn build(self) -> Result<Cleaner, SibsError> {
        let layout = &self.config.layout;

        // 1. レイアウトの検証
        if layout.header_marker.trim().is_empty() {
            return Err(SibsError::Config("Header marker must not be empty".to_string()));
        }
        if layout.terminator.is_empty() {
            return Err(SibsError::Config("Terminator must not be empty".to_string()));
        }
        if layout.header_scan_rows == 0 {
            return Err(SibsError::Config(
                "Header scan window must be at least 1 row".to_string(),
            ));
        }
        if layout.quantity_divisor == 0.0 || !layout.quantity_divisor.is_finite() {
            return Err(SibsError::Config(format!(
                "Invalid quantity divisor: {}",
                layout.quantity_divisor
            )));
        }

        // 2. 列位置の検証
        let columns = layout.columns();
        if let Some(col) = columns.iter().find(|&&col| col >= MAX_COLUMNS) {
            return Err(SibsError::Config(format!(
                "Column {} exceeds the maximum column index ({})",
                col,
                MAX_COLUMNS - 1
            )));
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[i + 1..].contains(col) {
                return Err(SibsError::Config(format!(
                    "Column {} is assigned to more than one field",
                    col
                )));
            }
        }

        // 3. キーワードの検証
        if !self.config.keywords.is_usable() {
            return Err(SibsError::Config(
                "At least one non-empty billing keyword is required".to_string(),
            ));
        }

        // 4. Cleanerインスタンス生成
        Ok(Cleaner::new(self.config))
    }
}

/// 処理のファサード
///
/// SIBSレポートを読み込み、レコードを抽出し、整形済みのXLSXを生成します。
/// 状態を持たないため、同じインスタンスで何度でも処理できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sibsclean::{CleanerBuilder, InputFile};
///
/// # fn main() -> Result<(), sibsclean::SibsError> {
/// let cleaner = CleanerBuilder::new().build()?;
/// let input = InputFile::new("relatorio.xls", std::fs::read("relatorio.xls")?);
/// let cleaned = cleaner.clean_file(&input)?;
/// std::fs::write(&cleaned.name, &cleaned.bytes)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Cleaner {
    /// 処理設定
    config: CleanerConfig,

    /// XLSXライター
    writer: WorkbookWriter,
}

impl Cleaner {
    pub(crate) fn new(config: CleanerConfig) -> Self {
        Self {
            writer: WorkbookWriter::new(config.keywords.clone()),
            config,
        }
    }

    /// 1ファイルを処理する
    ///
    /// # 処理フロー
    ///
    /// 1. 拡張子からデコード方式を選び、先頭シートを`Grid`に変換
    /// 2. ヘッダーを探してレコードを抽出
    /// 3. レコードをXLSXに書き出す（書式適用、請求分割は設定に従う）
    ///
    /// # 戻り値
    ///
    /// * `Ok(CleanedFile)` - 出力ファイル名とバイト列
    /// * `Err(SibsError::UnrecognizedLayout)` - SIBSレポートとして認識できない場合
    /// * `Err(SibsError::Parse)` - ファイルを読み込めない場合
    pub fn clean_file(&self, input: &InputFile) -> Result<CleanedFile, SibsError> {
        let format = InputFormat::from_file_name(&input.name);
        debug!("decoding {} as {:?}", input.name, format);

        let mut parser = WorkbookParser::open(input.bytes.clone(), format, &self.config.security)?;
        debug!("{}: sheets {:?}", input.name, parser.sheet_names());
        let grid = parser.first_sheet_grid()?;

        let (records, stats) = extract_with_stats(&grid, &self.config.layout)?;
        debug!(
            "{}: header at row {}, {} rows scanned, {} skipped",
            input.name,
            stats.header_row + 1,
            stats.rows_scanned,
            stats.rows_skipped
        );

        let outcome = self.writer.write(&records, self.config.write_options)?;
        for failure in outcome.report.failures() {
            debug!(
                "{}: formatting {:?} on {}!{} failed: {:?}",
                input.name, failure.operation, failure.sheet, failure.target, failure.status
            );
        }

        Ok(CleanedFile {
            source_name: input.name.clone(),
            name: cleaned_file_name(&input.name),
            bytes: outcome.bytes,
            records,
            stats,
            format_report: outcome.report,
            fallback_reason: outcome.fallback_reason,
        })
    }

    /// 複数ファイルを順番に処理する
    ///
    /// 失敗したファイルは`BatchReport::skipped`に記録され、残りのファイルの処理は続行されます。
    pub fn clean_batch(&self, inputs: &[InputFile]) -> BatchReport {
        let mut report = BatchReport::default();

        for (idx, input) in inputs.iter().enumerate() {
            debug!("processing {} ({}/{})", input.name, idx + 1, inputs.len());

            match self.clean_file(input) {
                Ok(cleaned) => {
                    info!("{}: {} records", input.name, cleaned.records.len());
                    if let Some(reason) = &cleaned.fallback_reason {
                        warn!("{}: written without formatting ({})", input.name, reason);
                    }
                    report.outputs.push(cleaned);
                }
                Err(e) => {
                    if e.is_input_error() {
                        warn!("skipping {}: {}", input.name, e);
                    } else {
                        log::error!("skipping {}: {}", input.name, e);
                    }
                    report.skipped.push(SkippedFile {
                        name: input.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "batch finished: {} processed, {} skipped",
            report.outputs.len(),
            report.skipped.len()
        );
        report
    }
}
