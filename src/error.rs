//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// sibscleanクレート全体で使用するエラー型
///
/// SIBSレポートの読み込み、抽出、書き出し、バッチのパッケージング中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// 行単位の変換失敗（空セル、数値に変換できないセル）はエラーではなく、
/// 該当行をスキップするだけです。書式適用の失敗も`FormatReport`に
/// 記録されるだけで、エラーとしては返されません。
///
/// # 使用例
///
/// ```rust,no_run
/// use sibsclean::SibsError;
/// use std::fs;
///
/// fn read_report(path: &str) -> Result<Vec<u8>, SibsError> {
///     let bytes = fs::read(path)?;  // Ioエラーが自動的に変換される
///     Ok(bytes)
/// }
/// ```
#[derive(Error, Debug)]
pub enum SibsError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    ///
    /// ファイル形式が不正、破損したファイル、拡張子と中身が一致しない
    /// 場合などに発生します。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// XLSXの書き出し中に発生したエラー（rust_xlsxwriter由来）
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// ZIPアーカイブの生成エラー
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON設定の読み込みエラー
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `CleanerBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use sibsclean::{BillingKeywords, CleanerBuilder, SibsError};
    ///
    /// let result = CleanerBuilder::new()
    ///     .with_billing_keywords(BillingKeywords::new(Vec::<String>::new()))
    ///     .build();
    ///
    /// match result {
    ///     Err(SibsError::Config(msg)) => println!("設定エラー: {}", msg),
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 認識できないレイアウト
    ///
    /// ヘッダーマーカー（`Código`）が走査範囲内に見つからない場合、
    /// または有効なレコードが1件も抽出できなかった場合に発生します。
    /// バッチ処理では該当ファイルのみスキップされます。
    #[error("Unrecognized SIBS layout: {0}")]
    UnrecognizedLayout(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力サイズの上限超過、アーカイブエントリ名のパストラバーサルなど。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl SibsError {
    /// バッチ処理でファイル単位のスキップとして扱うべきエラーかを判定
    ///
    /// 入力ファイルに起因するエラーは`true`、出力側のI/Oなどは`false`。
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SibsError::Parse(_)
                | SibsError::UnrecognizedLayout(_)
                | SibsError::SecurityViolation(_)
        )
    }
}
