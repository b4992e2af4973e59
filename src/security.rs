//! Security Module
//!
//! 入力サイズの上限と、出力アーカイブのエントリ名検証を提供するモジュール。

use crate::error::SibsError;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力サイズが上限以内かを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), SibsError> {
        if size > self.max_input_file_size {
            return Err(SibsError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// アーカイブのエントリ名を検証
///
/// 展開時のパストラバーサルを防ぐため、出力ZIPに書き込む名前を検証します。
/// サブディレクトリを含む相対名（`2024/jan_LIMPO.xlsx`）は許可します。
///
/// # 戻り値
///
/// * `Ok(())` - 名前が安全な場合
/// * `Err(SibsError::SecurityViolation)` - 空、絶対パス、`..`、`\`を含む場合
pub(crate) fn validate_archive_entry_name(name: &str) -> Result<(), SibsError> {
    let reason = if name.is_empty() {
        Some("Empty entry name is not allowed".to_string())
    } else if name.starts_with('/') || name.get(1..3) == Some(":\\") || name.get(1..3) == Some(":/") {
        Some(format!("Absolute path is not allowed: {}", name))
    } else if name.split('/').any(|part| part == "..") {
        Some(format!("Path traversal detected: {}", name))
    } else if name.contains('\\') {
        Some(format!("Backslash in path is not allowed: {}", name))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SibsError::SecurityViolation(reason)),
        None => Ok(()),
    }
}

/// アーカイブに書き込める名前に整える
///
/// `\`は`_`に置き換えます。それでも安全でない場合（絶対パス、`..`）は
/// 最後のパス要素だけを使います。それも使えない場合はエラーを返します。
pub(crate) fn sanitize_archive_entry_name(name: &str) -> Result<String, SibsError> {
    let replaced = name.replace('\\', "_");
    if validate_archive_entry_name(&replaced).is_ok() {
        return Ok(replaced);
    }

    let base = replaced.rsplit('/').next().unwrap_or_default();
    validate_archive_entry_name(base)?;
    Ok(base.to_string())
}
