//! Workbook Parser
//!
//! 拡張子に応じて`.xls`または`.xlsx`のデコーダーを選び、先頭シートを`Grid`にします。

use calamine::{Reader, Sheets, Xls, Xlsx};
use std::io::Cursor;

use crate::api::InputFormat;
use crate::error::SibsError;
use crate::grid::Grid;
use crate::security::SecurityConfig;

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// バイト列からワークブックを開く
    ///
    /// # 引数
    ///
    /// * `bytes` - 入力ファイルの中身
    /// * `format` - デコード方式（拡張子から判定済み）
    /// * `security` - 入力サイズの上限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(SibsError::SecurityViolation)` - 入力サイズが上限を超える場合
    /// * `Err(SibsError::Parse)` - 選択したデコーダーで読み込めない場合
    pub fn open(
        bytes: Vec<u8>,
        format: InputFormat,
        security: &SecurityConfig,
    ) -> Result<Self, SibsError> {
        security.check_input_size(bytes.len() as u64)?;

        let reader = Cursor::new(bytes);
        let workbook = match format {
            InputFormat::Xls => {
                Sheets::Xls(Xls::new(reader).map_err(|e| SibsError::Parse(e.into()))?)
            }
            InputFormat::Xlsx => {
                Sheets::Xlsx(Xlsx::new(reader).map_err(|e| SibsError::Parse(e.into()))?)
            }
        };

        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// 先頭シートを`Grid`として読み込む
    ///
    /// シートが1枚もない場合は空の`Grid`を返します。
    /// 抽出処理側でヘッダーが見つからないものとして扱われます。
    pub fn first_sheet_grid(&mut self) -> Result<Grid, SibsError> {
        match self.workbook.worksheet_range_at(0) {
            Some(range) => Ok(Grid::from_range(&range?)),
            None => Ok(Grid::default()),
        }
    }
}
