//! Parser Module
//!
//! calamineを使用したスプレッドシートのデコード。
//! 先頭シートだけを読み込み、`Grid`に変換します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
