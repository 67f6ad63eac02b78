//! Parser Module
//!
//! ワークシートのデコード処理。
//! セル参照の解析、セル種類の判定、`<sheetData>`の走査を提供します。

mod address;
mod cell_type;
mod workbook;
mod worksheet;

pub use address::parse_cell_ref;
pub use cell_type::{resolve_cell_kind, Resolution};
pub use workbook::Workbook;
pub use worksheet::{worksheet_path, Worksheet};
