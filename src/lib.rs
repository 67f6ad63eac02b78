//! xlsxscan - Pure-Rust XLSX worksheet decoder
//!
//! XLSXファイル内の1つのワークシートを読み込み、各セルの座標（`"B12"` -> 行12・列2）と
//! 種類（数値・文字列・日付）を文書順にデコードします。値の変換は行いません。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxscan::Workbook;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // styles.xmlから日付スタイルを計算してワークブックを開く
//!     let workbook = Workbook::open("example.xlsx")?;
//!
//!     // xl/worksheets/sheet1.xml をデコード
//!     let sheet = workbook.worksheet("sheet1")?;
//!     for record in sheet.cells() {
//!         println!("{}", record?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsxscan::{InvalidRefPolicy, ReaderBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = ReaderBuilder::new()
//!         .with_invalid_ref_policy(InvalidRefPolicy::Unknown) // 不正な参照は座標不明として扱う
//!         .build()?;
//!
//!     let workbook = reader.open_workbook("example.xlsx")?;
//!     let results = workbook.scan_sheets(&["sheet1", "sheet2"]);
//!     for (name, result) in ["sheet1", "sheet2"].iter().zip(results) {
//!         println!("{}: {} cells", name, result?.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Decoding a Parsed Tree
//!
//! ```rust
//! use xlsxscan::{parse_markup, CellKind, DateStyleSet, InvalidRefPolicy, Worksheet};
//!
//! # fn main() -> Result<(), xlsxscan::XlsxScanError> {
//! let xml = br#"<worksheet><sheetData><row><c r="B1" s="3"/></row></sheetData></worksheet>"#;
//! let date_styles: DateStyleSet = [3].into_iter().collect();
//!
//! let sheet = Worksheet::from_markup(parse_markup(xml)?, &date_styles, InvalidRefPolicy::Fail)?;
//! let records = sheet.records()?;
//! assert_eq!(records[0].kind, CellKind::Date);
//! # Ok(())
//! # }
//! ```

mod archive;
mod builder;
mod error;
mod format;
mod markup;
mod parser;
mod security;
mod types;

// 公開API
pub use archive::{ArchiveReader, ZipArchiveReader};
pub use builder::{InvalidRefPolicy, Reader, ReaderBuilder};
pub use error::XlsxScanError;
pub use markup::{parse_markup, MarkupNode, XmlElement};
pub use parser::{
    parse_cell_ref, resolve_cell_kind, worksheet_path, Resolution, Workbook, Worksheet,
};
pub use security::SecurityConfig;
pub use types::{CellAddress, CellKind, CellRecord, DateStyleSet, Diagnostic};
