//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxscanクレート全体で使用するエラー型
///
/// ワークシートのオープン、XML解析、セル参照のデコード中に発生する
/// すべての致命的エラーを統一的に扱うために使用されます。
/// 致命的でない状況（未知のセル型など）はエラーではなく
/// [`Diagnostic`](crate::Diagnostic)としてレコードに添付されます。
///
/// # エラーの種類
///
/// - `Io`, `Zip`, `EntryNotFound`: アーカイブの読み込み失敗
/// - `Xml`, `Utf8`: マークアップの解析失敗
/// - `MissingElement`: ワークシートの構造エラー（`<worksheet>`/`<sheetData>`の欠落）
/// - `InvalidCellRef`, `CellRefOverflow`: セル参照のデコード失敗
/// - `Config`, `SecurityViolation`: 設定・セキュリティ制限
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxscan::{Workbook, XlsxScanError};
///
/// match Workbook::open("book.xlsx") {
///     Err(XlsxScanError::Io(e)) => eprintln!("cannot open: {}", e),
///     Err(e) => eprintln!("{}", e),
///     Ok(_) => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxScanError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// アーカイブ内に指定されたエントリが存在しない
    #[error("Entry '{entry}' not found in archive '{archive}'")]
    EntryNotFound {
        /// アーカイブのパス
        archive: String,
        /// アーカイブ内のパス（例: `xl/worksheets/sheet1.xml`）
        entry: String,
    },

    /// XMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 必須要素が存在しない（構造エラー）
    ///
    /// ワークシートXMLに`<worksheet>`ルートまたは`<sheetData>`が
    /// 存在しない場合に発生します。セルは一切デコードされません。
    #[error("Invalid sheet xml (no <{element}>) in '{path}'")]
    MissingElement {
        /// 欠落している要素名
        element: String,
        /// ワークシートのパス
        path: String,
    },

    /// セル参照に不正な文字が含まれている
    ///
    /// 参照文字列は大文字の`A`-`Z`と数字`0`-`9`のみで構成されます。
    #[error("Invalid character ('{character}') in cell ref '{reference}'")]
    InvalidCellRef {
        /// 不正な文字
        character: char,
        /// 元のセル参照文字列
        reference: String,
    },

    /// セル参照の行・列番号が表現可能な範囲を超えた
    #[error("Cell ref '{reference}' is out of range")]
    CellRefOverflow {
        /// 元のセル参照文字列
        reference: String,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ReaderBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// エントリ数・エントリサイズの上限超過、または危険なエントリパス
    /// （絶対パス、`..`、`\`）が検出された場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<quick_xml::Error> for XlsxScanError {
    fn from(e: quick_xml::Error) -> Self {
        XlsxScanError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XlsxScanError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        XlsxScanError::Xml(format!("attribute error: {}", e))
    }
}
