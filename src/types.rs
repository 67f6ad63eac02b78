//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// セル座標（1始まり）
///
/// `"B12"`のようなセル参照から得られる`(row, column)`の組です。
/// 文字のみの参照では`row`が0、数字のみの参照では`column`が0になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}

impl CellAddress {
    /// 新しい座標を生成
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// A1形式の文字列に変換（例: (12, 2) -> "B12"）
    ///
    /// 0の成分は出力されません（(0, 3) -> "C"、(7, 0) -> "7"）。
    pub fn to_a1(&self) -> String {
        let mut result = Self::column_to_letters(self.column);
        if self.row > 0 {
            result.push_str(&self.row.to_string());
        }
        result
    }

    /// 列番号を文字列に変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
    fn column_to_letters(mut column: u32) -> String {
        let mut letters = Vec::new();
        while column > 0 {
            let remainder = (column - 1) % 26;
            letters.push((b'A' + remainder as u8) as char);
            column = (column - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.column)
    }
}

/// セルの意味的な種類
///
/// セルの型コード（`t`属性）と、数値セルの場合はスタイルインデックス
/// （`s`属性）から計算されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// 数値（論理値もここに含まれる）
    Numeric,

    /// 文字列（共有文字列、数式文字列、ISO 8601リテラル）
    Text,

    /// 日付書式が適用された数値
    Date,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Numeric => "numeric",
            CellKind::Text => "text",
            CellKind::Date => "date",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日付書式のスタイルインデックス集合
///
/// ワークブックの`cellXfs`のうち、日付・時刻として表示される
/// スタイルのインデックスを保持します。ワークシートのデコード中は不変です。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateStyleSet {
    styles: HashSet<u32>,
}

impl DateStyleSet {
    /// 空の集合を生成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, style: u32) -> bool {
        self.styles.insert(style)
    }

    /// スタイルインデックスが日付書式かどうかを判定
    pub fn contains(&self, style: u32) -> bool {
        self.styles.contains(&style)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.styles.iter().copied()
    }
}

impl FromIterator<u32> for DateStyleSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            styles: iter.into_iter().collect(),
        }
    }
}

/// デコード中に検出された致命的でない状況
///
/// ログ（warnレベル）に出力されると同時に、該当セルのレコードに添付されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// 未知の型コード（数値として扱われる）
    UnknownCellType {
        type_code: String,
        reference: Option<String>,
    },

    /// `r`属性のないセル
    MissingCellRef,

    /// 不正な文字を含むセル参照（`InvalidRefPolicy::Unknown`の場合のみ）
    InvalidCellRef { character: char, reference: String },

    /// 行・列が範囲外のセル参照（`InvalidRefPolicy::Unknown`の場合のみ）
    CellRefOverflow { reference: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownCellType {
                type_code,
                reference,
            } => write!(
                f,
                "Unknown type '{}' in cell '{}'",
                type_code,
                reference.as_deref().unwrap_or("??")
            ),
            Diagnostic::MissingCellRef => f.write_str("Cell without reference attribute"),
            Diagnostic::InvalidCellRef {
                character,
                reference,
            } => write!(
                f,
                "Invalid character ('{}') in cell ref '{}'",
                character, reference
            ),
            Diagnostic::CellRefOverflow { reference } => {
                write!(f, "Cell ref '{}' is out of range", reference)
            }
        }
    }
}

/// デコード済みセルレコード
///
/// `address`が`None`の場合、セル参照が欠落しているか（不正で、寛容な
/// ポリシーが選択されている）ことを示します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellRecord {
    pub address: Option<CellAddress>,
    pub kind: CellKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl CellRecord {
    pub fn new(address: Option<CellAddress>, kind: CellKind) -> Self {
        Self {
            address,
            kind,
            diagnostics: Vec::new(),
        }
    }
}

impl fmt::Display for CellRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{}: {}", address, self.kind),
            None => write!(f, "unknown: {}", self.kind),
        }
    }
}
