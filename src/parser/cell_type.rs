//! Cell Type Resolver
//!
//! セルの型コード（`t`属性）とスタイルインデックス（`s`属性）から
//! セルの種類を決定します。
//!
//! 参照: ECMA-376 第4版
//! - 18.3.1.4  c (Cell)
//! - 18.18.11  ST_CellType (Cell Type)

use crate::markup::MarkupNode;
use crate::types::{CellKind, DateStyleSet, Diagnostic};

/// セル種類の判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub kind: CellKind,
    /// 未知の型コードだった場合の診断情報
    pub diagnostic: Option<Diagnostic>,
}

/// セルの種類を判定
///
/// | `t`               | 結果                                     |
/// |-------------------|------------------------------------------|
/// | `b`               | Numeric（論理値は区別しない）            |
/// | `d`               | Text（ISO 8601リテラルは文字列のまま）   |
/// | `n`または属性なし | `s`が日付スタイルならDate、それ以外Numeric |
/// | `s`, `str`        | Text                                     |
/// | その他            | Numeric + 警告                           |
///
/// 未知の型コードはwarnレベルでログ出力され、`Resolution::diagnostic`にも
/// 返されます。デコード自体は中断しません。
pub fn resolve_cell_kind<N: MarkupNode>(cell: &N, date_styles: &DateStyleSet) -> Resolution {
    let type_code = cell.attribute("t").unwrap_or("n");

    let kind = match type_code {
        // TODO: 論理値を独立した種類として表現する
        "b" => CellKind::Numeric,
        // 移植性のあるISO 8601パーサーを前提としないため、文字列として返す
        "d" => CellKind::Text,
        "n" => {
            let is_date = cell
                .attribute("s")
                .and_then(parse_style_index)
                .is_some_and(|style| date_styles.contains(style));
            if is_date {
                CellKind::Date
            } else {
                CellKind::Numeric
            }
        }
        "s" | "str" => CellKind::Text,
        _ => {
            // "inlineStr"はExcelが出力しないため、ここに含まれる
            let reference = cell.attribute("r").map(str::to_string);
            let diagnostic = Diagnostic::UnknownCellType {
                type_code: type_code.to_string(),
                reference,
            };
            log::warn!("{}", diagnostic);
            return Resolution {
                kind: CellKind::Numeric,
                diagnostic: Some(diagnostic),
            };
        }
    };

    Resolution {
        kind,
        diagnostic: None,
    }
}

/// `s`属性をスタイルインデックスとして解釈
///
/// Cの`atoi`と同様に、先頭の空白・符号・数字列のみを読み取ります。
/// 空白はASCIIの`isspace`（`\t \n \v \f \r`と空白）のみです。
/// 数字がない場合は0、負数の場合は`None`（どのスタイルにも一致しない）。
fn parse_style_index(value: &str) -> Option<u32> {
    let trimmed = value.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut index: u32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        index = index.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    if negative && index != 0 {
        None
    } else {
        Some(index)
    }
}
