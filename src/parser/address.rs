//! Cell Reference Parser
//!
//! A1形式のセル参照文字列を`(row, column)`に変換します。

use crate::error::XlsxScanError;
use crate::types::CellAddress;

/// セル参照文字列を座標に変換（例: "B12" -> (12, 2)）
///
/// 左から順に1文字ずつ処理し、数字は行番号（10進）、大文字は列番号
/// （ゼロのない26進: A=1 … Z=26, AA=27）に累積します。
/// 文字と数字の順序や、両方が存在するかどうかは検証しません。
/// 文字のみの参照は`row == 0`、数字のみの参照は`column == 0`になります。
///
/// # 戻り値
///
/// * `Ok(CellAddress)` - 変換に成功した場合
/// * `Err(XlsxScanError::InvalidCellRef)` - `A`-`Z`、`0`-`9`以外の文字を含む場合
/// * `Err(XlsxScanError::CellRefOverflow)` - 行・列が`u32`に収まらない場合
///
/// # 使用例
///
/// ```rust
/// use xlsxscan::{parse_cell_ref, CellAddress};
///
/// assert_eq!(parse_cell_ref("B12").unwrap(), CellAddress::new(12, 2));
/// assert_eq!(parse_cell_ref("AA1").unwrap(), CellAddress::new(1, 27));
/// ```
pub fn parse_cell_ref(reference: &str) -> Result<CellAddress, XlsxScanError> {
    let mut row: u32 = 0;
    let mut column: u32 = 0;

    let overflow = || XlsxScanError::CellRefOverflow {
        reference: reference.to_string(),
    };

    for ch in reference.chars() {
        match ch {
            '0'..='9' => {
                let digit = ch as u32 - '0' as u32;
                row = row
                    .checked_mul(10)
                    .and_then(|r| r.checked_add(digit))
                    .ok_or_else(overflow)?;
            }
            'A'..='Z' => {
                let letter = ch as u32 - 'A' as u32 + 1;
                column = column
                    .checked_mul(26)
                    .and_then(|c| c.checked_add(letter))
                    .ok_or_else(overflow)?;
            }
            _ => {
                return Err(XlsxScanError::InvalidCellRef {
                    character: ch,
                    reference: reference.to_string(),
                })
            }
        }
    }

    Ok(CellAddress::new(row, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_refs() {
        assert_eq!(parse_cell_ref("A1").unwrap(), CellAddress::new(1, 1));
        assert_eq!(parse_cell_ref("B12").unwrap(), CellAddress::new(12, 2));
        assert_eq!(parse_cell_ref("Z9").unwrap(), CellAddress::new(9, 26));
        assert_eq!(parse_cell_ref("AA1").unwrap(), CellAddress::new(1, 27));
        assert_eq!(parse_cell_ref("AZ3").unwrap(), CellAddress::new(3, 52));
        assert_eq!(parse_cell_ref("BA3").unwrap(), CellAddress::new(3, 53));
    }

    #[test]
    fn test_parse_max_ref() {
        assert_eq!(
            parse_cell_ref("XFD1048576").unwrap(),
            CellAddress::new(1_048_576, 16_384)
        );
    }

    #[test]
    fn test_letters_only() {
        assert_eq!(parse_cell_ref("C").unwrap(), CellAddress::new(0, 3));
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(parse_cell_ref("42").unwrap(), CellAddress::new(42, 0));
    }

    #[test]
    fn test_order_is_not_validated() {
        // 数字と文字が混在しても、出現順に累積される
        assert_eq!(parse_cell_ref("1A2").unwrap(), CellAddress::new(12, 1));
    }

    #[test]
    fn test_empty_ref() {
        assert_eq!(parse_cell_ref("").unwrap(), CellAddress::new(0, 0));
    }

    #[test]
    fn test_invalid_characters() {
        for (reference, bad) in [("a1", 'a'), ("$A$1", '$'), ("A 1", ' '), ("Ａ1", 'Ａ')] {
            match parse_cell_ref(reference) {
                Err(XlsxScanError::InvalidCellRef {
                    character,
                    reference: r,
                }) => {
                    assert_eq!(character, bad);
                    assert_eq!(r, reference);
                }
                other => panic!("Expected InvalidCellRef for {:?}, got {:?}", reference, other),
            }
        }
    }

    #[test]
    fn test_first_invalid_character_is_reported() {
        match parse_cell_ref("A-1:b") {
            Err(XlsxScanError::InvalidCellRef { character, .. }) => assert_eq!(character, '-'),
            other => panic!("Expected InvalidCellRef, got {:?}", other),
        }
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse_cell_ref("A99999999999"),
            Err(XlsxScanError::CellRefOverflow { .. })
        ));
        assert!(matches!(
            parse_cell_ref("ZZZZZZZZ1"),
            Err(XlsxScanError::CellRefOverflow { .. })
        ));
    }
}
