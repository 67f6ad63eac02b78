//! NumberFormat Module
//!
//! Excel Number Format Stringの構文解析を提供します。
//! 値のフォーマットは行わず、書式が日付・時刻を表すかどうかの判定にのみ使用します。

use super::sections::{FormatSection, SectionKind};
use super::tokens::FormatToken;

/// 解析済みのNumber Format String
#[derive(Debug, Clone)]
pub(crate) struct NumberFormat {
    /// パースされたセクション
    sections: Vec<FormatSection>,
}

impl NumberFormat {
    /// フォーマット文字列をパース
    ///
    /// 未知の文字はリテラルとして扱うため、パースは失敗しません。
    pub fn parse(format_string: &str) -> Self {
        let sections = Self::split_sections(format_string)
            .iter()
            .enumerate()
            .map_while(|(idx, section_str)| {
                SectionKind::from_index(idx).map(|kind| Self::parse_section(section_str, kind))
            })
            .collect();

        Self { sections }
    }

    /// いずれかの数値セクションが日付・時刻書式かどうか
    ///
    /// テキストセクション（4番目）は文字列セルにのみ適用されるため判定に含めません。
    pub fn is_datetime(&self) -> bool {
        self.sections
            .iter()
            .filter(|s| s.kind != SectionKind::Text)
            .any(|s| s.is_datetime())
    }

    /// セクションに分割
    ///
    /// ';'で分割します。引用符内、ブラケット内、エスケープされた';'は区切りとしません。
    fn split_sections(format_string: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_brackets = false;
        let mut chars = format_string.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '"' if !in_brackets => in_quotes = !in_quotes,
                '[' if !in_quotes => in_brackets = true,
                ']' if !in_quotes => in_brackets = false,
                '\\' if !in_quotes => {
                    current.push(ch);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    continue;
                }
                ';' if !in_quotes && !in_brackets => {
                    sections.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }

        if !current.is_empty() {
            sections.push(current);
        }

        sections
    }

    /// セクションをトークン列に変換
    fn parse_section(section_str: &str, kind: SectionKind) -> FormatSection {
        let mut section = FormatSection::new(kind);
        let mut chars = section_str.chars().peekable();

        while let Some(ch) = chars.next() {
            let next = chars.peek().copied();
            let token = match ch {
                '"' => {
                    let literal: String = chars.by_ref().take_while(|&c| c != '"').collect();
                    FormatToken::Literal(literal)
                }
                '\\' => match chars.next() {
                    Some(escaped) => FormatToken::Literal(escaped.to_string()),
                    None => continue,
                },
                // "_x"は文字幅分の空白、"*x"は繰り返し文字
                '_' | '*' => {
                    chars.next();
                    continue;
                }
                '[' => {
                    let content: String = chars.by_ref().take_while(|&c| c != ']').collect();
                    if Self::is_elapsed(&content) {
                        FormatToken::Elapsed
                    } else {
                        FormatToken::Bracket(content)
                    }
                }
                '@' => FormatToken::TextPlaceholder,
                '0' | '#' | '?' => FormatToken::Digit,
                // 指数表記は桁プレースホルダーの後のみ（単独の"e-"は和暦の年）
                'E' | 'e'
                    if next.is_some_and(|c| c == '+' || c == '-')
                        && section.tokens.contains(&FormatToken::Digit) =>
                {
                    FormatToken::Literal(ch.to_string())
                }
                'A' | 'a' => {
                    if Self::consume_ampm(&mut chars) {
                        FormatToken::Literal("AM/PM".to_string())
                    } else {
                        FormatToken::Literal(ch.to_string())
                    }
                }
                // "e"は和暦の年、"g"は元号、"b"は仏暦の年
                'g' | 'G' => {
                    if Self::consume_general(&mut chars) {
                        FormatToken::Literal("General".to_string())
                    } else {
                        Self::skip_run(&mut chars, ch);
                        FormatToken::Year
                    }
                }
                'y' | 'Y' | 'e' | 'b' | 'B' => {
                    Self::skip_run(&mut chars, ch);
                    FormatToken::Year
                }
                'd' | 'D' => {
                    Self::skip_run(&mut chars, ch);
                    FormatToken::Day
                }
                'h' | 'H' => {
                    Self::skip_run(&mut chars, ch);
                    FormatToken::Hour
                }
                's' | 'S' => {
                    Self::skip_run(&mut chars, ch);
                    FormatToken::Second
                }
                'm' | 'M' => {
                    Self::skip_run(&mut chars, ch);
                    let after_hour = section
                        .tokens
                        .iter()
                        .rev()
                        .find(|t| t.is_datetime())
                        .is_some_and(|t| matches!(t, FormatToken::Hour | FormatToken::Elapsed));
                    let before_seconds = chars.peek() == Some(&':');
                    if after_hour || before_seconds {
                        FormatToken::Minute
                    } else {
                        FormatToken::Month
                    }
                }
                _ => FormatToken::Literal(ch.to_string()),
            };
            section.tokens.push(token);
        }

        section
    }

    /// "[h]", "[mm]", "[ss]"のような経過時間指定かどうか
    fn is_elapsed(content: &str) -> bool {
        let lower = content.to_ascii_lowercase();
        !lower.is_empty()
            && (lower.chars().all(|c| c == 'h')
                || lower.chars().all(|c| c == 'm')
                || lower.chars().all(|c| c == 's'))
    }

    /// 同じ文字（大文字小文字を区別しない）の連続を読み飛ばす
    fn skip_run<I>(chars: &mut std::iter::Peekable<I>, first: char)
    where
        I: Iterator<Item = char>,
    {
        while chars
            .peek()
            .is_some_and(|c| c.eq_ignore_ascii_case(&first))
        {
            chars.next();
        }
    }

    /// 先頭の"A"に続く"M/PM"または"/P"を読み進める
    fn consume_ampm<I>(chars: &mut std::iter::Peekable<I>) -> bool
    where
        I: Iterator<Item = char> + Clone,
    {
        let rest: String = chars.clone().take(4).collect::<String>().to_ascii_uppercase();
        let len = if rest.starts_with("M/PM") {
            4
        } else if rest.starts_with("/P") {
            2
        } else {
            return false;
        };
        for _ in 0..len {
            chars.next();
        }
        true
    }

    /// 先頭の"G"に続く"eneral"を読み進める
    fn consume_general<I>(chars: &mut std::iter::Peekable<I>) -> bool
    where
        I: Iterator<Item = char> + Clone,
    {
        let rest: String = chars.clone().take(6).collect();
        if !rest.eq_ignore_ascii_case("eneral") {
            return false;
        }
        for _ in 0..6 {
            chars.next();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_date(code: &str) -> bool {
        NumberFormat::parse(code).is_datetime()
    }

    #[test]
    fn test_split_sections() {
        let sections = NumberFormat::split_sections("0.00;[Red]-0.00;\"zero;\";@");
        assert_eq!(sections, vec!["0.00", "[Red]-0.00", "\"zero;\"", "@"]);
    }

    #[test]
    fn test_date_formats() {
        assert!(is_date("yyyy-mm-dd"));
        assert!(is_date("mm-dd-yy"));
        assert!(is_date("d-mmm-yy"));
        assert!(is_date("m/d/yy h:mm"));
        assert!(is_date("YYYY/MM/DD"));
        assert!(is_date("[$-409]mmmm d, yyyy;@"));
    }

    #[test]
    fn test_time_formats() {
        assert!(is_date("h:mm AM/PM"));
        assert!(is_date("hh:mm:ss"));
        assert!(is_date("mm:ss.0"));
        assert!(is_date("[h]:mm:ss"));
        assert!(is_date("[mm]"));
    }

    #[test]
    fn test_japanese_era_formats() {
        assert!(is_date("[$-411]ggge\"年\"m\"月\"d\"日\""));
        assert!(is_date("yyyy\"年\"m\"月\"d\"日\""));
    }

    #[test]
    fn test_numeric_formats() {
        assert!(!is_date("General"));
        assert!(!is_date("0"));
        assert!(!is_date("0.00"));
        assert!(!is_date("#,##0.00"));
        assert!(!is_date("0.00%"));
        assert!(!is_date("0.00E+00"));
        assert!(!is_date("##0.0E+0"));
        assert!(!is_date("# ??/??"));
        assert!(!is_date("@"));
        assert!(!is_date("$#,##0_);[Red]($#,##0)"));
        assert!(!is_date("_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"));
    }

    #[test]
    fn test_quoted_and_escaped_letters_are_literal() {
        assert!(!is_date("0 \"days\""));
        assert!(!is_date("0\\d"));
        assert!(!is_date("#,##0 \"mm\""));
        assert!(!is_date("[Red]0.00"));
        assert!(!is_date("[Blue]#,##0;[Red]-#,##0"));
    }

    #[test]
    fn test_empty_format() {
        assert!(!is_date(""));
    }

    #[test]
    fn test_era_year_before_sign() {
        assert!(is_date("[$-411]e-0"));
        assert!(is_date("e+m"));
        assert!(!is_date("0.00e+00"));
        assert!(!is_date("##0.0E-0"));
    }

    #[test]
    fn test_text_section_is_ignored() {
        assert!(!is_date("0;-0;0;@ d"));
        assert!(is_date("0;yyyy-mm-dd;0;@"));
    }

    #[test]
    fn test_month_minute_disambiguation() {
        let format = NumberFormat::parse("h:mm");
        assert_eq!(
            format.sections[0].tokens,
            vec![
                FormatToken::Hour,
                FormatToken::Literal(":".to_string()),
                FormatToken::Minute
            ]
        );

        let format = NumberFormat::parse("yyyy-mm");
        assert_eq!(format.sections[0].tokens.last(), Some(&FormatToken::Month));
    }
}
