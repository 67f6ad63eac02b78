//! FormatToken Module
//!
//! Excel Number Format Stringのトークン定義を提供します。

/// フォーマットトークン
///
/// 書式文字列を分類するために必要な粒度のトークンです。
/// 桁数などの表示情報は保持しません。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormatToken {
    /// 年（"y", "yyyy"）
    Year,

    /// 月（"m", "mm", "mmm"）
    Month,

    /// 日（"d", "dd", "ddd"）
    Day,

    /// 時（"h", "hh"）
    Hour,

    /// 分（時刻の文脈での"m", "mm"）
    Minute,

    /// 秒（"s", "ss"）
    Second,

    /// 経過時間（"[h]", "[mm]", "[ss]"）
    Elapsed,

    /// 数値プレースホルダー（"0", "#", "?"）
    Digit,

    /// テキストプレースホルダー（"@"）
    TextPlaceholder,

    /// リテラル（引用符内の文字列、エスケープ文字、その他の記号）
    Literal(String),

    /// ブラケット指定（色、条件、ロケール。例: "[Red]", "[>100]", "[$-409]"）
    Bracket(String),
}

impl FormatToken {
    /// トークンが日付・時刻関連かどうかを判定
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FormatToken::Year
                | FormatToken::Month
                | FormatToken::Day
                | FormatToken::Hour
                | FormatToken::Minute
                | FormatToken::Second
                | FormatToken::Elapsed
        )
    }
}
