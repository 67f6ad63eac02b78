//! Format Module
//!
//! Excel Number Format Stringの構文解析と、日付書式の判定を提供します。

mod builtin;
mod parser;
mod sections;
mod tokens;

pub(crate) use builtin::{builtin_format, is_builtin_date_id};
pub(crate) use parser::NumberFormat;
