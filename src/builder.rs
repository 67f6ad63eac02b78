//! Builder Module
//!
//! Fluent Builder APIを提供し、`Reader`インスタンスを段階的に構築する。

use std::path::Path;

use crate::error::XlsxScanError;
use crate::parser::Workbook;
use crate::security::SecurityConfig;

/// 不正なセル参照の処理方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum InvalidRefPolicy {
    /// 該当セルを`Err`として返す（デフォルト）
    ///
    /// 走査自体は継続できますが、`Worksheet::records()`は最初のエラーで中断します。
    #[default]
    Fail,

    /// 座標不明のレコードとして返し、診断情報を添付する
    Unknown,
}

/// 読み込み設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct ReaderConfig {
    /// 不正なセル参照の処理方針
    pub invalid_ref_policy: InvalidRefPolicy,

    /// アーカイブのセキュリティ制限
    pub security: SecurityConfig,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxscan::{InvalidRefPolicy, ReaderBuilder};
///
/// # fn main() -> Result<(), xlsxscan::XlsxScanError> {
/// let reader = ReaderBuilder::new()
///     .with_invalid_ref_policy(InvalidRefPolicy::Unknown)
///     .with_max_entry_size(16 * 1024 * 1024)
///     .build()?;
/// let workbook = reader.open_workbook("book.xlsx")?;
/// for record in workbook.worksheet("sheet1")?.cells() {
///     println!("{}", record?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    /// 内部設定（構築中）
    config: ReaderConfig,
}

impl ReaderBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 不正なセル参照: エラー
    /// - エントリサイズ上限: 100MB
    /// - エントリ数上限: 10000
    pub fn new() -> Self {
        Self::default()
    }

    /// 不正なセル参照の処理方針を指定する
    pub fn with_invalid_ref_policy(mut self, policy: InvalidRefPolicy) -> Self {
        self.config.invalid_ref_policy = policy;
        self
    }

    /// アーカイブ内の単一エントリの最大サイズ（バイト）を指定する
    pub fn with_max_entry_size(mut self, bytes: u64) -> Self {
        self.config.security.max_entry_size = bytes;
        self
    }

    /// アーカイブ内の最大エントリ数を指定する
    pub fn with_max_entry_count(mut self, count: usize) -> Self {
        self.config.security.max_entry_count = count;
        self
    }

    /// 設定を検証し、`Reader`を構築する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Reader)` - 設定が有効な場合
    /// * `Err(XlsxScanError::Config)` - 上限値が0の場合
    pub fn build(self) -> Result<Reader, XlsxScanError> {
        self.validate_config()?;
        Ok(Reader {
            config: self.config,
        })
    }

    fn validate_config(&self) -> Result<(), XlsxScanError> {
        if self.config.security.max_entry_size == 0 {
            return Err(XlsxScanError::Config(
                "max_entry_size must be greater than 0".to_string(),
            ));
        }
        if self.config.security.max_entry_count == 0 {
            return Err(XlsxScanError::Config(
                "max_entry_count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 設定済みのワークブックリーダー
#[derive(Debug, Clone)]
pub struct Reader {
    config: ReaderConfig,
}

impl Reader {
    /// ワークブックを開き、日付スタイル集合を計算する
    pub fn open_workbook<P: AsRef<Path>>(&self, path: P) -> Result<Workbook, XlsxScanError> {
        Workbook::open_with_config(path, self.config.clone())
    }

    pub fn invalid_ref_policy(&self) -> InvalidRefPolicy {
        self.config.invalid_ref_policy
    }

    pub fn security_config(&self) -> &SecurityConfig {
        &self.config.security
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build() {
        let reader = ReaderBuilder::new().build().unwrap();
        assert_eq!(reader.invalid_ref_policy(), InvalidRefPolicy::Fail);
        assert_eq!(reader.security_config(), &SecurityConfig::default());
    }

    #[test]
    fn test_with_settings() {
        let reader = ReaderBuilder::new()
            .with_invalid_ref_policy(InvalidRefPolicy::Unknown)
            .with_max_entry_size(1024)
            .with_max_entry_count(5)
            .build()
            .unwrap();
        assert_eq!(reader.invalid_ref_policy(), InvalidRefPolicy::Unknown);
        assert_eq!(reader.security_config().max_entry_size, 1024);
        assert_eq!(reader.security_config().max_entry_count, 5);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let result = ReaderBuilder::new().with_max_entry_size(0).build();
        match result {
            Err(XlsxScanError::Config(msg)) => assert!(msg.contains("max_entry_size")),
            _ => panic!("Expected Config error"),
        }

        let result = ReaderBuilder::new().with_max_entry_count(0).build();
        assert!(matches!(result, Err(XlsxScanError::Config(_))));
    }

    #[test]
    fn test_open_missing_workbook() {
        let reader = ReaderBuilder::new().build().unwrap();
        let result = reader.open_workbook("no/such/book.xlsx");
        assert!(matches!(result, Err(XlsxScanError::Io(_))));
    }
}
