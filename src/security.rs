//! Security Module
//!
//! アーカイブ読み込み時のセキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃とパストラバーサル攻撃への対策を提供します。

/// セキュリティ設定
///
/// アーカイブからエントリを取り出す際の制限を定義します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 単一エントリの展開後の最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_entry_size: u64,
    /// ZIPアーカイブ内の最大エントリ数
    /// デフォルト: 10000
    pub max_entry_count: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_entry_size: 104_857_600, // 100MB
            max_entry_count: 10_000,
        }
    }
}

/// アーカイブ内パスの検証
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - 空、絶対パス、`..`、`\`を含む場合
pub(crate) fn validate_entry_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // Unix形式の`/`やWindowsのドライブ指定（`C:`）で始まるパス
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

/// シート識別子の検証
///
/// シート識別子は`xl/worksheets/<sheet>.xml`の1要素としてのみ使用されるため、
/// パス区切り文字を含んではなりません。
pub(crate) fn validate_sheet_id(sheet: &str) -> Result<(), String> {
    if sheet.is_empty() {
        return Err("Empty sheet identifier is not allowed".to_string());
    }
    if sheet.contains('/') || sheet.contains('\\') || sheet == ".." || sheet == "." {
        return Err(format!("Sheet identifier must be a file name: {}", sheet));
    }
    Ok(())
}
