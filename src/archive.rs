//! Archive Reader Module
//!
//! XLSXファイル（ZIPアーカイブ）から指定されたエントリのバイト列を取り出すモジュール。

use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::XlsxScanError;
use crate::security::{validate_entry_path, SecurityConfig};

/// アーカイブからエントリを取り出すインターフェース
pub trait ArchiveReader {
    /// `archive_path`のアーカイブから`inner_path`のエントリを読み込む
    ///
    /// アーカイブが開けない場合、またはエントリが存在しない場合はエラーを返します。
    fn fetch(&self, archive_path: &Path, inner_path: &str) -> Result<Vec<u8>, XlsxScanError>;
}

/// `zip`クレートによる[`ArchiveReader`]の実装
#[derive(Debug, Clone, Default)]
pub struct ZipArchiveReader {
    security: SecurityConfig,
}

impl ZipArchiveReader {
    pub fn new(security: SecurityConfig) -> Self {
        Self { security }
    }

    /// 開いているアーカイブからエントリを読み込む
    ///
    /// エントリが存在しない場合は`Ok(None)`を返します。
    pub(crate) fn read_entry<R: Read + std::io::Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        inner_path: &str,
    ) -> Result<Option<Vec<u8>>, XlsxScanError> {
        validate_entry_path(inner_path).map_err(|e| {
            XlsxScanError::SecurityViolation(format!("Invalid entry path: {}", e))
        })?;

        let mut file = match archive.by_name(inner_path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(XlsxScanError::Zip(format!("{}", e))),
        };

        let size = file.size();
        if size > self.security.max_entry_size {
            return Err(XlsxScanError::SecurityViolation(format!(
                "Entry '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                inner_path, size, self.security.max_entry_size
            )));
        }

        // 宣言サイズを信用せず、上限+1バイトまでしか読まない
        let mut content = Vec::with_capacity(size as usize);
        (&mut file)
            .take(self.security.max_entry_size + 1)
            .read_to_end(&mut content)?;
        if content.len() as u64 > self.security.max_entry_size {
            return Err(XlsxScanError::SecurityViolation(format!(
                "Entry '{}' exceeds maximum size when decompressed (max: {} bytes)",
                inner_path, self.security.max_entry_size
            )));
        }

        Ok(Some(content))
    }

    pub(crate) fn open_archive(&self, archive_path: &Path) -> Result<ZipArchive<File>, XlsxScanError> {
        let file = File::open(archive_path)?;
        let archive = ZipArchive::new(file).map_err(|e| XlsxScanError::Zip(format!("{}", e)))?;

        if archive.len() > self.security.max_entry_count {
            return Err(XlsxScanError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.security.max_entry_count
            )));
        }

        Ok(archive)
    }
}

impl ArchiveReader for ZipArchiveReader {
    fn fetch(&self, archive_path: &Path, inner_path: &str) -> Result<Vec<u8>, XlsxScanError> {
        let mut archive = self.open_archive(archive_path)?;
        self.read_entry(&mut archive, inner_path)?
            .ok_or_else(|| XlsxScanError::EntryNotFound {
                archive: archive_path.display().to_string(),
                entry: inner_path.to_string(),
            })
    }
}
