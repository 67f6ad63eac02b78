//! Workbook Module
//!
//! ワークブックレベルの情報（アーカイブのパスと日付スタイル集合）を保持し、
//! ワークシートのデコードに必要なハンドルを提供します。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::archive::ZipArchiveReader;
use crate::builder::ReaderConfig;
use crate::error::XlsxScanError;
use crate::format::{builtin_format, is_builtin_date_id, NumberFormat};
use crate::parser::Worksheet;
use crate::types::{CellRecord, DateStyleSet};

const STYLES_PATH: &str = "xl/styles.xml";

/// ワークブックハンドル
///
/// アーカイブのパスと、`xl/styles.xml`から計算された日付スタイル集合を保持します。
/// 日付スタイル集合はワークブックの生存期間中不変で、ワークシートには借用として渡されます。
#[derive(Debug, Clone)]
pub struct Workbook {
    path: PathBuf,
    date_styles: DateStyleSet,
    config: ReaderConfig,
}

impl Workbook {
    /// デフォルト設定でワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(Workbook)` - アーカイブとスタイル情報の読み込みに成功した場合
    /// * `Err(XlsxScanError)` - アーカイブが開けない、または`styles.xml`が不正な場合
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, XlsxScanError> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    pub(crate) fn open_with_config<P: AsRef<Path>>(
        path: P,
        config: ReaderConfig,
    ) -> Result<Self, XlsxScanError> {
        let path = path.as_ref().to_path_buf();
        let reader = ZipArchiveReader::new(config.security);

        let mut archive = reader.open_archive(&path)?;
        let date_styles = match reader.read_entry(&mut archive, STYLES_PATH)? {
            Some(styles_xml) => parse_date_styles(&styles_xml)?,
            // styles.xmlが存在しない場合、日付スタイルはない
            None => DateStyleSet::new(),
        };

        log::debug!(
            "opened workbook '{}' ({} date styles)",
            path.display(),
            date_styles.len()
        );

        Ok(Self {
            path,
            date_styles,
            config,
        })
    }

    /// 別途計算された日付スタイル集合からワークブックハンドルを構築
    ///
    /// アーカイブはワークシートを開くまで読み込まれません。
    pub fn with_date_styles<P: AsRef<Path>>(path: P, date_styles: DateStyleSet) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            date_styles,
            config: ReaderConfig::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn date_styles(&self) -> &DateStyleSet {
        &self.date_styles
    }

    pub(crate) fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// ワークシートを開く（例: `"sheet1"` -> `xl/worksheets/sheet1.xml`）
    pub fn worksheet(&self, sheet: &str) -> Result<Worksheet<'_>, XlsxScanError> {
        Worksheet::open(self, sheet)
    }

    /// 複数のワークシートを並列にデコード
    ///
    /// 各ワークシートは独立して読み込まれます。結果は引数と同じ順序で返されます。
    pub fn scan_sheets<S: AsRef<str> + Sync>(
        &self,
        sheets: &[S],
    ) -> Vec<Result<Vec<CellRecord>, XlsxScanError>> {
        sheets
            .par_iter()
            .map(|sheet| self.worksheet(sheet.as_ref())?.records())
            .collect()
    }
}

/// `xl/styles.xml`から日付スタイル集合を計算
///
/// `<cellXfs>`内のi番目の`<xf>`の`numFmtId`が日付書式を指す場合、
/// インデックスiを集合に加えます。
pub(crate) fn parse_date_styles(styles_xml: &[u8]) -> Result<DateStyleSet, XlsxScanError> {
    let (num_formats, xf_format_ids) = parse_styles(styles_xml)?;

    let date_styles: DateStyleSet = xf_format_ids
        .iter()
        .enumerate()
        .filter(|(_, id)| is_date_format(**id, &num_formats))
        .map(|(index, _)| index as u32)
        .collect();

    log::debug!(
        "{} of {} cell styles use a date format",
        date_styles.len(),
        xf_format_ids.len()
    );

    Ok(date_styles)
}

/// 書式IDが日付・時刻書式かどうか
///
/// `<numFmts>`で定義された書式を優先し、なければビルトイン書式で判定します。
fn is_date_format(num_fmt_id: u32, num_formats: &HashMap<u32, String>) -> bool {
    match num_formats.get(&num_fmt_id) {
        Some(code) => NumberFormat::parse(code).is_datetime(),
        None => {
            is_builtin_date_id(num_fmt_id)
                || builtin_format(num_fmt_id)
                    .is_some_and(|code| NumberFormat::parse(code).is_datetime())
        }
    }
}

/// `<numFmts>`と`<cellXfs>`を解析
///
/// 戻り値は（numFmtId -> formatCode, cellXfsの順に並んだnumFmtId）です。
fn parse_styles(styles_xml: &[u8]) -> Result<(HashMap<u32, String>, Vec<u32>), XlsxScanError> {
    let mut reader = Reader::from_reader(styles_xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut num_formats = HashMap::new();
    let mut xf_format_ids = Vec::new();
    let mut in_num_fmts = false;
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"numFmts" => in_num_fmts = true,
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" if in_num_fmts => read_num_fmt(&e, &mut num_formats)?,
                b"xf" if in_cell_xfs => xf_format_ids.push(read_xf_num_fmt_id(&e)?),
                _ => {}
            },
            // <numFmt numFmtId="165" formatCode="0.000"/>, <xf numFmtId="14" .../>
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" if in_num_fmts => read_num_fmt(&e, &mut num_formats)?,
                b"xf" if in_cell_xfs => xf_format_ids.push(read_xf_num_fmt_id(&e)?),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"numFmts" => in_num_fmts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxScanError::Xml(format!("styles.xml: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok((num_formats, xf_format_ids))
}

fn read_num_fmt(
    e: &BytesStart<'_>,
    num_formats: &mut HashMap<u32, String>,
) -> Result<(), XlsxScanError> {
    let mut id = None;
    let mut code = None;

    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"numFmtId" => id = parse_id(&attr.unescape_value()?),
            b"formatCode" => code = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    if let (Some(id), Some(code)) = (id, code) {
        num_formats.insert(id, code);
    }
    Ok(())
}

fn read_xf_num_fmt_id(e: &BytesStart<'_>) -> Result<u32, XlsxScanError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"numFmtId" {
            return Ok(parse_id(&attr.unescape_value()?).unwrap_or(0));
        }
    }
    // numFmtId省略時は0（General）
    Ok(0)
}

fn parse_id(value: &str) -> Option<u32> {
    let id = value.trim().parse().ok();
    if id.is_none() {
        log::warn!("ignoring malformed numFmtId '{}'", value);
    }
    id
}
