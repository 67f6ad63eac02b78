//! Worksheet Traversal
//!
//! 1つのワークシートXMLを読み込み、`<sheetData>`内の行・セルを文書順に走査して
//! セル座標とセル種類のレコードを生成します。
//!
//! 参照: ECMA-376 第4版
//! - 18.3.1.73 row (Row)
//! - 18.3.1.4  c   (Cell)

use crate::archive::{ArchiveReader, ZipArchiveReader};
use crate::builder::InvalidRefPolicy;
use crate::error::XlsxScanError;
use crate::markup::{parse_markup, MarkupNode, XmlElement};
use crate::parser::address::parse_cell_ref;
use crate::parser::cell_type::resolve_cell_kind;
use crate::parser::Workbook;
use crate::security::validate_sheet_id;
use crate::types::{CellRecord, DateStyleSet, Diagnostic};

const WORKSHEET: &str = "worksheet";
const SHEET_DATA: &str = "sheetData";
const ROW: &str = "row";
const CELL: &str = "c";

/// ワークシートのパスを構築（例: `"sheet1"` -> `"xl/worksheets/sheet1.xml"`）
pub fn worksheet_path(sheet: &str) -> String {
    format!("xl/worksheets/{}.xml", sheet)
}

/// デコード可能なワークシート
///
/// 構築時に`<worksheet>`と`<sheetData>`の存在を検証します。構築後は読み取り専用で、
/// [`cells`](Worksheet::cells)は何度呼び出しても同じ列を返します。
///
/// マークアップツリーはこの構造体が所有し、日付スタイル集合はワークブックから借用します。
#[derive(Debug)]
pub struct Worksheet<'a, N: MarkupNode = XmlElement> {
    document: N,
    date_styles: &'a DateStyleSet,
    policy: InvalidRefPolicy,
    path: String,
}

impl<'a> Worksheet<'a, XmlElement> {
    /// ワークブックからワークシートを開く
    ///
    /// # 引数
    ///
    /// * `workbook` - ワークブックハンドル
    /// * `sheet` - シート識別子（例: `"sheet1"`）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Worksheet)` - 読み込みと構造検証に成功した場合
    /// * `Err(XlsxScanError)` - アーカイブ・XML・構造エラーの場合（セルは一切デコードされない）
    pub fn open(workbook: &'a Workbook, sheet: &str) -> Result<Self, XlsxScanError> {
        let reader = ZipArchiveReader::new(workbook.config().security);
        Self::open_with(workbook, sheet, &reader)
    }

    /// 任意の[`ArchiveReader`]を使用してワークシートを開く
    pub fn open_with<A: ArchiveReader>(
        workbook: &'a Workbook,
        sheet: &str,
        archive: &A,
    ) -> Result<Self, XlsxScanError> {
        validate_sheet_id(sheet).map_err(XlsxScanError::SecurityViolation)?;

        let path = worksheet_path(sheet);
        log::debug!(
            "reading worksheet '{}' from '{}'",
            path,
            workbook.path().display()
        );

        let bytes = archive.fetch(workbook.path(), &path)?;
        let document = parse_markup(&bytes)?;

        Self::build(
            document,
            workbook.date_styles(),
            workbook.config().invalid_ref_policy,
            path,
        )
    }
}

impl<'a, N: MarkupNode> Worksheet<'a, N> {
    /// 解析済みのマークアップツリーからワークシートを構築
    ///
    /// `document`はドキュメントノード（子要素に`<worksheet>`を持つノード）です。
    pub fn from_markup(
        document: N,
        date_styles: &'a DateStyleSet,
        policy: InvalidRefPolicy,
    ) -> Result<Self, XlsxScanError> {
        Self::build(document, date_styles, policy, String::from("<memory>"))
    }

    fn build(
        document: N,
        date_styles: &'a DateStyleSet,
        policy: InvalidRefPolicy,
        path: String,
    ) -> Result<Self, XlsxScanError> {
        let root = document
            .first_child(WORKSHEET)
            .ok_or_else(|| XlsxScanError::MissingElement {
                element: WORKSHEET.to_string(),
                path: path.clone(),
            })?;

        if root.first_child(SHEET_DATA).is_none() {
            return Err(XlsxScanError::MissingElement {
                element: SHEET_DATA.to_string(),
                path,
            });
        }

        Ok(Self {
            document,
            date_styles,
            policy,
            path,
        })
    }

    /// アーカイブ内のパス（メモリ上のツリーから構築した場合は`"<memory>"`）
    pub fn path(&self) -> &str {
        &self.path
    }

    fn sheet_data(&self) -> Option<&N> {
        self.document
            .first_child(WORKSHEET)
            .and_then(|root| root.first_child(SHEET_DATA))
    }

    /// セルレコードを文書順に走査
    ///
    /// 外側は`<row>`の順、内側は`<c>`の順です。イテレータは遅延評価で、
    /// 呼び出すたびに先頭から同じ列を生成します。
    ///
    /// `InvalidRefPolicy::Fail`の場合、不正なセル参照は`Err`として返されます。
    pub fn cells(&self) -> impl Iterator<Item = Result<CellRecord, XlsxScanError>> + '_ {
        let decoder = CellDecoder {
            date_styles: self.date_styles,
            policy: self.policy,
            path: &self.path,
        };
        self.sheet_data()
            .into_iter()
            .flat_map(|sheet_data| sheet_data.children_named(ROW))
            .flat_map(|row| row.children_named(CELL))
            .map(move |cell| decoder.decode(cell))
    }

    /// すべてのセルレコードを収集（最初のエラーで中断）
    pub fn records(&self) -> Result<Vec<CellRecord>, XlsxScanError> {
        self.cells().collect()
    }
}

/// 1セル分のデコード処理
#[derive(Clone, Copy)]
struct CellDecoder<'s> {
    date_styles: &'s DateStyleSet,
    policy: InvalidRefPolicy,
    path: &'s str,
}

impl CellDecoder<'_> {
    fn decode<N: MarkupNode>(&self, cell: &N) -> Result<CellRecord, XlsxScanError> {
        let resolution = resolve_cell_kind(cell, self.date_styles);
        let mut diagnostics = Vec::new();

        let address = match cell.attribute("r") {
            Some(reference) => match parse_cell_ref(reference) {
                Ok(address) => Some(address),
                Err(e) if self.policy == InvalidRefPolicy::Unknown => {
                    let diagnostic = match e {
                        XlsxScanError::InvalidCellRef {
                            character,
                            reference,
                        } => Diagnostic::InvalidCellRef {
                            character,
                            reference,
                        },
                        XlsxScanError::CellRefOverflow { reference } => {
                            Diagnostic::CellRefOverflow { reference }
                        }
                        other => return Err(other),
                    };
                    log::warn!("{} in '{}'", diagnostic, self.path);
                    diagnostics.push(diagnostic);
                    None
                }
                Err(e) => return Err(e),
            },
            None => {
                log::warn!("cell without reference in '{}'", self.path);
                diagnostics.push(Diagnostic::MissingCellRef);
                None
            }
        };

        diagnostics.extend(resolution.diagnostic);

        Ok(CellRecord {
            address,
            kind: resolution.kind,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellAddress, CellKind};

    fn sheet(xml: &str) -> XmlElement {
        parse_markup(xml.as_bytes()).unwrap()
    }

    fn date_styles() -> DateStyleSet {
        [1].into_iter().collect()
    }

    #[test]
    fn test_worksheet_path() {
        assert_eq!(worksheet_path("sheet1"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_two_rows_in_order_and_restartable() {
        let doc = sheet(
            r#"<worksheet><sheetData>
                 <row r="1"><c r="B1"><v>1</v></c></row>
                 <row r="2"><c r="B2" t="s"><v>0</v></c></row>
               </sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();

        let expected = vec![
            CellRecord::new(Some(CellAddress::new(1, 2)), CellKind::Numeric),
            CellRecord::new(Some(CellAddress::new(2, 2)), CellKind::Text),
        ];
        assert_eq!(ws.records().unwrap(), expected);
        // 2回目の走査でも同じ列
        assert_eq!(ws.records().unwrap(), expected);
        assert_eq!(ws.cells().count(), 2);
    }

    #[test]
    fn test_date_cell() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c r="A1" s="1"><v>45000</v></c><c r="B1" s="2"><v>3</v></c></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();
        let kinds: Vec<_> = ws.records().unwrap().into_iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![CellKind::Date, CellKind::Numeric]);
    }

    #[test]
    fn test_missing_worksheet_root() {
        let styles = date_styles();
        let result = Worksheet::from_markup(
            sheet("<chartsheet/>"),
            &styles,
            InvalidRefPolicy::Fail,
        );
        match result {
            Err(XlsxScanError::MissingElement { element, .. }) => assert_eq!(element, "worksheet"),
            other => panic!("Expected MissingElement, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_sheet_data() {
        let styles = date_styles();
        let result = Worksheet::from_markup(
            sheet(r#"<worksheet><dimension ref="A1"/></worksheet>"#),
            &styles,
            InvalidRefPolicy::Fail,
        );
        match result {
            Err(XlsxScanError::MissingElement { element, .. }) => assert_eq!(element, "sheetData"),
            other => panic!("Expected MissingElement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_sheet_data() {
        let styles = date_styles();
        let ws = Worksheet::from_markup(
            sheet("<worksheet><sheetData/></worksheet>"),
            &styles,
            InvalidRefPolicy::Fail,
        )
        .unwrap();
        assert_eq!(ws.cells().count(), 0);
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let doc = sheet(
            r#"<worksheet><sheetData><row r="1"/><row r="2"><c r="C2" t="str"/></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();
        let records = ws.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, Some(CellAddress::new(2, 3)));
        assert_eq!(records[0].kind, CellKind::Text);
    }

    #[test]
    fn test_missing_reference_is_unknown() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c t="s"/><c r="B1"/></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();
        let records = ws.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, None);
        assert_eq!(records[0].kind, CellKind::Text);
        assert_eq!(records[0].diagnostics, vec![Diagnostic::MissingCellRef]);
        assert_eq!(records[1].address, Some(CellAddress::new(1, 2)));
        assert!(records[1].diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_reference_fails_by_default() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c r="A1"/><c r="b2"/><c r="C3"/></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();

        let items: Vec<_> = ws.cells().collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(XlsxScanError::InvalidCellRef {
                character,
                reference,
            }) => {
                assert_eq!(*character, 'b');
                assert_eq!(reference, "b2");
            }
            other => panic!("Expected InvalidCellRef, got {:?}", other),
        }
        assert!(items[2].is_ok());
        assert!(ws.records().is_err());
    }

    #[test]
    fn test_invalid_reference_lenient_policy() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c r="A$1" t="s"/></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Unknown).unwrap();
        let records = ws.records().unwrap();
        assert_eq!(records[0].address, None);
        assert_eq!(records[0].kind, CellKind::Text);
        assert_eq!(
            records[0].diagnostics,
            vec![Diagnostic::InvalidCellRef {
                character: '$',
                reference: "A$1".to_string(),
            }]
        );
    }

    #[test]
    fn test_overflowing_reference_lenient_policy() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c r="A1"/><c r="A99999999999" t="s"/><c r="B1"/></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Unknown).unwrap();

        let records = ws.records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].address, Some(CellAddress::new(1, 1)));
        assert_eq!(records[1].address, None);
        assert_eq!(records[1].kind, CellKind::Text);
        assert_eq!(
            records[1].diagnostics,
            vec![Diagnostic::CellRefOverflow {
                reference: "A99999999999".to_string(),
            }]
        );
        assert_eq!(records[2].address, Some(CellAddress::new(1, 2)));
    }

    #[test]
    fn test_overflowing_reference_fails_by_default() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c r="A99999999999"/><c r="B1"/></row></sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();

        let items: Vec<_> = ws.cells().collect();
        assert!(matches!(
            items[0],
            Err(XlsxScanError::CellRefOverflow { .. })
        ));
        assert!(items[1].is_ok());
    }

    #[test]
    fn test_unknown_type_diagnostic_per_cell() {
        let doc = sheet(
            r#"<worksheet><sheetData>
                 <row><c r="A1" t="inlineStr"><is><t>x</t></is></c><c r="B1"/></row>
                 <row><c r="A2" t="inlineStr"><is><t>y</t></is></c></row>
               </sheetData></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();
        let records = ws.records().unwrap();

        let counts: Vec<usize> = records.iter().map(|r| r.diagnostics.len()).collect();
        assert_eq!(counts, vec![1, 0, 1]);
        assert!(records.iter().all(|r| r.kind == CellKind::Numeric));
    }

    #[test]
    fn test_non_cell_children_are_ignored() {
        let doc = sheet(
            r#"<worksheet><sheetData><row><c r="A1"/><extLst/><c r="B1"/></row></sheetData><mergeCells/></worksheet>"#,
        );
        let styles = date_styles();
        let ws = Worksheet::from_markup(doc, &styles, InvalidRefPolicy::Fail).unwrap();
        assert_eq!(ws.cells().count(), 2);
        assert_eq!(ws.path(), "<memory>");
    }
}
