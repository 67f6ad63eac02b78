//! Markup Tree Module
//!
//! ワークシートXMLを読み取り専用のツリーとして扱うためのモジュール。
//! トラバーサルは[`MarkupNode`]トレイトにのみ依存し、具体的なパーサー型には依存しません。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::XlsxScanError;

/// マークアップノードの読み取り専用インターフェース
///
/// 名前による子要素の検索、兄弟要素の順次走査、属性の取得のみを提供します。
pub trait MarkupNode {
    /// 要素名（ドキュメントノードの場合は空文字列）
    fn name(&self) -> &str;

    /// 属性値を取得（属性が存在しない場合は`None`、空文字列にはならない）
    fn attribute(&self, name: &str) -> Option<&str>;

    /// 指定された名前の子要素を文書順に走査
    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a;

    /// 指定された名前の最初の子要素
    fn first_child<'a>(&'a self, name: &'a str) -> Option<&'a Self> {
        self.children_named(name).next()
    }
}

/// 所有権を持つXML要素
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// 要素直下のテキスト（`trim_text`適用後）
    pub fn text(&self) -> &str {
        &self.text
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XlsxScanError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }
}

impl MarkupNode for XmlElement {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// バイト列をXMLツリーに解析
///
/// 戻り値はドキュメントノード（名前は空文字列）で、その子要素が
/// トップレベル要素（ワークシートの場合は`<worksheet>`）になります。
///
/// # 戻り値
///
/// * `Ok(XmlElement)` - 解析に成功した場合
/// * `Err(XlsxScanError::Xml)` - XMLが不正、またはタグの対応が取れていない場合
pub fn parse_markup(bytes: &[u8]) -> Result<XmlElement, XlsxScanError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut buf = Vec::new();
    // 先頭はドキュメントノード、末尾が現在開いている要素
    let mut stack = vec![XmlElement::new("")];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(XmlElement::from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Ok(Event::End(e)) => {
                if stack.len() < 2 {
                    return Err(XlsxScanError::Xml(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                if let Some(element) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape()?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e)?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XlsxScanError::Xml(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if stack.len() != 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(XlsxScanError::Xml(format!("unclosed element <{}>", open)));
    }

    Ok(stack.pop().unwrap_or_default())
}
