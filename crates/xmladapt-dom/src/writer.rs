//! Serialization of [`Document`] trees back to XML text.

use crate::types::NodeData;
use crate::{Document, DomError, NodeId, NodeKind, Result};
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use std::collections::BTreeSet;

impl Document {
    /// Serialize the whole document (without an XML declaration).
    ///
    /// ```rust
    /// use xmladapt_dom::Document;
    ///
    /// let doc = Document::parse(r#"<root a="1"><child>text</child></root>"#).unwrap();
    /// assert_eq!(doc.to_xml().unwrap(), r#"<root a="1"><child>text</child></root>"#);
    /// ```
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for &child in self.children(self.document_node()) {
            self.write_node(&mut writer, child, &[])?;
        }
        into_string(writer)
    }

    /// Serialize a single node.
    ///
    /// Elements are written as a standalone fragment: declarations for
    /// prefixes that are bound on ancestors are added to the fragment root.
    /// Attributes are written as `name="value"`; text nodes as escaped text.
    pub fn node_to_xml(&self, id: NodeId) -> Result<String> {
        match self.kind(id) {
            NodeKind::Document => self.to_xml(),
            NodeKind::Attribute => {
                let name = self.name(id).map(|n| n.qualified()).unwrap_or_default();
                let value = self.attribute_value(id).unwrap_or_default();
                Ok(format!("{}=\"{}\"", name, escape(value)))
            }
            _ => {
                let inherited = self.inherited_declarations(id);
                let mut writer = Writer::new(Vec::new());
                self.write_node(&mut writer, id, &inherited)?;
                into_string(writer)
            }
        }
    }

    /// Declarations needed by prefixes used in the subtree at `id` that are
    /// bound outside of it.
    fn inherited_declarations(&self, id: NodeId) -> Vec<(Option<String>, String)> {
        let Some(parent) = self.parent(id).filter(|&p| self.kind(p) == NodeKind::Element) else {
            return Vec::new();
        };

        let mut used = BTreeSet::new();
        self.collect_prefixes(id, &mut used);

        let own = self.namespace_declarations(id);
        used.into_iter()
            .filter(|prefix| prefix.as_deref() != Some("xml"))
            .filter(|prefix| !own.iter().any(|d| &d.prefix == prefix))
            .filter_map(|prefix| {
                let uri = self.lookup_namespace(parent, prefix.as_deref())?;
                (prefix.is_some() || !uri.is_empty()).then_some((prefix, uri))
            })
            .collect()
    }

    fn collect_prefixes(&self, id: NodeId, used: &mut BTreeSet<Option<String>>) {
        if let Some(name) = self.name(id) {
            used.insert(name.prefix.clone());
        }
        for &attr in self.attributes(id) {
            if let Some(prefix) = self.name(attr).and_then(|n| n.prefix.clone()) {
                used.insert(Some(prefix));
            }
        }
        for &child in self.children(id) {
            if self.kind(child) == NodeKind::Element {
                self.collect_prefixes(child, used);
            }
        }
    }

    fn write_node(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: NodeId,
        extra_declarations: &[(Option<String>, String)],
    ) -> Result<()> {
        match self.data(id) {
            NodeData::Element(data) => {
                let qualified = data.name.qualified();
                let mut start = BytesStart::new(qualified.as_str());

                for (prefix, uri) in extra_declarations {
                    let key = xmlns_key(prefix.as_deref());
                    start.push_attribute((key.as_str(), uri.as_str()));
                }
                for decl in &data.namespaces {
                    let key = xmlns_key(decl.prefix.as_deref());
                    start.push_attribute((key.as_str(), decl.uri.as_str()));
                }
                for &attr in &data.attributes {
                    if let Some(name) = self.name(attr) {
                        let key = name.qualified();
                        let value = self.attribute_value(attr).unwrap_or_default();
                        start.push_attribute((key.as_str(), value));
                    }
                }

                let children = self.children(id);
                if children.is_empty() {
                    write(writer, Event::Empty(start))?;
                } else {
                    write(writer, Event::Start(start))?;
                    for &child in children {
                        self.write_node(writer, child, &[])?;
                    }
                    write(writer, Event::End(BytesEnd::new(qualified.as_str())))?;
                }
                Ok(())
            }
            NodeData::Text(text) => write(writer, Event::Text(BytesText::new(text))),
            NodeData::CData(text) => write(writer, Event::CData(BytesCData::new(text.as_str()))),
            NodeData::Comment(text) => {
                write(writer, Event::Comment(BytesText::from_escaped(text.as_str())))
            }
            NodeData::Attribute(_) | NodeData::Document => Ok(()),
        }
    }
}

fn xmlns_key(prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("xmlns:{}", prefix),
        None => "xmlns".to_string(),
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|err| DomError::Write {
        message: err.to_string(),
    })
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|err| DomError::Write {
        message: err.to_string(),
    })
}
