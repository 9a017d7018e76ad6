//! XML parser that builds [`Document`] trees.

use crate::{Document, DomError, NamespaceDecl, NodeId, NodeKind, ParseOptions, QName, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

impl Document {
    /// Parse XML from a string with default [`ParseOptions`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmladapt_dom::Document;
    ///
    /// let doc = Document::parse("<root><child/></root>").unwrap();
    /// let root = doc.document_element().unwrap();
    /// assert_eq!(doc.name(root).unwrap().local_name, "root");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed, uses an undeclared prefix,
    /// or has no (or more than one) root element.
    pub fn parse(content: &str) -> Result<Document> {
        Self::parse_with_options(content, &ParseOptions::default())
    }

    /// Parse XML from a string.
    pub fn parse_with_options(content: &str, options: &ParseOptions) -> Result<Document> {
        let mut parser = XmlParser::new(content, options);
        parser.parse()?;
        Ok(parser.doc)
    }
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    options: &'a ParseOptions,

    /// The document being built.
    doc: Document,

    /// Open elements, innermost last.
    stack: Vec<OpenElement>,
}

struct OpenElement {
    id: NodeId,
    /// Qualified name as written, for end tag matching.
    raw_name: String,
}

/// An attribute as read from the tag, before prefix resolution.
struct RawAttribute {
    prefix: Option<String>,
    local_name: String,
    value: String,
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str, options: &'a ParseOptions) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            options,
            doc: Document::new(),
            stack: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<()> {
        loop {
            let event_start = self.reader.buffer_position();

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = self.handle_start(&e)?;
                    self.stack.push(OpenElement {
                        id,
                        raw_name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    });
                }
                Ok(Event::End(e)) => {
                    let end_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    let open = self.stack.pop().ok_or_else(|| DomError::InvalidStructure {
                        message: format!("Unexpected closing tag </{}>", end_name),
                    })?;
                    if open.raw_name != end_name {
                        return Err(DomError::MismatchedEndTag {
                            expected: open.raw_name,
                            found: end_name,
                        });
                    }
                }
                Ok(Event::Empty(e)) => {
                    self.handle_start(&e)?;
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(&e, event_start)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    if let Some(parent) = self.stack.last().map(|open| open.id) {
                        let node = self.doc.create_cdata(text);
                        self.doc.append_child(parent, node)?;
                    }
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    let parent = self.current_parent();
                    let node = self.doc.create_comment(text);
                    self.doc.append_child(parent, node)?;
                }
                Ok(Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {
                    // Processing instructions, declarations and DOCTYPE are not kept
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DomError::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(DomError::UnexpectedEof {
                expected: format!("closing tag </{}>", open.raw_name),
            });
        }

        if self.doc.document_element().is_none() {
            return Err(DomError::EmptyDocument);
        }

        Ok(())
    }

    fn current_parent(&self) -> NodeId {
        self.stack
            .last()
            .map_or_else(|| self.doc.document_node(), |open| open.id)
    }

    fn handle_start(&mut self, e: &BytesStart<'_>) -> Result<NodeId> {
        let (prefix, local_name) = split_name(&String::from_utf8_lossy(e.name().as_ref()));

        let mut declarations = Vec::new();
        let mut raw_attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| DomError::XmlSyntax {
                    message: format!("Invalid attribute value: {}", err),
                    position: None,
                })?
                .into_owned();

            let (attr_prefix, attr_local) = split_name(&key);
            match (attr_prefix.as_deref(), attr_local.as_str()) {
                (None, "xmlns") => declarations.push(NamespaceDecl { prefix: None, uri: value }),
                (Some("xmlns"), _) => declarations.push(NamespaceDecl {
                    prefix: Some(attr_local),
                    uri: value,
                }),
                _ => raw_attributes.push(RawAttribute {
                    prefix: attr_prefix,
                    local_name: attr_local,
                    value,
                }),
            }
        }

        let parent = self.current_parent();
        if parent == self.doc.document_node() && self.doc.document_element().is_some() {
            return Err(DomError::MultipleRoots);
        }

        let namespace_uri = self.resolve(parent, &declarations, prefix.as_deref())?;
        let element = self
            .doc
            .create_element(QName::new(prefix, local_name, namespace_uri));
        self.doc.append_child(parent, element)?;
        for decl in &declarations {
            self.doc
                .declare_namespace(element, decl.prefix.as_deref(), &decl.uri)?;
        }

        for raw in raw_attributes {
            // Unprefixed attributes are never in the default namespace.
            let namespace_uri = match raw.prefix.as_deref() {
                None => String::new(),
                Some(p) => self.resolve(element, &[], Some(p))?,
            };
            let attribute = self
                .doc
                .create_attribute(QName::new(raw.prefix, raw.local_name, namespace_uri), raw.value);
            self.doc.insert_attribute_before(element, attribute, None)?;
        }

        Ok(element)
    }

    /// Resolve a prefix against the declarations of a tag that is not yet
    /// in the tree, then against `parent`'s scope.
    fn resolve(&self, parent: NodeId, declarations: &[NamespaceDecl], prefix: Option<&str>) -> Result<String> {
        if let Some(decl) = declarations.iter().find(|d| d.prefix.as_deref() == prefix) {
            return Ok(decl.uri.clone());
        }
        let scope = if self.doc.kind(parent) == NodeKind::Element {
            self.doc.lookup_namespace(parent, prefix)
        } else {
            match prefix {
                Some("xml") => Some(crate::XML_NAMESPACE.to_string()),
                Some(_) => None,
                None => Some(String::new()),
            }
        };
        scope.ok_or_else(|| DomError::UndeclaredPrefix {
            prefix: prefix.unwrap_or_default().to_string(),
        })
    }

    fn handle_text(&mut self, e: &BytesText<'_>, event_start: u64) -> Result<()> {
        let text = e.unescape().map_err(|err| DomError::XmlSyntax {
            message: format!("Invalid text content: {}", err),
            position: Some(event_start),
        })?;

        let Some(parent) = self.stack.last().map(|open| open.id) else {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(DomError::InvalidStructure {
                message: "Text content outside of the root element".to_string(),
            });
        };

        // Skip whitespace-only text between elements
        if text.trim().is_empty() && !self.options.preserve_whitespace {
            return Ok(());
        }

        let node = self.doc.create_text(text.into_owned());
        self.doc.append_child(parent, node)?;
        Ok(())
    }
}

fn split_name(full_name: &str) -> (Option<String>, String) {
    match full_name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, full_name.to_string()),
    }
}
