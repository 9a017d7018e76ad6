//! Helpers layered over [`Document`]: prefix management, attribute
//! get/set, and the `xsi:nil` / `xsi:type` markers.
//!
//! Names are handled as [`XmlName`]s throughout; prefixes are chosen here
//! and never leak into the typed layer.

use crate::error::{Error, Result};
use crate::name::XmlName;
use xmladapt_dom::{Document, NodeId, NodeKind, QName};

/// Namespace of the `xsi:type` and `xsi:nil` markers.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSI_PREFIX: &str = "xsi";
pub const XSI_TYPE: &str = "type";
pub const XSI_NIL: &str = "nil";

/// Namespace of the built-in schema types.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSD_PREFIX: &str = "xsd";

fn xsi_type_name() -> XmlName {
    XmlName::new(XSI_TYPE, XSI_NAMESPACE)
}

fn xsi_nil_name() -> XmlName {
    XmlName::new(XSI_NIL, XSI_NAMESPACE)
}

/// Namespace a child of `parent` inherits when its type map entry does not
/// name one. The document node and non-elements contribute no namespace.
pub fn namespace_of(doc: &Document, parent: NodeId) -> String {
    match doc.kind(parent) {
        NodeKind::Element => doc
            .name(parent)
            .map(|name| name.namespace_uri.clone())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// The namespace-qualified name of an element or attribute.
pub fn node_name(doc: &Document, node: NodeId) -> Option<XmlName> {
    doc.name(node).map(XmlName::from)
}

// ==================== Synthesis ====================

/// Create a detached element named `name`, to be inserted under `parent`.
///
/// The in-scope default namespace is reused when it matches, then any
/// bound prefix; otherwise the element declares `name`'s namespace as its
/// own default.
pub fn create_element(doc: &mut Document, parent: NodeId, name: &XmlName) -> Result<NodeId> {
    let scope = doc.kind(parent) == NodeKind::Element;
    let default_ns = if scope {
        doc.lookup_namespace(parent, None).unwrap_or_default()
    } else {
        String::new()
    };

    if default_ns == name.namespace_uri {
        return Ok(doc.create_element(QName::new(None, name.local_name.clone(), name.namespace_uri.clone())));
    }

    let bound = if scope && name.has_namespace() {
        doc.lookup_bound_prefix(parent, &name.namespace_uri)
    } else {
        None
    };
    match bound {
        Some(prefix) => Ok(doc.create_element(QName::new(
            Some(prefix),
            name.local_name.clone(),
            name.namespace_uri.clone(),
        ))),
        None => {
            let element = doc.create_element(QName::new(
                None,
                name.local_name.clone(),
                name.namespace_uri.clone(),
            ));
            doc.declare_namespace(element, None, &name.namespace_uri)?;
            Ok(element)
        }
    }
}

/// Create a detached attribute named `name` for `owner`, declaring a
/// prefix for its namespace if none is bound yet.
pub fn create_attribute(doc: &mut Document, owner: NodeId, name: &XmlName, value: &str) -> Result<NodeId> {
    let prefix = ensure_attribute_prefix(doc, owner, &name.namespace_uri)?;
    Ok(doc.create_attribute(
        QName::new(prefix, name.local_name.clone(), name.namespace_uri.clone()),
        value,
    ))
}

/// Prefix an attribute in `namespace_uri` must use on `owner`.
///
/// Unqualified attributes need none. The `xsi` and `xsd` namespaces are
/// declared once on the document element; anything else gets a generated
/// `pN` prefix declared on the owner.
fn ensure_attribute_prefix(doc: &mut Document, owner: NodeId, namespace_uri: &str) -> Result<Option<String>> {
    if namespace_uri.is_empty() {
        return Ok(None);
    }
    ensure_prefix(doc, owner, namespace_uri).map(Some)
}

fn ensure_prefix(doc: &mut Document, element: NodeId, namespace_uri: &str) -> Result<String> {
    if let Some(prefix) = doc.lookup_bound_prefix(element, namespace_uri) {
        return Ok(prefix);
    }

    let preferred = match namespace_uri {
        XSI_NAMESPACE => Some(XSI_PREFIX),
        XSD_NAMESPACE => Some(XSD_PREFIX),
        _ => None,
    };
    if let Some(preferred) = preferred {
        let target = root_of(doc, element);
        if doc.lookup_namespace(target, Some(preferred)).is_none()
            && doc.lookup_namespace(element, Some(preferred)).is_none()
        {
            doc.declare_namespace(target, Some(preferred), namespace_uri)?;
            return Ok(preferred.to_string());
        }
    }

    let prefix = generate_prefix(doc, element);
    doc.declare_namespace(element, Some(prefix.as_str()), namespace_uri)?;
    Ok(prefix)
}

/// Topmost element above (or at) `element`.
fn root_of(doc: &Document, element: NodeId) -> NodeId {
    let mut current = element;
    while let Some(parent) = doc.parent(current) {
        if doc.kind(parent) != NodeKind::Element {
            break;
        }
        current = parent;
    }
    current
}

fn generate_prefix(doc: &Document, element: NodeId) -> String {
    (1..)
        .map(|n| format!("p{}", n))
        .find(|candidate| doc.lookup_namespace(element, Some(candidate.as_str())).is_none())
        .unwrap_or_default()
}

// ==================== Attributes ====================

pub fn find_attribute(doc: &Document, element: NodeId, name: &XmlName) -> Option<NodeId> {
    doc.find_attribute(element, &name.local_name, &name.namespace_uri)
}

pub fn get_attribute<'d>(doc: &'d Document, element: NodeId, name: &XmlName) -> Option<&'d str> {
    find_attribute(doc, element, name).and_then(|attr| doc.attribute_value(attr))
}

pub fn has_attribute(doc: &Document, element: NodeId, name: &XmlName) -> bool {
    find_attribute(doc, element, name).is_some()
}

/// Set, replace or remove an attribute. `None` and the empty string remove.
pub fn set_attribute(doc: &mut Document, element: NodeId, name: &XmlName, value: Option<&str>) -> Result<()> {
    let existing = find_attribute(doc, element, name);
    match (value.filter(|v| !v.is_empty()), existing) {
        (None, Some(attr)) => doc.remove_attribute(element, attr)?,
        (None, None) => {}
        (Some(value), Some(attr)) => doc.set_attribute_value(attr, value)?,
        (Some(value), None) => {
            let attr = create_attribute(doc, element, name, value)?;
            doc.insert_attribute_before(element, attr, None)?;
        }
    }
    Ok(())
}

// ==================== Markers ====================

/// Whether an element carries `xsi:nil="true"`.
pub fn is_nil(doc: &Document, node: NodeId) -> bool {
    doc.kind(node) == NodeKind::Element
        && get_attribute(doc, node, &xsi_nil_name()).is_some_and(|v| v.trim() == "true")
}

/// Mark or unmark an element as nil. Marking drops all child nodes.
pub fn set_nil(doc: &mut Document, node: NodeId, nil: bool) -> Result<()> {
    match doc.kind(node) {
        NodeKind::Element => {}
        NodeKind::Attribute => return Err(Error::NotValidOnAttribute),
        // Nothing to clear on the document node.
        _ if !nil => return Ok(()),
        _ => return Err(Error::NotValidOnAttribute),
    }
    if nil {
        doc.remove_all_children(node)?;
        set_attribute(doc, node, &xsi_nil_name(), Some("true"))
    } else {
        set_attribute(doc, node, &xsi_nil_name(), None)
    }
}

/// The `xsi:type` marker of an element.
///
/// A prefixed value is resolved against the namespaces in scope; an
/// unprefixed value names a type in no namespace. Values with an unbound
/// prefix are ignored.
pub fn discriminator(doc: &Document, node: NodeId) -> Option<XmlName> {
    if doc.kind(node) != NodeKind::Element {
        return None;
    }
    let value = get_attribute(doc, node, &xsi_type_name())?.trim();
    if value.is_empty() {
        return None;
    }
    match value.split_once(':') {
        Some((prefix, local)) => {
            let namespace = doc.lookup_namespace(node, Some(prefix))?;
            Some(XmlName::new(local, namespace))
        }
        None => Some(XmlName::local(value)),
    }
}

/// Write or remove the `xsi:type` marker of an element.
pub fn set_discriminator(doc: &mut Document, node: NodeId, discriminator: Option<&XmlName>) -> Result<()> {
    if doc.kind(node) != NodeKind::Element {
        return match discriminator {
            Some(_) => Err(Error::NotValidOnAttribute),
            None => Ok(()),
        };
    }
    let value = match discriminator {
        None => None,
        Some(name) if !name.has_namespace() => Some(name.local_name.clone()),
        Some(name) => {
            let prefix = ensure_prefix(doc, node, &name.namespace_uri)?;
            Some(format!("{}:{}", prefix, name.local_name))
        }
    };
    set_attribute(doc, node, &xsi_type_name(), value.as_deref())
}

/// Empty a node while keeping what identifies it.
///
/// Elements lose all children and every attribute except `xsi:type`;
/// namespace declarations stay. Attributes get an empty value.
pub fn clear(doc: &mut Document, node: NodeId) -> Result<()> {
    match doc.kind(node) {
        NodeKind::Attribute => {
            doc.set_attribute_value(node, "")?;
        }
        NodeKind::Element => {
            doc.remove_all_children(node)?;
            let type_name = xsi_type_name();
            let removable: Vec<NodeId> = doc
                .attributes(node)
                .iter()
                .copied()
                .filter(|&attr| {
                    !doc.name(attr)
                        .is_some_and(|n| n.matches(&type_name.local_name, &type_name.namespace_uri))
                })
                .collect();
            for attr in removable {
                doc.remove_attribute(node, attr)?;
            }
        }
        _ => doc.remove_all_children(node)?,
    }
    Ok(())
}
