/*
 * cursor_mutation.rs
 *
 * create, coerce, remove, make_next and lazy realization through cursors.
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use xmladapt::{
    ChildCursor, CursorFlags, CursorState, Document, Error, ErrorKind, KnownType, LogicalType,
    TypeMap, XmlCursor, XmlNode,
};

// =============================================================================
// Helpers
// =============================================================================

fn known_types() -> Arc<TypeMap> {
    Arc::new(
        TypeMap::builder("Item")
            .add(KnownType::new("Item", "Item"))
            .add(KnownType::new("Other", "Other"))
            .build()
            .expect("valid type map"),
    )
}

fn item() -> LogicalType {
    LogicalType::new("Item")
}

fn other() -> LogicalType {
    LogicalType::new("Other")
}

fn xml(text: &str) -> Document {
    Document::parse(text).expect("well-formed test document")
}

fn cursor(doc: &Document, flags: CursorFlags) -> ChildCursor {
    let root = doc.document_element().expect("document element");
    ChildCursor::new(root, known_types(), flags)
}

fn local_name(cursor: &ChildCursor, doc: &Document) -> String {
    cursor.name(doc).local_name
}

fn output(doc: &Document) -> String {
    doc.to_xml().expect("serializable document")
}

// =============================================================================
// Lazy realization
// =============================================================================

#[test]
fn as_virtual_when_parent_is_real_node() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MUTABLE);
    cursor.move_next(&doc);

    cursor.set_value(&mut doc, "1").unwrap();

    assert_eq!(output(&doc), "<X><Item>1</Item></X>");
}

#[test]
fn as_virtual_when_parent_is_virtual_node() {
    let mut doc = xml("<X/>");
    let flags = CursorFlags::ELEMENTS | CursorFlags::MUTABLE;
    let mut outer = cursor(&doc, flags);
    outer.move_next(&doc);
    let mut inner = outer.select_children(known_types(), flags);
    inner.move_next(&doc);

    inner.set_value(&mut doc, "1").unwrap();

    assert_eq!(output(&doc), "<X><Item><Item>1</Item></Item></X>");
}

#[test]
fn realize_clears_nil_on_parent() {
    let mut doc = xml(
        r#"<X xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/>"#,
    );
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MUTABLE);
    cursor.move_next(&doc);
    cursor.set_value(&mut doc, "1").unwrap();

    assert_eq!(
        output(&doc),
        r#"<X xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><Item>1</Item></X>"#
    );
}

#[test]
fn create_on_existing_parent_keeps_nil() {
    let mut doc = xml(
        r#"<X xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true" Item="1"/>"#,
    );
    let root = doc.document_element().unwrap();
    let mut cursor = cursor(&doc, CursorFlags::ATTRIBUTES | CursorFlags::MULTIPLE | CursorFlags::MUTABLE);
    assert!(cursor.move_next(&doc));
    assert!(!cursor.move_next(&doc));

    cursor.create(&mut doc, &other()).unwrap();

    assert!(xmladapt::ext::is_nil(&doc, root));
    assert_eq!(
        output(&doc),
        r#"<X xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true" Item="1" Other=""/>"#
    );
}

#[test]
fn child_cursors_of_one_virtual_slot_write_into_one_parent() {
    let mut doc = xml("<X/>");
    let mut outer = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MUTABLE);
    assert!(!outer.move_next(&doc));
    let attributes = CursorFlags::ATTRIBUTES | CursorFlags::MULTIPLE | CursorFlags::MUTABLE;

    let mut first = outer.select_children(known_types(), attributes);
    assert!(!first.move_next(&doc));
    first.set_value(&mut doc, "1").unwrap();
    assert_eq!(output(&doc), r#"<X><Item Item="1"/></X>"#);
    assert!(outer.exists());

    let mut second = outer.select_children(known_types(), attributes);
    assert!(second.move_next(&doc));
    second.set_value(&mut doc, "2").unwrap();
    second.move_to_end(&doc);
    second.create(&mut doc, &other()).unwrap();
    second.set_value(&mut doc, "3").unwrap();

    assert_eq!(output(&doc), r#"<X><Item Item="2" Other="3"/></X>"#);
}

#[test]
fn outer_cursor_lands_on_parent_realized_below_it() {
    let mut doc = xml("<X/>");
    let flags = CursorFlags::ELEMENTS | CursorFlags::MUTABLE;
    let mut outer = cursor(&doc, flags);
    outer.move_next(&doc);
    let mut inner = outer.select_children(known_types(), flags);
    inner.move_next(&doc);
    inner.set_value(&mut doc, "1").unwrap();

    assert_eq!(local_name(&outer, &doc), "Item");
    outer.set_value(&mut doc, "2").unwrap();
    assert_eq!(output(&doc), "<X><Item>2</Item></X>");
    assert!(!outer.move_next(&doc));
    assert_eq!(outer.state(), CursorState::End);
}

#[test]
fn reading_a_virtual_slot_does_not_mutate() {
    let doc = xml("<X/>");
    let mut outer = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MUTABLE);
    outer.move_next(&doc);
    let mut inner = outer.select_children(known_types(), CursorFlags::ELEMENTS);
    assert!(!inner.move_next(&doc));
    assert_eq!(inner.value(&doc), "");
    assert!(!inner.is_nil(&doc));
    assert_eq!(output(&doc), "<X/>");
}

#[test]
fn set_value_on_immutable_empty_cursor_fails() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);
    cursor.move_next(&doc);

    let err = cursor.set_value(&mut doc, "1").unwrap_err();
    assert_eq!(err, Error::IteratorNotMutable);
    assert_eq!(err.kind(), ErrorKind::InvalidCursorState);
    assert_eq!(output(&doc), "<X/>");
}

// =============================================================================
// make_next
// =============================================================================

#[test]
fn make_next_when_at_node_coerces() {
    let mut doc = xml("<X> <Item>1</Item> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);

    cursor.make_next(&mut doc, &other()).unwrap();

    assert_eq!(local_name(&cursor, &doc), "Other");
    assert_eq!(output(&doc), "<X><Other/></X>");
}

#[test]
fn make_next_when_at_end_creates() {
    let mut doc = xml("<X> <Item>1</Item> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);

    cursor.move_next(&doc);
    cursor.make_next(&mut doc, &other()).unwrap();

    assert_eq!(local_name(&cursor, &doc), "Other");
    assert_eq!(output(&doc), "<X><Item>1</Item><Other/></X>");
}

#[test]
fn make_next_writes_a_collection_in_place() {
    let mut doc = xml("<X><Item>a</Item><Skip/><Item>b</Item><Item>c</Item></X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);

    for value in ["1", "2"] {
        cursor.make_next(&mut doc, &item()).unwrap();
        cursor.set_value(&mut doc, value).unwrap();
    }
    cursor.remove_to_end(&mut doc).unwrap();

    assert_eq!(output(&doc), "<X><Item>1</Item><Skip/><Item>2</Item></X>");
}

// =============================================================================
// create
// =============================================================================

#[test]
fn create_before_first_item_fails() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    assert_eq!(cursor.create(&mut doc, &item()), Err(Error::NotInCreatableState));
}

#[test]
fn create_before_end_is_insert_for_element() {
    let mut doc = xml("<X> <Other>2</Other> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    cursor.move_next(&doc);
    cursor.create(&mut doc, &item()).unwrap();
    cursor.set_value(&mut doc, "1").unwrap();

    assert_eq!(local_name(&cursor, &doc), "Item");
    assert_eq!(cursor.value(&doc), "1");
    assert!(cursor.move_next(&doc));
    assert_eq!(local_name(&cursor, &doc), "Other");
    assert_eq!(cursor.value(&doc), "2");
    assert!(!cursor.move_next(&doc));

    assert_eq!(output(&doc), "<X><Item>1</Item><Other>2</Other></X>");
}

#[test]
fn create_before_end_is_insert_for_attribute() {
    let mut doc = xml("<X Other='2'/>");
    let mut cursor = cursor(&doc, CursorFlags::ATTRIBUTES);

    cursor.move_next(&doc);
    cursor.create(&mut doc, &item()).unwrap();
    cursor.set_value(&mut doc, "1").unwrap();

    assert_eq!(local_name(&cursor, &doc), "Item");
    assert_eq!(cursor.value(&doc), "1");
    assert!(cursor.move_next(&doc));
    assert_eq!(local_name(&cursor, &doc), "Other");
    assert_eq!(cursor.value(&doc), "2");
    assert!(!cursor.move_next(&doc));

    assert_eq!(output(&doc), r#"<X Item="1" Other="2"/>"#);
}

#[test]
fn create_at_end_is_append_for_element() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    cursor.move_next(&doc);
    cursor.create(&mut doc, &item()).unwrap();
    cursor.set_value(&mut doc, "1").unwrap();

    assert_eq!(local_name(&cursor, &doc), "Item");
    assert_eq!(cursor.value(&doc), "1");
    assert!(!cursor.move_next(&doc));

    assert_eq!(output(&doc), "<X><Item>1</Item></X>");
}

#[test]
fn create_at_end_is_append_for_attribute() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ATTRIBUTES);

    cursor.move_next(&doc);
    cursor.create(&mut doc, &item()).unwrap();
    cursor.set_value(&mut doc, "1").unwrap();

    assert_eq!(local_name(&cursor, &doc), "Item");
    assert_eq!(cursor.value(&doc), "1");
    assert!(!cursor.move_next(&doc));

    assert_eq!(output(&doc), r#"<X Item="1"/>"#);
}

#[test]
fn create_unknown_type() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);
    cursor.move_next(&doc);

    let err = cursor
        .create(&mut doc, &LogicalType::new("Unknown"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(output(&doc), "<X/>");
}

#[test]
fn create_then_save_then_move_to_lands_on_created_node() {
    let mut doc = xml("<X><Item>1</Item></X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
    cursor.move_next(&doc);
    cursor.move_next(&doc);
    cursor.create(&mut doc, &other()).unwrap();
    let created = cursor.node_id();
    let saved = cursor.save(&doc);

    cursor.reset();
    cursor.move_to(&doc, &saved).unwrap();
    assert_eq!(cursor.node_id(), created);
    assert_eq!(cursor.logical_type(), &other());
}

// =============================================================================
// coerce
// =============================================================================

#[test]
fn coerce_when_before_first_item() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    assert_eq!(cursor.coerce(&mut doc, &item()), Err(Error::NotInCoercibleState));
}

#[test]
fn coerce_when_after_last_item() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);
    cursor.move_next(&doc);

    assert_eq!(cursor.coerce(&mut doc, &item()), Err(Error::NotInCoercibleState));
}

#[test]
fn coerce_when_item_is_compatible() {
    let mut doc = xml("<X> <Item/> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    cursor.move_next(&doc);
    cursor.coerce(&mut doc, &item()).unwrap();

    assert_eq!(local_name(&cursor, &doc), "Item");
    assert!(!cursor.move_next(&doc));
    assert_eq!(output(&doc), "<X><Item/></X>");
}

#[test]
fn coerce_when_item_differs_in_local_name() {
    let mut doc = xml("<X> <Item/> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    cursor.move_next(&doc);
    cursor.coerce(&mut doc, &other()).unwrap();

    assert_eq!(local_name(&cursor, &doc), "Other");
    assert!(!cursor.move_next(&doc));
    assert_eq!(output(&doc), "<X><Other/></X>");
}

#[test]
fn coerce_preserves_ordinal_position() {
    let mut doc = xml("<X><Item>1</Item><Item>2</Item><Item>3</Item></X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
    cursor.move_next(&doc);
    cursor.move_next(&doc);

    cursor.coerce(&mut doc, &other()).unwrap();
    assert!(cursor.move_next(&doc));
    assert_eq!(cursor.value(&doc), "3");

    assert_eq!(output(&doc), "<X><Item>1</Item><Other/><Item>3</Item></X>");
}

#[test]
fn coerce_unknown_type() {
    let mut doc = xml("<X> <Item/> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);
    cursor.move_next(&doc);

    let err = cursor
        .coerce(&mut doc, &LogicalType::new("Unknown"))
        .unwrap_err();
    assert_eq!(err, Error::UnknownType(LogicalType::new("Unknown")));
}

#[test]
fn coerce_attribute_renames_in_place() {
    let mut doc = xml("<X A='a' Item='1' B='b'/>");
    let mut cursor = cursor(&doc, CursorFlags::ATTRIBUTES);
    cursor.move_next(&doc);

    cursor.coerce(&mut doc, &other()).unwrap();
    assert_eq!(output(&doc), r#"<X A="a" Other="" B="b"/>"#);
}

// =============================================================================
// remove
// =============================================================================

#[test]
fn remove_when_before_first_item_fails() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);

    assert_eq!(cursor.remove(&mut doc), Err(Error::NotInRemovableState));
}

#[test]
fn remove_when_after_last_item_fails() {
    let mut doc = xml("<X/>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS);
    cursor.move_next(&doc);

    assert_eq!(cursor.remove(&mut doc), Err(Error::NotInRemovableState));
}

#[test]
fn remove_when_at_item_removes_item_for_element() {
    let mut doc = xml("<X> <Item/> <Other/> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);

    cursor.move_next(&doc);
    cursor.remove(&mut doc).unwrap();

    assert!(matches!(cursor.state(), CursorState::ElementPrimed(_)));
    assert!(cursor.move_next(&doc));
    assert_eq!(local_name(&cursor, &doc), "Other");
    assert!(!cursor.move_next(&doc));

    assert_eq!(output(&doc), "<X><Other/></X>");
}

#[test]
fn remove_when_at_item_removes_item_for_attribute() {
    let mut doc = xml("<X Item='1' Other='2'/>");
    let mut cursor = cursor(&doc, CursorFlags::ATTRIBUTES | CursorFlags::MULTIPLE);

    cursor.move_next(&doc);
    cursor.remove(&mut doc).unwrap();

    assert!(cursor.move_next(&doc));
    assert_eq!(local_name(&cursor, &doc), "Other");
    assert!(!cursor.move_next(&doc));

    assert_eq!(output(&doc), r#"<X Other="2"/>"#);
}

#[test]
fn remove_last_item_ends_cursor() {
    let mut doc = xml("<X><Item/></X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
    cursor.move_next(&doc);
    cursor.remove(&mut doc).unwrap();

    assert_eq!(cursor.state(), CursorState::End);
    assert!(!cursor.move_next(&doc));
    assert_eq!(output(&doc), "<X/>");
}

#[test]
fn remove_last_element_primes_first_attribute() {
    let mut doc = xml(r#"<X Item="a"><Item/></X>"#);
    let mut cursor = cursor(&doc, CursorFlags::ALL_NODES | CursorFlags::MULTIPLE);
    assert!(cursor.move_next(&doc));
    assert!(cursor.is_element(&doc));

    cursor.remove(&mut doc).unwrap();

    assert!(matches!(cursor.state(), CursorState::AttributePrimed(_)));
    assert!(cursor.move_next(&doc));
    assert!(cursor.is_attribute(&doc));
    assert_eq!(cursor.value(&doc), "a");
    assert!(!cursor.move_next(&doc));
    assert_eq!(cursor.state(), CursorState::End);
    assert_eq!(output(&doc), r#"<X Item="a"/>"#);
}

#[test]
fn remove_to_end() {
    let mut doc = xml("<X> <Item>1</Item> <Item>2</Item> <Item>3</Item> </X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);

    cursor.move_next(&doc);
    cursor.remove_to_end(&mut doc).unwrap();

    assert_eq!(output(&doc), "<X><Item>1</Item></X>");
}

#[test]
fn remove_every_item_then_reset_finds_only_survivors() {
    let mut doc = xml("<X><Item>1</Item><Keep/><Other>2</Other></X>");
    let mut cursor = cursor(&doc, CursorFlags::ELEMENTS | CursorFlags::MULTIPLE);
    cursor.remove_to_end(&mut doc).unwrap();

    cursor.reset();
    assert!(!cursor.move_next(&doc));
    assert_eq!(cursor.state(), CursorState::Empty);
    assert_eq!(output(&doc), "<X><Keep/></X>");
}

#[test]
fn self_cursor_rejects_structural_changes() {
    let mut doc = xml("<Item>1</Item>");
    let root = doc.document_element().unwrap();
    let mut cursor = xmladapt::SelfCursor::new(&doc, root, known_types());
    assert!(cursor.move_next(&doc));

    let err = cursor.remove(&mut doc).unwrap_err();
    assert_eq!(err, Error::Unsupported { operation: "remove" });
    assert_eq!(output(&doc), "<Item>1</Item>");
}
