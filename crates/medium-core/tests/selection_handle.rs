use std::cmp::Ordering;

use medium_editor_core::{
    CLOSE_CLASS, Document, EditorConfig, ElementNode, MediumEditor, Node, Point, Selection,
    SelectionHandle, select_contents, text_range,
};

fn doc() -> Document {
    Document::new(vec![
        ElementNode::new("div")
            .with_attr("class", "editor")
            .with_child(ElementNode::new("p").with_text("lorem ipsum"))
            .with_child(ElementNode::new("p").with_text("dolor"))
            .into(),
        Node::text("outside"),
    ])
}

fn regions(doc: &Document) -> Vec<Vec<usize>> {
    doc.select_all(".editor")
}

#[test]
fn restore_returns_the_captured_range() {
    let doc = doc();
    let regions = regions(&doc);
    let live = Selection::new(Point::new(vec![0, 0, 0], 2), Point::new(vec![0, 1, 0], 3));

    let handle = SelectionHandle::capture(&doc, &regions, Some(&live)).unwrap();

    assert_eq!(handle.region(), 0);
    assert!(!handle.is_collapsed());
    assert_eq!(handle.restore(&doc), Some(live));
}

#[test]
fn backward_selection_is_stored_in_document_order() {
    let doc = doc();
    let regions = regions(&doc);
    let live = Selection::new(Point::new(vec![0, 1, 0], 3), Point::new(vec![0, 0, 0], 2));

    let handle = SelectionHandle::capture(&doc, &regions, Some(&live)).unwrap();

    assert_eq!(handle.start(), &Point::new(vec![0, 0, 0], 2));
    assert_eq!(handle.end(), &Point::new(vec![0, 1, 0], 3));
}

#[test]
fn nothing_to_capture_outside_regions() {
    let doc = doc();
    let regions = regions(&doc);

    assert!(SelectionHandle::capture(&doc, &regions, None).is_none());

    let outside = Selection::new(Point::new(vec![1], 0), Point::new(vec![1], 3));
    assert!(SelectionHandle::capture(&doc, &regions, Some(&outside)).is_none());

    let straddling = Selection::new(Point::new(vec![0, 0, 0], 0), Point::new(vec![1], 3));
    assert!(SelectionHandle::capture(&doc, &regions, Some(&straddling)).is_none());
}

#[test]
fn capturing_leaves_document_untouched() {
    let doc = doc();
    let before = doc.clone();
    let regions = regions(&doc);
    let live = select_contents(&doc, &regions[0]).unwrap();

    let handle = SelectionHandle::capture(&doc, &regions, Some(&live)).unwrap();

    assert_eq!(doc, before);
    assert_eq!(handle.start(), &Point::new(vec![0, 0, 0], 0));
    assert_eq!(handle.end(), &Point::new(vec![0, 1, 0], 5));
}

#[test]
fn caret_is_captured_as_collapsed() {
    let doc = doc();
    let regions = regions(&doc);
    let caret = Selection::collapsed(Point::new(vec![0, 1, 0], 1));

    let handle = SelectionHandle::capture(&doc, &regions, Some(&caret)).unwrap();

    assert!(handle.is_collapsed());
}

#[test]
fn stale_handle_restores_to_nothing() {
    let mut doc = doc();
    let regions = regions(&doc);
    let live = Selection::new(Point::new(vec![0, 1, 0], 1), Point::new(vec![0, 1, 0], 4));
    let handle = SelectionHandle::capture(&doc, &regions, Some(&live)).unwrap();

    doc.remove_node(&[0, 1]).unwrap();
    assert_eq!(handle.restore(&doc), None);

    let mut shortened = self::doc();
    shortened.text_mut(&[0, 1, 0]).unwrap().text = "do".to_string();
    assert_eq!(handle.restore(&shortened), None);
}

#[test]
fn empty_region_selects_its_inside() {
    let doc = Document::new(vec![
        ElementNode::new("div").with_attr("class", "editor").into(),
    ]);

    let selection = select_contents(&doc, &[0]).unwrap();

    assert!(selection.is_collapsed());
    assert_eq!(selection.anchor, Point::new(vec![0], 0));
}

#[test]
fn element_points_sit_between_children() {
    let after_first = Point::new(vec![0], 1);

    assert_eq!(
        Point::new(vec![0], 0).compare(&Point::new(vec![0, 0, 0], 0)),
        Ordering::Less
    );
    assert_eq!(
        after_first.compare(&Point::new(vec![0, 0, 0], 11)),
        Ordering::Greater
    );
    assert_eq!(
        after_first.compare(&Point::new(vec![0, 1, 0], 0)),
        Ordering::Less
    );
    assert_eq!(
        Point::new(vec![0, 1], 0).compare(&after_first),
        Ordering::Greater
    );
}

#[test]
fn selection_ending_on_an_element_keeps_its_direction() {
    let doc = doc();
    let regions = regions(&doc);
    let live = Selection::new(Point::new(vec![0, 0, 0], 6), Point::new(vec![0], 2));

    let handle = SelectionHandle::capture(&doc, &regions, Some(&live)).unwrap();

    assert_eq!(handle.start(), &Point::new(vec![0, 0, 0], 6));
    assert_eq!(handle.end(), &Point::new(vec![0], 2));
    assert_eq!(
        text_range(&doc, &live),
        Some((Point::new(vec![0, 0, 0], 6), Point::new(vec![0, 1, 0], 5)))
    );

    let backward = Selection::new(live.focus.clone(), live.anchor.clone());
    assert_eq!(backward.ordered(), (&live.anchor, &live.focus));
}

#[test]
fn failed_capture_replaces_the_saved_handle() {
    let mut editor = MediumEditor::new(doc(), ".editor", EditorConfig::default()).unwrap();
    editor.select_element_contents(0).unwrap();
    editor.click_button("anchor").unwrap();
    assert!(editor.anchor_extension().unwrap().saved_selection().is_some());

    editor.click_form_control("anchor", CLOSE_CLASS).unwrap();
    editor.set_selection(Some(Selection::new(
        Point::new(vec![1], 0),
        Point::new(vec![1], 3),
    )));
    editor.show_anchor_form(None).unwrap();

    assert!(editor.is_displayed("anchor"));
    assert!(editor.anchor_extension().unwrap().saved_selection().is_none());
}
