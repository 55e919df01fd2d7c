use std::time::Duration;

use medium_editor_core::{
    ANCHOR_TARGET_CLASS, Document, EditorConfig, EditorEvent, ElementNode, MediumEditor, Node,
    Point, SAVE_CLASS, Selection,
};

pub fn demo_document() -> Document {
    Document::new(vec![
        ElementNode::new("div")
            .with_attr("class", "editor")
            .with_child(ElementNode::new("p").with_text("lorem ipsum dolor"))
            .into(),
        ElementNode::new("div")
            .with_attr("class", "editor")
            .with_child(
                ElementNode::new("p")
                    .with_text("see ")
                    .with_child(ElementNode::new("a").with_attr("href", "#").with_text("this link")),
            )
            .into(),
        Node::text("outside"),
    ])
}

/// Walks one editor through the interactions a reader would perform: select,
/// bold, link via the form, unlink.
pub fn run(config: EditorConfig) -> anyhow::Result<MediumEditor> {
    let delay = config.debounce_delay();
    let mut editor = MediumEditor::new(demo_document(), ".editor", config)?;

    editor.select_element_contents_and_fire(0)?;
    editor.tick(delay);
    log_events(&mut editor, "select");

    editor.click_button("bold")?;
    editor.click_button("bold")?;
    log_events(&mut editor, "bold twice");

    editor.click_button("anchor")?;
    if let Some(anchor) = editor.anchor_extension_mut() {
        anchor.input().set_value("example.com");
    }
    if editor.config().anchor_target {
        editor.click_form_control("anchor", ANCHOR_TARGET_CLASS)?;
    }
    editor.click_form_control("anchor", SAVE_CLASS)?;
    log_events(&mut editor, "link");

    let link_text = vec![1, 0, 1, 0];
    editor.set_selection(Some(Selection::new(
        Point::new(link_text.clone(), 0),
        Point::new(link_text, "this link".len()),
    )));
    editor.selection_changed();
    editor.tick(delay);
    editor.click_button("anchor")?;
    log_events(&mut editor, "unlink");

    editor.blur();
    editor.tick(Duration::from_millis(1));
    log_events(&mut editor, "blur");

    Ok(editor)
}

fn log_events(editor: &mut MediumEditor, step: &str) {
    for event in editor.take_events() {
        match &event {
            EditorEvent::LinkCreated(spec) => {
                tracing::info!(step, url = %spec.url, target = spec.target.as_str(), "link_created")
            }
            other => tracing::info!(step, event = ?other, "event"),
        }
    }
}
