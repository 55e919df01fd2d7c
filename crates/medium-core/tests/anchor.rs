use std::cell::RefCell;
use std::rc::Rc;

use medium_editor_core::{
    ANCHOR_BUTTON_CLASS, ANCHOR_TARGET_CLASS, CLOSE_CLASS, Command, CommandExecutor, Display, Document,
    EditorConfig, EditorEvent, ElementNode, ExecCommand, ExecError, ExecOutcome, ExtensionForm,
    Focus, FormPhase, Key, LinkSpec, LinkTarget, MediumEditor, NativeExecutor, Path, Point,
    SAVE_CLASS, Selection, ToolbarState,
};

fn lorem_doc() -> Document {
    Document::new(vec![
        ElementNode::new("div")
            .with_attr("class", "editor")
            .with_text("lorem ipsum")
            .into(),
    ])
}

fn editor_with(config: EditorConfig) -> MediumEditor {
    MediumEditor::new(lorem_doc(), ".editor", config).unwrap()
}

fn open_form(editor: &mut MediumEditor) {
    editor.select_element_contents(0).unwrap();
    editor.click_button("anchor").unwrap();
}

fn submit(editor: &mut MediumEditor, value: &str) {
    editor.anchor_extension_mut().unwrap().input().set_value(value);
    editor.key_up("anchor", Key::Enter).unwrap();
}

fn first_link(editor: &MediumEditor) -> Option<ElementNode> {
    let region = editor.elements()[0].clone();
    let path = editor.document().query_selector(&region, "a")?;
    editor.document().element(&path).cloned()
}

struct RecordingExecutor {
    calls: Rc<RefCell<Vec<ExecCommand>>>,
    inner: NativeExecutor,
}

impl CommandExecutor for RecordingExecutor {
    fn exec(
        &mut self,
        doc: &mut Document,
        regions: &[Path],
        selection: &Selection,
        command: &ExecCommand,
    ) -> Result<ExecOutcome, ExecError> {
        self.calls.borrow_mut().push(command.clone());
        self.inner.exec(doc, regions, selection, command)
    }
}

#[test]
fn clicking_anchor_swaps_actions_for_the_form() {
    let mut editor = editor_with(EditorConfig::default());
    open_form(&mut editor);

    let anchor = editor.anchor_extension().unwrap();
    assert!(anchor.is_displayed());
    assert!(anchor.saved_selection().is_some());
    assert_eq!(editor.toolbar().actions_display(), Display::None);
    assert_eq!(
        editor.toolbar().state(),
        ToolbarState::ShowingForm("anchor".to_string())
    );
    assert_eq!(editor.focus(), &Focus::FormInput("anchor".to_string()));
    assert!(editor.selection().is_none());
    assert!(
        editor
            .take_events()
            .contains(&EditorEvent::FormShown {
                action: "anchor".to_string()
            })
    );
}

#[test]
fn selection_inside_link_unlinks_without_opening_form() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let doc = Document::new(vec![
        ElementNode::new("div")
            .with_attr("class", "editor")
            .with_child(ElementNode::new("a").with_attr("href", "#").with_text("link"))
            .into(),
    ]);
    let executor = RecordingExecutor {
        calls: calls.clone(),
        inner: NativeExecutor,
    };
    let mut editor =
        MediumEditor::with_executor(doc, ".editor", EditorConfig::default(), Box::new(executor))
            .unwrap();

    editor.select_element_contents(0).unwrap();
    editor.click_button("anchor").unwrap();

    assert_eq!(*calls.borrow(), vec![ExecCommand::Unlink]);
    assert!(!editor.anchor_extension().unwrap().is_displayed());
    assert_eq!(editor.inner_html(0).unwrap(), "link");
    assert!(editor.take_events().contains(&EditorEvent::Unlinked));
}

#[test]
fn selection_partly_outside_link_opens_form() {
    let doc = Document::new(vec![
        ElementNode::new("div")
            .with_attr("class", "editor")
            .with_text("see ")
            .with_child(ElementNode::new("a").with_attr("href", "#").with_text("link"))
            .into(),
    ]);
    let mut editor = MediumEditor::new(doc, ".editor", EditorConfig::default()).unwrap();

    editor.select_element_contents(0).unwrap();
    editor.click_button("anchor").unwrap();

    assert!(editor.is_displayed("anchor"));
}

#[test]
fn enter_creates_link_with_http_prefix() {
    let mut editor = editor_with(EditorConfig {
        check_link_format: true,
        ..EditorConfig::default()
    });
    open_form(&mut editor);
    submit(&mut editor, "test.com");

    let link = first_link(&editor).unwrap();
    assert_eq!(link.href().as_deref(), Some("http://test.com/"));
    assert_eq!(link.text_content(), "lorem ipsum");
    assert_eq!(link.target(), "");
    assert_eq!(editor.toolbar().state(), ToolbarState::ShowingActions);
    assert_eq!(
        editor.inner_html(0).unwrap(),
        r#"<a href="http://test.com">lorem ipsum</a>"#
    );

    let anchor = editor.anchor_extension().unwrap();
    assert_eq!(
        anchor.extension_form().unwrap().phase(),
        FormPhase::Submitted
    );
}

#[test]
fn scheme_qualified_urls_are_left_alone() {
    for url in ["mailto:test.com", "https://example.org/a", "ftp://files.example.org"] {
        let mut editor = editor_with(EditorConfig {
            check_link_format: true,
            ..EditorConfig::default()
        });
        open_form(&mut editor);
        submit(&mut editor, url);

        let link = first_link(&editor).unwrap();
        assert_eq!(link.attr("href"), Some(url));
    }

    let mut editor = editor_with(EditorConfig {
        check_link_format: true,
        ..EditorConfig::default()
    });
    open_form(&mut editor);
    submit(&mut editor, "mailto:test.com");
    assert_eq!(
        first_link(&editor).unwrap().href().as_deref(),
        Some("mailto:test.com")
    );
}

#[test]
fn empty_value_keeps_form_open_and_creates_nothing() {
    let mut editor = editor_with(EditorConfig::default());
    open_form(&mut editor);
    editor.take_events();
    let before = editor.document().clone();

    submit(&mut editor, "   ");
    editor.click_form_control("anchor", SAVE_CLASS).unwrap();

    assert!(first_link(&editor).is_none());
    assert_eq!(editor.document(), &before);
    assert!(editor.is_displayed("anchor"));
    assert!(
        !editor
            .take_events()
            .iter()
            .any(|event| matches!(event, EditorEvent::LinkCreated(_)))
    );
}

#[test]
fn target_blank_applies_without_checkbox() {
    let mut editor = editor_with(EditorConfig {
        target_blank: true,
        anchor_target: true,
        ..EditorConfig::default()
    });
    open_form(&mut editor);
    submit(&mut editor, "test.com");

    assert_eq!(first_link(&editor).unwrap().target(), "_blank");
}

#[test]
fn target_checkbox_opens_link_in_new_window() {
    let mut editor = editor_with(EditorConfig {
        anchor_target: true,
        ..EditorConfig::default()
    });
    open_form(&mut editor);
    editor
        .click_form_control("anchor", ANCHOR_TARGET_CLASS)
        .unwrap();
    editor
        .anchor_extension_mut()
        .unwrap()
        .input()
        .set_value("test.com");
    editor.click_form_control("anchor", SAVE_CLASS).unwrap();

    let link = first_link(&editor).unwrap();
    assert_eq!(link.target(), "_blank");
    assert!(
        editor
            .take_events()
            .contains(&EditorEvent::LinkCreated(
                LinkSpec::new("test.com").target(LinkTarget::Blank)
            ))
    );
}

#[test]
fn button_checkbox_adds_every_configured_class() {
    let mut editor = editor_with(EditorConfig {
        anchor_button: true,
        anchor_button_class: "btn btn-default".to_string(),
        ..EditorConfig::default()
    });
    open_form(&mut editor);
    editor
        .click_form_control("anchor", ANCHOR_BUTTON_CLASS)
        .unwrap();
    submit(&mut editor, "test");

    assert!(
        editor
            .take_events()
            .contains(&EditorEvent::LinkCreated(LinkSpec {
                url: "test".to_string(),
                target: LinkTarget::SelfFrame,
                button_class: Some("btn btn-default".to_string()),
            }))
    );
    let link = first_link(&editor).unwrap();
    assert!(link.has_class("btn"));
    assert!(link.has_class("btn-default"));
    assert_eq!(link.href().as_deref(), Some("test"));
}

#[test]
fn unchecked_button_checkbox_adds_no_class() {
    let mut editor = editor_with(EditorConfig {
        anchor_button: true,
        ..EditorConfig::default()
    });
    open_form(&mut editor);
    submit(&mut editor, "test");

    let link = first_link(&editor).unwrap();
    assert!(link.class_list().is_empty());
}

#[test]
fn cancel_restores_actions_and_selection_repeatedly() {
    let mut editor = editor_with(EditorConfig::default());
    editor.select_element_contents(0).unwrap();
    let selected = editor.selection().cloned();
    let before = editor.document().clone();
    editor.click_button("anchor").unwrap();

    for _ in 0..3 {
        editor.click_form_control("anchor", CLOSE_CLASS).unwrap();
        assert_eq!(editor.toolbar().state(), ToolbarState::ShowingActions);
        assert_eq!(editor.document(), &before);
        assert_eq!(editor.selection().cloned(), selected);
    }

    editor.key_up("anchor", Key::Escape).unwrap();
    assert_eq!(editor.toolbar().state(), ToolbarState::ShowingActions);
    assert_eq!(
        editor
            .anchor_extension()
            .unwrap()
            .extension_form()
            .unwrap()
            .phase(),
        FormPhase::Cancelled
    );
}

#[test]
fn reopened_form_without_selection_forgets_the_earlier_range() {
    let mut editor = editor_with(EditorConfig::default());
    editor.set_selection(Some(Selection::new(
        Point::new(vec![0, 0], 0),
        Point::new(vec![0, 0], 5),
    )));
    editor.click_button("anchor").unwrap();
    editor.click_form_control("anchor", CLOSE_CLASS).unwrap();
    editor.blur();
    let before = editor.document().clone();

    editor.show_anchor_form(Some("example.org")).unwrap();
    assert!(editor.anchor_extension().unwrap().saved_selection().is_none());
    editor.click_form_control("anchor", SAVE_CLASS).unwrap();

    assert_eq!(editor.document(), &before);
    assert_eq!(editor.inner_html(0).unwrap(), "lorem ipsum");
}

#[test]
fn enter_after_submit_does_not_link_again() {
    let mut editor = editor_with(EditorConfig::default());
    open_form(&mut editor);
    submit(&mut editor, "test.com");
    editor.take_events();
    let before = editor.document().clone();

    editor.key_up("anchor", Key::Enter).unwrap();
    editor.click_form_control("anchor", SAVE_CLASS).unwrap();

    assert_eq!(editor.document(), &before);
    assert_eq!(editor.toolbar().state(), ToolbarState::ShowingActions);
    assert!(
        !editor
            .take_events()
            .iter()
            .any(|event| matches!(event, EditorEvent::LinkCreated(_)))
    );
}

#[test]
fn link_up_to_the_end_of_the_region() {
    let mut editor = editor_with(EditorConfig::default());
    editor.set_selection(Some(Selection::new(
        Point::new(vec![0, 0], 6),
        Point::new(vec![0], 1),
    )));

    editor.create_link(&LinkSpec::new("http://x.org")).unwrap();

    assert_eq!(
        editor.inner_html(0).unwrap(),
        r#"lorem <a href="http://x.org">ipsum</a>"#
    );
}

#[test]
fn show_anchor_form_prefills_input() {
    let mut editor = editor_with(EditorConfig::default());
    editor.select_element_contents(0).unwrap();
    editor.show_anchor_form(Some("example.org")).unwrap();

    assert!(editor.is_displayed("anchor"));
    let anchor = editor.anchor_extension_mut().unwrap();
    assert_eq!(anchor.input().value(), "example.org");
}

#[test]
fn host_create_link_uses_live_selection() {
    let mut editor = editor_with(EditorConfig::default());
    editor.select_element_contents(0).unwrap();
    editor
        .create_link(&LinkSpec::new("https://example.org").target(LinkTarget::Blank))
        .unwrap();

    let link = first_link(&editor).unwrap();
    assert_eq!(link.href().as_deref(), Some("https://example.org/"));
    assert_eq!(link.target(), "_blank");
}

#[test]
fn unknown_form_control_is_an_error() {
    let mut editor = editor_with(EditorConfig::default());
    open_form(&mut editor);

    assert!(
        editor
            .click_form_control("anchor", ANCHOR_BUTTON_CLASS)
            .is_err()
    );
    assert!(editor.click_button("missing").is_err());
}
