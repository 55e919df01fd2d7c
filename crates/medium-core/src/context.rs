use crate::anchor::{LinkSpec, LinkTarget};
use crate::config::EditorConfig;
use crate::dom::Document;
use crate::error::EditorError;
use crate::exec::{CommandExecutor, ExecCommand, ExecOutcome, block_tag_at, selection_within};
use crate::ops::Path;
use crate::selection::{Selection, SelectionHandle, region_of};
use crate::toolbar::Toolbar;

/// Who holds keyboard focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Outside,
    Region(usize),
    FormInput(String),
}

/// What the editor reports back to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ToolbarShown,
    ToolbarHidden,
    ActionsShown,
    FormShown { action: String },
    LinkCreated(LinkSpec),
    Unlinked,
    Formatted { action: String },
}

/// Everything a command may read or mutate while handling an event.
pub struct EditorContext {
    doc: Document,
    regions: Vec<Path>,
    selection: Option<Selection>,
    focus: Focus,
    toolbar: Toolbar,
    executor: Box<dyn CommandExecutor>,
    config: EditorConfig,
    events: Vec<EditorEvent>,
}

impl EditorContext {
    pub(crate) fn new(
        doc: Document,
        regions: Vec<Path>,
        toolbar: Toolbar,
        executor: Box<dyn CommandExecutor>,
        config: EditorConfig,
    ) -> Self {
        Self {
            doc,
            regions,
            selection: None,
            focus: Focus::Outside,
            toolbar,
            executor,
            config,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn regions(&self) -> &[Path] {
        &self.regions
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Replace the live selection. A selection inside a region moves focus
    /// there.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        if let Some(region) = selection
            .as_ref()
            .and_then(|s| region_of(&self.regions, &s.focus.path))
        {
            self.focus = Focus::Region(region);
        }
        self.selection = selection;
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn capture_selection(&self) -> Option<SelectionHandle> {
        SelectionHandle::capture(&self.doc, &self.regions, self.selection.as_ref())
    }

    /// Make `handle` the live selection again. Returns `false`, leaving the
    /// live selection untouched, when the handle no longer resolves.
    pub fn restore_selection(&mut self, handle: &SelectionHandle) -> bool {
        let Some(selection) = handle.restore(&self.doc) else {
            return false;
        };
        self.selection = Some(selection);
        self.focus = Focus::Region(handle.region());
        true
    }

    /// Focusing a form input takes the live selection with it.
    pub fn focus_form_input(&mut self, action: &str) {
        self.focus = Focus::FormInput(action.to_string());
        self.selection = None;
    }

    pub(crate) fn blur(&mut self) {
        self.focus = Focus::Outside;
        self.selection = None;
    }

    /// Run `command` on the live selection. Without a selection nothing
    /// happens.
    pub fn exec(&mut self, command: ExecCommand) -> Result<ExecOutcome, EditorError> {
        let Some(selection) = self.selection.clone() else {
            tracing::debug!(target: "editor.exec", command = command.name(), "exec_without_selection");
            return Ok(ExecOutcome::default());
        };
        let outcome = self
            .executor
            .exec(&mut self.doc, &self.regions, &selection, &command)?;
        if let Some(selection) = &outcome.selection {
            self.selection = Some(selection.clone());
        }
        Ok(outcome)
    }

    /// Whether the whole live selection already sits inside one of `tags`.
    pub fn selection_in_tag(&self, tags: &[&str]) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| selection_within(&self.doc, &self.regions, s, tags))
    }

    pub fn block_tag(&self) -> Option<String> {
        self.selection
            .as_ref()
            .and_then(|s| block_tag_at(&self.doc, &self.regions, s))
    }

    /// Turn the live selection into a link described by `spec`.
    pub fn create_link(&mut self, spec: &LinkSpec) -> Result<(), EditorError> {
        let outcome = self.exec(ExecCommand::CreateLink {
            url: spec.url.clone(),
        })?;
        for path in &outcome.created {
            let anchor = self.doc.element_mut(path)?;
            if spec.target == LinkTarget::Blank {
                anchor.set_attr("target", LinkTarget::Blank.as_str());
            }
            if let Some(classes) = &spec.button_class {
                for class in classes.split_whitespace() {
                    anchor.add_class(class);
                }
            }
        }
        tracing::debug!(target: "editor.anchor", url = %spec.url, target = spec.target.as_str(), links = outcome.created.len(), "create_link");
        self.emit(EditorEvent::LinkCreated(spec.clone()));
        Ok(())
    }

    pub fn emit(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }
}
