use std::time::Duration;

use crate::anchor::{AnchorCommand, LinkSpec};
use crate::command::{Command, CommandRegistry, Key, builtin_command};
use crate::config::EditorConfig;
use crate::context::{EditorContext, EditorEvent, Focus};
use crate::debounce::Debouncer;
use crate::dom::{Document, ElementNode};
use crate::error::EditorError;
use crate::exec::{CommandExecutor, NativeExecutor};
use crate::form::FormControl;
use crate::ops::Path;
use crate::selection::{Point, Selection, SelectionHandle, select_contents};
use crate::toolbar::{Toolbar, ToolbarButton};

/// One editor instance: the editable regions of a document, their toolbar and
/// the commands bound to it.
pub struct MediumEditor {
    ctx: EditorContext,
    commands: CommandRegistry,
    debouncer: Debouncer,
    clock: Duration,
    active_selection: Option<SelectionHandle>,
}

impl MediumEditor {
    pub fn new(doc: Document, selector: &str, config: EditorConfig) -> Result<Self, EditorError> {
        Self::with_executor(doc, selector, config, Box::new(NativeExecutor))
    }

    pub fn with_executor(
        mut doc: Document,
        selector: &str,
        config: EditorConfig,
        executor: Box<dyn CommandExecutor>,
    ) -> Result<Self, EditorError> {
        let regions = doc.select_all(selector);
        for path in &regions {
            let el = doc.element_mut(path)?;
            el.set_attr("contenteditable", "true");
            el.set_attr("data-medium-element", "true");
        }

        let toolbar = Toolbar::new(Vec::new());
        let mut commands = CommandRegistry::default();
        for name in &config.buttons {
            if commands.get(name).is_some() {
                tracing::warn!(target: "editor", button = %name, "duplicate_button");
                continue;
            }
            let Some(command) = builtin_command(name, &config, &toolbar) else {
                tracing::warn!(target: "editor", button = %name, "unknown_button");
                continue;
            };
            commands.register(command)?;
            toolbar.add_button(ToolbarButton::for_action(name));
        }

        let debouncer = Debouncer::new(config.debounce_delay());
        tracing::info!(
            target: "editor",
            selector,
            elements = regions.len(),
            commands = commands.len(),
            "editor_created"
        );

        let mut ctx = EditorContext::new(doc, regions, toolbar, executor, config);
        commands.init_all(&mut ctx);

        Ok(Self {
            ctx,
            commands,
            debouncer,
            clock: Duration::ZERO,
            active_selection: None,
        })
    }

    pub fn document(&self) -> &Document {
        self.ctx.document()
    }

    pub fn elements(&self) -> &[Path] {
        self.ctx.regions()
    }

    pub fn element(&self, ix: usize) -> Option<&ElementNode> {
        let path = self.ctx.regions().get(ix)?;
        self.ctx.document().element(path)
    }

    pub fn inner_html(&self, ix: usize) -> Option<String> {
        self.element(ix).map(ElementNode::inner_html)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.ctx.selection()
    }

    pub fn focus(&self) -> &Focus {
        self.ctx.focus()
    }

    pub fn toolbar(&self) -> &Toolbar {
        self.ctx.toolbar()
    }

    pub fn config(&self) -> &EditorConfig {
        self.ctx.config()
    }

    /// The selection the toolbar was last shown for.
    pub fn active_selection(&self) -> Option<&SelectionHandle> {
        self.active_selection.as_ref()
    }

    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        self.ctx.take_events()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.ctx.set_selection(selection);
    }

    /// Select all content of the `ix`-th editable element.
    pub fn select_element_contents(&mut self, ix: usize) -> Result<(), EditorError> {
        let path = self
            .ctx
            .regions()
            .get(ix)
            .cloned()
            .ok_or(EditorError::NoSuchElement(ix))?;
        let selection = select_contents(self.ctx.document(), &path)
            .unwrap_or_else(|| Selection::collapsed(Point::new(path, 0)));
        self.ctx.set_selection(Some(selection));
        Ok(())
    }

    /// Selection-affecting input happened (mouse-up, key-up). The check runs
    /// once the debounce delay passes without further input.
    pub fn selection_changed(&mut self) {
        self.debouncer.schedule(self.clock);
    }

    pub fn select_element_contents_and_fire(&mut self, ix: usize) -> Result<(), EditorError> {
        self.select_element_contents(ix)?;
        self.selection_changed();
        Ok(())
    }

    /// Advance the editor clock, running a due selection check.
    pub fn tick(&mut self, elapsed: Duration) {
        self.clock += elapsed;
        if self.debouncer.poll(self.clock).is_some() {
            self.check_selection();
        }
    }

    pub fn check_selection(&mut self) {
        if self.ctx.config().disable_toolbar {
            return;
        }
        if let Some(action) = self.ctx.toolbar().displayed_form() {
            tracing::trace!(target: "editor.selection", %action, "check_skipped_form_open");
            return;
        }

        match self.ctx.capture_selection() {
            Some(handle) if !handle.is_collapsed() => {
                tracing::debug!(target: "editor.selection", region = handle.region(), "selection_active");
                self.active_selection = Some(handle);
                self.show_toolbar_actions();
                self.refresh_active_buttons();
            }
            _ => {
                self.active_selection = None;
                self.hide_toolbar();
            }
        }
    }

    pub fn click_button(&mut self, action: &str) -> Result<(), EditorError> {
        let handle = self
            .ctx
            .capture_selection()
            .or_else(|| self.active_selection.clone());
        let command = self
            .commands
            .get_mut(action)
            .ok_or_else(|| EditorError::UnknownAction(action.to_string()))?;
        tracing::debug!(target: "editor", %action, has_selection = handle.is_some(), "button_click");
        command.on_activate(&mut self.ctx, handle.as_ref())?;
        self.refresh_active_buttons();
        Ok(())
    }

    pub fn click_form_control(&mut self, action: &str, class: &str) -> Result<(), EditorError> {
        let command = self
            .commands
            .get_mut(action)
            .ok_or_else(|| EditorError::UnknownAction(action.to_string()))?;
        let control = command
            .extension_form()
            .and_then(|form| form.control(class))
            .ok_or_else(|| EditorError::UnknownControl {
                action: action.to_string(),
                class: class.to_string(),
            })?;

        match control {
            FormControl::Save => command.on_submit(&mut self.ctx)?,
            FormControl::Close => command.on_cancel(&mut self.ctx),
            FormControl::Input => self.ctx.focus_form_input(action),
            FormControl::Checkbox(name) => command.toggle_checkbox(name),
        }
        Ok(())
    }

    /// Key released inside `action`'s form input.
    pub fn key_up(&mut self, action: &str, key: Key) -> Result<(), EditorError> {
        let command = self
            .commands
            .get_mut(action)
            .ok_or_else(|| EditorError::UnknownAction(action.to_string()))?;
        command.on_key_up(&mut self.ctx, key)
    }

    /// Focus left the editor and its toolbar.
    pub fn blur(&mut self) {
        self.debouncer.cancel();
        self.active_selection = None;
        self.hide_toolbar();
        self.ctx.blur();
    }

    pub fn create_link(&mut self, spec: &LinkSpec) -> Result<(), EditorError> {
        self.ctx.create_link(spec)
    }

    pub fn show_toolbar_actions(&mut self) {
        let toolbar = self.ctx.toolbar().clone();
        let was_visible = toolbar.is_visible();
        if toolbar.show_actions() {
            if !was_visible {
                self.ctx.emit(EditorEvent::ToolbarShown);
            }
            self.ctx.emit(EditorEvent::ActionsShown);
        }
    }

    /// Hide the toolbar, abandoning any open form.
    pub fn hide_toolbar(&mut self) {
        let toolbar = self.ctx.toolbar().clone();
        if let Some(action) = toolbar.displayed_form()
            && let Some(command) = self.commands.get_mut(&action)
        {
            command.on_hide();
        }
        if toolbar.hide() {
            self.ctx.emit(EditorEvent::ToolbarHidden);
        }
    }

    pub fn is_displayed(&self, action: &str) -> bool {
        self.ctx.toolbar().is_displayed(action)
    }

    pub fn command(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Add a host-provided command with its own toolbar button.
    pub fn register_command(&mut self, command: Box<dyn Command>) -> Result<(), EditorError> {
        let name = command.name().to_string();
        self.commands.register(command)?;
        self.ctx
            .toolbar()
            .add_button(ToolbarButton::for_action(&name));
        if let Some(command) = self.commands.get_mut(&name) {
            command.init(&mut self.ctx);
        }
        Ok(())
    }

    pub fn anchor_extension(&self) -> Option<&AnchorCommand> {
        self.commands
            .get(AnchorCommand::NAME)?
            .as_any()
            .downcast_ref::<AnchorCommand>()
    }

    pub fn anchor_extension_mut(&mut self) -> Option<&mut AnchorCommand> {
        self.commands
            .get_mut(AnchorCommand::NAME)?
            .as_any_mut()
            .downcast_mut::<AnchorCommand>()
    }

    /// Run `f` with the anchor command and the context it acts on.
    pub fn with_anchor_extension<R>(
        &mut self,
        f: impl FnOnce(&mut AnchorCommand, &mut EditorContext) -> R,
    ) -> Option<R> {
        let anchor = self
            .commands
            .get_mut(AnchorCommand::NAME)?
            .as_any_mut()
            .downcast_mut::<AnchorCommand>()?;
        Some(f(anchor, &mut self.ctx))
    }

    /// Open the link form for the current selection, optionally prefilled.
    pub fn show_anchor_form(&mut self, prefill: Option<&str>) -> Result<(), EditorError> {
        self.with_anchor_extension(|anchor, ctx| anchor.show_form(ctx, prefill))
            .ok_or_else(|| EditorError::UnknownAction(AnchorCommand::NAME.to_string()))
    }

    /// Recompute which buttons' formats the live selection already carries.
    pub fn refresh_active_buttons(&mut self) {
        let active: Vec<String> = self
            .commands
            .iter()
            .filter(|command| command.is_active(&self.ctx))
            .map(|command| command.name().to_string())
            .collect();
        self.ctx.toolbar().set_active_buttons(active);
    }
}
