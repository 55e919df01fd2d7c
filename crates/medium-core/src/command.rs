use std::any::Any;
use std::collections::HashMap;

use crate::anchor::AnchorCommand;
use crate::config::EditorConfig;
use crate::context::{EditorContext, EditorEvent};
use crate::error::EditorError;
use crate::exec::ExecCommand;
use crate::form::ExtensionForm;
use crate::selection::SelectionHandle;
use crate::toolbar::Toolbar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
}

/// A formatting action bound to a toolbar button (`data-action = name()`).
pub trait Command: Any {
    fn name(&self) -> &str;

    fn init(&mut self, _ctx: &mut EditorContext) {}

    /// The toolbar button was clicked. `selection` is what the controller
    /// captured for this click.
    fn on_activate(
        &mut self,
        ctx: &mut EditorContext,
        selection: Option<&SelectionHandle>,
    ) -> Result<(), EditorError>;

    fn on_submit(&mut self, _ctx: &mut EditorContext) -> Result<(), EditorError> {
        Ok(())
    }

    fn on_cancel(&mut self, _ctx: &mut EditorContext) {}

    /// The form was taken away without submit or cancel (focus left the editor).
    fn on_hide(&mut self) {}

    fn on_key_up(&mut self, ctx: &mut EditorContext, key: Key) -> Result<(), EditorError> {
        match key {
            Key::Enter => self.on_submit(ctx),
            Key::Escape => {
                self.on_cancel(ctx);
                Ok(())
            }
            Key::Char(_) => Ok(()),
        }
    }

    fn is_active(&self, _ctx: &EditorContext) -> bool {
        false
    }

    fn extension_form(&self) -> Option<&dyn ExtensionForm> {
        None
    }

    fn toggle_checkbox(&mut self, _class: &str) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<(), EditorError> {
        let name = command.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(EditorError::DuplicateCommand(name));
        }
        self.order.push(name.clone());
        self.commands.insert(name, command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&(dyn Command + 'static)> {
        self.commands.get(name).map(|command| &**command)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Command + 'static)> {
        self.commands.get_mut(name).map(|command| &mut **command)
    }

    /// Registered action names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Command + 'static)> {
        self.order.iter().filter_map(|name| self.get(name))
    }

    pub(crate) fn init_all(&mut self, ctx: &mut EditorContext) {
        for name in &self.order {
            if let Some(command) = self.commands.get_mut(name) {
                command.init(ctx);
            }
        }
    }
}

/// Built-in command for a configured button name.
pub fn builtin_command(
    name: &str,
    config: &EditorConfig,
    toolbar: &Toolbar,
) -> Option<Box<dyn Command>> {
    let command: Box<dyn Command> = match name {
        "bold" => Box::new(InlineCommand::new("bold", ExecCommand::Bold)),
        "italic" => Box::new(InlineCommand::new("italic", ExecCommand::Italic)),
        "underline" => Box::new(InlineCommand::new("underline", ExecCommand::Underline)),
        "strikethrough" => Box::new(InlineCommand::new(
            "strikethrough",
            ExecCommand::Strikethrough,
        )),
        "anchor" => Box::new(AnchorCommand::new(config, toolbar.clone())),
        "header1" => Box::new(BlockCommand::new("header1", &config.first_header)),
        "header2" => Box::new(BlockCommand::new("header2", &config.second_header)),
        "quote" => Box::new(BlockCommand::new("quote", "blockquote")),
        _ => return None,
    };
    Some(command)
}

fn restore_if_lost(ctx: &mut EditorContext, selection: Option<&SelectionHandle>) {
    if ctx.selection().is_some() {
        return;
    }
    if let Some(handle) = selection {
        ctx.restore_selection(handle);
    }
}

/// Toggles an inline tag (`b`, `i`, ...) over the selection.
pub struct InlineCommand {
    name: &'static str,
    command: ExecCommand,
}

impl InlineCommand {
    pub fn new(name: &'static str, command: ExecCommand) -> Self {
        Self { name, command }
    }
}

impl Command for InlineCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn on_activate(
        &mut self,
        ctx: &mut EditorContext,
        selection: Option<&SelectionHandle>,
    ) -> Result<(), EditorError> {
        restore_if_lost(ctx, selection);
        let outcome = ctx.exec(self.command.clone())?;
        if outcome.changed {
            ctx.emit(EditorEvent::Formatted {
                action: self.name.to_string(),
            });
        }
        Ok(())
    }

    fn is_active(&self, ctx: &EditorContext) -> bool {
        self.command
            .inline_tags()
            .is_some_and(|tags| ctx.selection_in_tag(tags))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Retags the block holding the selection (`h3`, `blockquote`, ...).
pub struct BlockCommand {
    name: &'static str,
    tag: String,
}

impl BlockCommand {
    pub fn new(name: &'static str, tag: &str) -> Self {
        Self {
            name,
            tag: tag.to_ascii_lowercase(),
        }
    }
}

impl Command for BlockCommand {
    fn name(&self) -> &str {
        self.name
    }

    fn on_activate(
        &mut self,
        ctx: &mut EditorContext,
        selection: Option<&SelectionHandle>,
    ) -> Result<(), EditorError> {
        restore_if_lost(ctx, selection);
        let outcome = ctx.exec(ExecCommand::FormatBlock {
            tag: self.tag.clone(),
        })?;
        if outcome.changed {
            ctx.emit(EditorEvent::Formatted {
                action: self.name.to_string(),
            });
        }
        Ok(())
    }

    fn is_active(&self, ctx: &EditorContext) -> bool {
        ctx.block_tag().as_deref() == Some(self.tag.as_str())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
