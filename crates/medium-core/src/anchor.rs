use std::any::Any;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::EditorConfig;
use crate::context::{EditorContext, EditorEvent};
use crate::error::EditorError;
use crate::exec::ExecCommand;
use crate::form::{
    ANCHOR_BUTTON_CLASS, ANCHOR_TARGET_CLASS, AnchorForm, ExtensionForm, FormPhase, TextInput,
};
use crate::selection::SelectionHandle;
use crate::toolbar::Toolbar;

static KNOWN_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:(https?|ftps?|rtmpt?)://|mailto:)").expect("scheme pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "_self")]
    SelfFrame,
    #[serde(rename = "_blank")]
    Blank,
}

impl LinkTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkTarget::SelfFrame => "_self",
            LinkTarget::Blank => "_blank",
        }
    }
}

/// Normalized parameters for one link, built per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    pub url: String,
    #[serde(default)]
    pub target: LinkTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_class: Option<String>,
}

impl LinkSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target: LinkTarget::SelfFrame,
            button_class: None,
        }
    }

    pub fn target(mut self, target: LinkTarget) -> Self {
        self.target = target;
        self
    }

    pub fn button_class(mut self, class: impl Into<String>) -> Self {
        self.button_class = Some(class.into());
        self
    }
}

pub fn has_known_scheme(value: &str) -> bool {
    KNOWN_SCHEME.is_match(value)
}

pub fn normalize_url(value: &str, check_link_format: bool) -> String {
    if check_link_format && !has_known_scheme(value) {
        format!("http://{value}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AnchorSettings {
    check_link_format: bool,
    target_blank: bool,
    anchor_target: bool,
    anchor_button: bool,
    anchor_button_class: String,
    placeholder: String,
    checkbox_label: String,
}

impl From<&EditorConfig> for AnchorSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            check_link_format: config.check_link_format,
            target_blank: config.target_blank,
            anchor_target: config.anchor_target,
            anchor_button: config.anchor_button,
            anchor_button_class: config.anchor_button_class.clone(),
            placeholder: config.anchor_input_placeholder.clone(),
            checkbox_label: config.anchor_input_checkbox_label.clone(),
        }
    }
}

/// Creates links through a small form, or removes the link when the
/// selection already is one.
pub struct AnchorCommand {
    settings: AnchorSettings,
    toolbar: Toolbar,
    form: Option<AnchorForm>,
    saved_selection: Option<SelectionHandle>,
}

impl AnchorCommand {
    pub const NAME: &'static str = "anchor";

    pub fn new(config: &EditorConfig, toolbar: Toolbar) -> Self {
        Self {
            settings: AnchorSettings::from(config),
            toolbar,
            form: None,
            saved_selection: None,
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.toolbar.is_displayed(Self::NAME)
    }

    /// The form, built on first access.
    pub fn form(&mut self) -> &mut AnchorForm {
        let settings = &self.settings;
        self.form.get_or_insert_with(|| {
            AnchorForm::new(
                &settings.placeholder,
                settings
                    .anchor_target
                    .then_some(settings.checkbox_label.as_str()),
                settings.anchor_button,
            )
        })
    }

    pub fn input(&mut self) -> &mut TextInput {
        self.form().input_mut()
    }

    pub fn saved_selection(&self) -> Option<&SelectionHandle> {
        self.saved_selection.as_ref()
    }

    /// Open the form over the live selection. The saved handle is replaced
    /// even when nothing could be captured.
    pub fn show_form(&mut self, ctx: &mut EditorContext, prefill: Option<&str>) {
        let handle = ctx.capture_selection();
        self.open_form(ctx, handle, prefill);
    }

    fn open_form(
        &mut self,
        ctx: &mut EditorContext,
        handle: Option<SelectionHandle>,
        prefill: Option<&str>,
    ) {
        self.saved_selection = handle;
        let form = self.form();
        form.input_mut().set_value(prefill.unwrap_or_default());
        form.set_phase(FormPhase::Shown);

        self.toolbar.show_form(Self::NAME);
        ctx.focus_form_input(Self::NAME);
        ctx.emit(EditorEvent::FormShown {
            action: Self::NAME.to_string(),
        });
    }

    /// Normalize the raw input into a link description using the current
    /// form state.
    pub fn link_spec(&self, raw: &str) -> LinkSpec {
        let settings = &self.settings;
        let form = self.form.as_ref();
        let new_window =
            settings.target_blank || form.is_some_and(AnchorForm::opens_in_new_window);
        let as_button = settings.anchor_button && form.is_some_and(AnchorForm::wants_button);

        LinkSpec {
            url: normalize_url(raw, settings.check_link_format),
            target: if new_window {
                LinkTarget::Blank
            } else {
                LinkTarget::SelfFrame
            },
            button_class: as_button.then(|| settings.anchor_button_class.clone()),
        }
    }

    pub fn handle_submit(&mut self, ctx: &mut EditorContext) -> Result<(), EditorError> {
        if !self.is_displayed() {
            tracing::debug!(target: "editor.anchor", "submit_while_hidden");
            return Ok(());
        }
        let raw = self
            .form
            .as_ref()
            .map(|form| form.input().value().trim().to_string())
            .unwrap_or_default();
        if raw.is_empty() {
            tracing::debug!(target: "editor.anchor", "submit_without_value");
            return Ok(());
        }

        let spec = self.link_spec(&raw);
        if let Some(handle) = self.saved_selection.take()
            && !ctx.restore_selection(&handle)
        {
            tracing::debug!(target: "editor.anchor", "saved_selection_stale");
        }
        ctx.create_link(&spec)?;

        if let Some(form) = self.form.as_mut() {
            form.set_phase(FormPhase::Submitted);
        }
        if self.toolbar.show_actions() {
            ctx.emit(EditorEvent::ActionsShown);
        }
        Ok(())
    }

    pub fn handle_cancel(&mut self, ctx: &mut EditorContext) {
        if let Some(handle) = self.saved_selection.take() {
            ctx.restore_selection(&handle);
        }
        if let Some(form) = self.form.as_mut()
            && form.phase() == FormPhase::Shown
        {
            form.set_phase(FormPhase::Cancelled);
        }
        if self.toolbar.show_actions() {
            ctx.emit(EditorEvent::ActionsShown);
        }
    }
}

impl Command for AnchorCommand {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_activate(
        &mut self,
        ctx: &mut EditorContext,
        selection: Option<&SelectionHandle>,
    ) -> Result<(), EditorError> {
        if ctx.selection().is_none()
            && let Some(handle) = selection
        {
            ctx.restore_selection(handle);
        }

        if ctx.selection_in_tag(&["a"]) {
            let outcome = ctx.exec(ExecCommand::Unlink)?;
            if outcome.changed {
                ctx.emit(EditorEvent::Unlinked);
            }
            return Ok(());
        }

        let handle = selection.cloned().or_else(|| ctx.capture_selection());
        self.open_form(ctx, handle, None);
        Ok(())
    }

    fn on_submit(&mut self, ctx: &mut EditorContext) -> Result<(), EditorError> {
        self.handle_submit(ctx)
    }

    fn on_cancel(&mut self, ctx: &mut EditorContext) {
        self.handle_cancel(ctx);
    }

    fn on_hide(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.set_phase(FormPhase::Hidden);
        }
        self.saved_selection = None;
    }

    fn is_active(&self, ctx: &EditorContext) -> bool {
        ctx.selection_in_tag(&["a"])
    }

    fn extension_form(&self) -> Option<&dyn ExtensionForm> {
        self.form.as_ref().map(|form| form as &dyn ExtensionForm)
    }

    fn toggle_checkbox(&mut self, class: &str) {
        let form = self.form();
        let checkbox = match class {
            ANCHOR_TARGET_CLASS => form.target_checkbox_mut(),
            ANCHOR_BUTTON_CLASS => form.button_checkbox_mut(),
            _ => None,
        };
        if let Some(checkbox) = checkbox {
            checkbox.checked = !checkbox.checked;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
