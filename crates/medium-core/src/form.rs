pub const SAVE_CLASS: &str = "medium-editor-toobar-save";
pub const CLOSE_CLASS: &str = "medium-editor-toobar-close";
pub const INPUT_CLASS: &str = "medium-editor-toolbar-input";
pub const ANCHOR_BUTTON_CLASS: &str = "medium-editor-toolbar-anchor-button";
pub const ANCHOR_TARGET_CLASS: &str = "medium-editor-toolbar-anchor-target";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormControl {
    Save,
    Close,
    Input,
    Checkbox(&'static str),
}

/// Where a form is in its show/submit cycle. Visibility is not tracked here:
/// it follows the toolbar state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Hidden,
    Shown,
    Submitted,
    Cancelled,
}

pub trait ExtensionForm {
    /// The control carrying `class`, if the form has one.
    fn control(&self, class: &str) -> Option<FormControl>;
    fn phase(&self) -> FormPhase;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub placeholder: String,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorForm {
    input: TextInput,
    target: Option<Checkbox>,
    button: Option<Checkbox>,
    phase: FormPhase,
}

impl AnchorForm {
    pub fn new(
        placeholder: &str,
        target_label: Option<&str>,
        with_button: bool,
    ) -> Self {
        Self {
            input: TextInput {
                value: String::new(),
                placeholder: placeholder.to_string(),
            },
            target: target_label.map(|label| Checkbox {
                label: label.to_string(),
                checked: false,
            }),
            button: with_button.then(|| Checkbox {
                label: "Button".to_string(),
                checked: false,
            }),
            phase: FormPhase::Hidden,
        }
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut TextInput {
        &mut self.input
    }

    pub fn target_checkbox(&self) -> Option<&Checkbox> {
        self.target.as_ref()
    }

    pub fn target_checkbox_mut(&mut self) -> Option<&mut Checkbox> {
        self.target.as_mut()
    }

    pub fn button_checkbox(&self) -> Option<&Checkbox> {
        self.button.as_ref()
    }

    pub fn button_checkbox_mut(&mut self) -> Option<&mut Checkbox> {
        self.button.as_mut()
    }

    pub(crate) fn set_phase(&mut self, phase: FormPhase) {
        self.phase = phase;
    }

    pub fn opens_in_new_window(&self) -> bool {
        self.target.as_ref().is_some_and(|c| c.checked)
    }

    pub fn wants_button(&self) -> bool {
        self.button.as_ref().is_some_and(|c| c.checked)
    }
}

impl ExtensionForm for AnchorForm {
    fn control(&self, class: &str) -> Option<FormControl> {
        match class {
            SAVE_CLASS => Some(FormControl::Save),
            CLOSE_CLASS => Some(FormControl::Close),
            INPUT_CLASS => Some(FormControl::Input),
            ANCHOR_TARGET_CLASS if self.target.is_some() => {
                Some(FormControl::Checkbox(ANCHOR_TARGET_CLASS))
            }
            ANCHOR_BUTTON_CLASS if self.button.is_some() => {
                Some(FormControl::Checkbox(ANCHOR_BUTTON_CLASS))
            }
            _ => None,
        }
    }

    fn phase(&self) -> FormPhase {
        self.phase
    }
}
