use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BUTTONS: &[&str] = &[
    "bold", "italic", "underline", "anchor", "header1", "header2", "quote",
];

/// Editor options, named the way host pages pass them (`checkLinkFormat`,
/// `targetBlank`, ...). Read-only once the editor is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Prefix bare domains with `http://`.
    pub check_link_format: bool,
    /// Every created link opens in a new window.
    pub target_blank: bool,
    /// Show an "open in new window" checkbox in the anchor form.
    pub anchor_target: bool,
    /// Show a "button" checkbox in the anchor form.
    pub anchor_button: bool,
    pub anchor_button_class: String,
    pub anchor_input_placeholder: String,
    pub anchor_input_checkbox_label: String,
    /// Selection-check debounce, in milliseconds.
    pub delay: u64,
    pub disable_toolbar: bool,
    pub buttons: Vec<String>,
    pub first_header: String,
    pub second_header: String,
    pub active_button_class: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            check_link_format: false,
            target_blank: false,
            anchor_target: false,
            anchor_button: false,
            anchor_button_class: "btn".to_string(),
            anchor_input_placeholder: "Paste or type a link".to_string(),
            anchor_input_checkbox_label: "Open in new window".to_string(),
            delay: 10,
            disable_toolbar: false,
            buttons: DEFAULT_BUTTONS.iter().map(|b| b.to_string()).collect(),
            first_header: "h3".to_string(),
            second_header: "h4".to_string(),
            active_button_class: "medium-editor-button-active".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }
}
