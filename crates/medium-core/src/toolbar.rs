use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarState {
    Hidden,
    ShowingActions,
    ShowingForm(String),
}

/// CSS `display` of the toolbar's action row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// An activation control carrying `data-action="<command>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    action: String,
    label: String,
}

impl ToolbarButton {
    pub fn new(action: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            label: label.into(),
        }
    }

    /// Button for a built-in action, labelled like the stock toolbar.
    pub fn for_action(action: &str) -> Self {
        let label = match action {
            "bold" => "B",
            "italic" => "I",
            "underline" => "U",
            "strikethrough" => "S",
            "anchor" => "#",
            "header1" => "H1",
            "header2" => "H2",
            "quote" => "\u{201c}",
            other => other,
        };
        Self::new(action, label)
    }

    pub fn data_action(&self) -> &str {
        &self.action
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn class_name(&self) -> String {
        format!("medium-editor-action medium-editor-action-{}", self.action)
    }
}

#[derive(Debug)]
struct ToolbarInner {
    state: ToolbarState,
    buttons: Vec<ToolbarButton>,
    active: BTreeSet<String>,
}

/// The single floating toolbar of an editor. Clones share one state machine;
/// commands receive a clone at construction.
#[derive(Debug, Clone)]
pub struct Toolbar {
    inner: Rc<RefCell<ToolbarInner>>,
}

impl Toolbar {
    pub fn new(buttons: Vec<ToolbarButton>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ToolbarInner {
                state: ToolbarState::Hidden,
                buttons,
                active: BTreeSet::new(),
            })),
        }
    }

    pub fn state(&self) -> ToolbarState {
        self.inner.borrow().state.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().state != ToolbarState::Hidden
    }

    pub fn displayed_form(&self) -> Option<String> {
        match &self.inner.borrow().state {
            ToolbarState::ShowingForm(action) => Some(action.clone()),
            _ => None,
        }
    }

    pub fn is_displayed(&self, action: &str) -> bool {
        matches!(&self.inner.borrow().state, ToolbarState::ShowingForm(shown) if shown == action)
    }

    pub fn actions_display(&self) -> Display {
        match self.inner.borrow().state {
            ToolbarState::ShowingForm(_) => Display::None,
            _ => Display::Block,
        }
    }

    pub fn show_actions(&self) -> bool {
        self.transition(ToolbarState::ShowingActions)
    }

    /// Swap the action row for `action`'s form. Any other form is replaced.
    pub fn show_form(&self, action: &str) -> bool {
        self.transition(ToolbarState::ShowingForm(action.to_string()))
    }

    pub fn hide(&self) -> bool {
        self.transition(ToolbarState::Hidden)
    }

    fn transition(&self, next: ToolbarState) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.state == next {
            return false;
        }
        tracing::debug!(target: "editor.toolbar", from = ?inner.state, to = ?next, "transition");
        inner.state = next;
        true
    }

    pub fn buttons(&self) -> Vec<ToolbarButton> {
        self.inner.borrow().buttons.clone()
    }

    pub fn button(&self, action: &str) -> Option<ToolbarButton> {
        self.inner
            .borrow()
            .buttons
            .iter()
            .find(|b| b.action == action)
            .cloned()
    }

    pub fn add_button(&self, button: ToolbarButton) {
        let mut inner = self.inner.borrow_mut();
        if !inner.buttons.iter().any(|b| b.action == button.action) {
            inner.buttons.push(button);
        }
    }

    pub fn set_active_buttons(&self, active: impl IntoIterator<Item = String>) {
        self.inner.borrow_mut().active = active.into_iter().collect();
    }

    pub fn active_buttons(&self) -> Vec<String> {
        self.inner.borrow().active.iter().cloned().collect()
    }

    pub fn is_button_active(&self, action: &str) -> bool {
        self.inner.borrow().active.contains(action)
    }
}
