use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;

/// Notification delivered to author-supplied field hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// The user typed into a scalar input.
    Input {
        /// Field name.
        field: String,
        /// Value after coercion.
        value: Value,
    },
    /// A scalar value was committed.
    Change {
        /// Field name.
        field: String,
        /// Value after coercion.
        value: Value,
    },
    /// A chip is about to be added, or a scalar control was clicked.
    Click {
        /// Field name.
        field: String,
        /// Chip text or clicked value.
        value: Value,
    },
    /// A chip is about to be removed.
    Remove {
        /// Field name.
        field: String,
        /// Chip position.
        index: usize,
        /// Chip text.
        value: Value,
    },
    /// The input lost focus.
    Blur {
        /// Field name.
        field: String,
    },
    /// The input gained focus.
    Focus {
        /// Field name.
        field: String,
    },
}

impl FieldEvent {
    /// Returns the stable event name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Change { .. } => "change",
            Self::Click { .. } => "click",
            Self::Remove { .. } => "remove",
            Self::Blur { .. } => "blur",
            Self::Focus { .. } => "focus",
        }
    }
}

/// Observer callback attached to a field.
///
/// Hooks are notified but never own state changes; the schema engine applies
/// every mutation itself.
#[derive(Clone)]
pub struct EventHook(Arc<dyn Fn(&FieldEvent) + Send + Sync>);

impl EventHook {
    /// Wraps a closure as an event hook.
    pub fn new(hook: impl Fn(&FieldEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    /// Delivers one event to the hook.
    pub fn notify(&self, event: &FieldEvent) {
        (self.0)(event);
    }
}

impl Debug for EventHook {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("EventHook(..)")
    }
}

impl PartialEq for EventHook {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Hooks for scalar inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldEvents {
    /// Fired on each keystroke-level update.
    pub input: Option<EventHook>,
    /// Fired when a value is committed.
    pub change: Option<EventHook>,
    /// Fired on click.
    pub click: Option<EventHook>,
    /// Fired on blur.
    pub blur: Option<EventHook>,
    /// Fired on focus.
    pub focus: Option<EventHook>,
}

impl FieldEvents {
    /// Returns the hook registered for an event, if any.
    #[must_use]
    pub fn hook_for(&self, event: &FieldEvent) -> Option<&EventHook> {
        match event {
            FieldEvent::Input { .. } => self.input.as_ref(),
            FieldEvent::Change { .. } => self.change.as_ref(),
            FieldEvent::Click { .. } => self.click.as_ref(),
            FieldEvent::Blur { .. } => self.blur.as_ref(),
            FieldEvent::Focus { .. } => self.focus.as_ref(),
            FieldEvent::Remove { .. } => None,
        }
    }
}

/// Hooks for chip add/remove on array fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChipEvents {
    /// Fired before a chip is appended.
    pub click: Option<EventHook>,
    /// Fired before a chip is removed.
    pub remove: Option<EventHook>,
}
