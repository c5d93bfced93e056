//! Tool selection for the grading canvas.

use crate::mark::MarkKind;
use serde::{Deserialize, Serialize};

/// Single-choice selector for the mark kind new gestures create.
///
/// `None` means pointer gestures on empty surface do nothing. Selecting
/// the active kind again toggles back to `None`; selecting a different
/// kind replaces it atomically. There are no automatic transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSelector {
    current: Option<MarkKind>,
}

impl ToolSelector {
    /// Create a selector with no active tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a tool, or toggle it off when it is already active.
    pub fn select(&mut self, kind: MarkKind) {
        if self.current == Some(kind) {
            self.current = None;
        } else {
            self.current = Some(kind);
        }
    }

    /// The currently active tool, if any.
    pub fn current(&self) -> Option<MarkKind> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        let mut tools = ToolSelector::new();
        assert_eq!(tools.current(), None);

        tools.select(MarkKind::Strike);
        assert_eq!(tools.current(), Some(MarkKind::Strike));
    }

    #[test]
    fn test_same_kind_toggles_off() {
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Check);
        tools.select(MarkKind::Check);
        assert_eq!(tools.current(), None);
    }

    #[test]
    fn test_switch_replaces() {
        let mut tools = ToolSelector::new();
        tools.select(MarkKind::Strike);
        tools.select(MarkKind::Reviewed);
        assert_eq!(tools.current(), Some(MarkKind::Reviewed));
    }
}
