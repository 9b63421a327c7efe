/// A single undoable interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Membership of `entry` in the selected set *before* the toggle.
    SelectionToggle { entry: String, previous_state: bool },
    /// Applied (post-clamp) tally change; never zero.
    TallyAdjustment { entry: String, delta: i64 },
}

/// Linear undo log: push on interaction, pop on undo, cleared on reload/clear.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    actions: Vec<Action>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.actions.pop()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn last(&self) -> Option<&Action> {
        self.actions.last()
    }
}
