//! The live session: selection set, instrument tallies, undo log and cursors.
//!
//! All mutation goes through `&mut SessionState`, so interactions are
//! serialized by the borrow checker. Every handler absorbs invalid input
//! (unknown identity, out-of-range index, panel not `Ready`) as a no-op and
//! returns `false`; `true` means the caller should re-render.

use std::collections::{HashMap, HashSet};

use crate::history::{Action, ActionHistory};
use crate::source::ContentSourceError;

/// One of the two independently loaded collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Library,
    Instruments,
}

impl PanelKind {
    pub fn other(self) -> Self {
        match self {
            Self::Library => Self::Instruments,
            Self::Instruments => Self::Library,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Instruments => "instruments",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelStatus {
    #[default]
    Loading,
    Ready,
    Error(String),
}

impl PanelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Highlight index into a rendered list. Always `< len` for non-empty lists
/// and `0` for empty ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightCursor(usize);

impl HighlightCursor {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn clamp(&mut self, len: usize) {
        self.0 = if len == 0 { 0 } else { self.0.min(len - 1) };
    }

    pub fn move_to(&mut self, index: usize, len: usize) {
        self.0 = index;
        self.clamp(len);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Discrete user events fed back by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Select { panel: PanelKind, index: usize },
    Increment { panel: PanelKind, index: usize },
    Decrement { panel: PanelKind, index: usize },
    HighlightMoved { panel: PanelKind, index: usize },
    Undo,
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryRow<'a> {
    pub identity: &'a str,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentRow<'a> {
    pub identity: &'a str,
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    library_status: PanelStatus,
    library_entries: Vec<String>,
    selected: HashSet<String>,
    library_cursor: HighlightCursor,

    instruments_status: PanelStatus,
    instrument_entries: Vec<String>,
    tallies: HashMap<String, u32>,
    instruments_cursor: HighlightCursor,

    history: ActionHistory,
}

impl SessionState {
    /// Empty session with both panels `Loading`.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Loading ─────────────────────────────────────────────────────────

    /// Drop all entries, selections, tallies and history and put both panels
    /// back into `Loading`.
    pub fn begin_reload(&mut self) {
        *self = Self::new();
    }

    /// Install processed library identities, or record the panel's error.
    pub fn apply_library_load(&mut self, result: Result<Vec<String>, ContentSourceError>) {
        self.selected.clear();
        self.library_cursor.reset();
        self.history.clear();
        match result {
            Ok(entries) => {
                self.library_entries = entries;
                self.library_status = PanelStatus::Ready;
            }
            Err(err) => {
                self.library_entries.clear();
                self.library_status = PanelStatus::Error(err.to_string());
            }
        }
    }

    /// Install processed instrument identities with zeroed tallies, or record
    /// the panel's error.
    pub fn apply_instruments_load(&mut self, result: Result<Vec<String>, ContentSourceError>) {
        self.instruments_cursor.reset();
        self.history.clear();
        match result {
            Ok(entries) => {
                self.tallies = entries.iter().map(|entry| (entry.clone(), 0)).collect();
                self.instrument_entries = entries;
                self.instruments_status = PanelStatus::Ready;
            }
            Err(err) => {
                self.instrument_entries.clear();
                self.tallies.clear();
                self.instruments_status = PanelStatus::Error(err.to_string());
            }
        }
    }

    // ── Read access ─────────────────────────────────────────────────────

    pub fn status(&self, panel: PanelKind) -> &PanelStatus {
        match panel {
            PanelKind::Library => &self.library_status,
            PanelKind::Instruments => &self.instruments_status,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.library_status == PanelStatus::Loading
            || self.instruments_status == PanelStatus::Loading
    }

    pub fn entries(&self, panel: PanelKind) -> &[String] {
        match panel {
            PanelKind::Library => &self.library_entries,
            PanelKind::Instruments => &self.instrument_entries,
        }
    }

    pub fn cursor(&self, panel: PanelKind) -> usize {
        match panel {
            PanelKind::Library => self.library_cursor.index(),
            PanelKind::Instruments => self.instruments_cursor.index(),
        }
    }

    pub fn is_selected(&self, entry: &str) -> bool {
        self.selected.contains(entry)
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Missing identities count as zero.
    pub fn tally(&self, entry: &str) -> u32 {
        self.tallies.get(entry).copied().unwrap_or(0)
    }

    pub fn tallies(&self) -> &HashMap<String, u32> {
        &self.tallies
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn library_rows(&self) -> Vec<LibraryRow<'_>> {
        self.library_entries
            .iter()
            .map(|entry| LibraryRow {
                identity: entry,
                selected: self.selected.contains(entry),
            })
            .collect()
    }

    pub fn instrument_rows(&self) -> Vec<InstrumentRow<'_>> {
        self.instrument_entries
            .iter()
            .map(|entry| InstrumentRow {
                identity: entry,
                count: self.tally(entry),
            })
            .collect()
    }

    // ── Interaction handlers ────────────────────────────────────────────

    /// Flip membership of a known library identity and record the prior state.
    pub fn toggle_selection(&mut self, entry: &str) -> bool {
        if !self.library_status.is_ready() || !self.library_entries.iter().any(|e| e == entry) {
            return false;
        }
        let previous_state = !self.selected.insert(entry.to_string());
        if previous_state {
            self.selected.remove(entry);
        }
        self.history.push(Action::SelectionToggle {
            entry: entry.to_string(),
            previous_state,
        });
        self.clamp_cursors();
        true
    }

    /// Add `delta` to a known instrument tally, clamped at zero. A change that
    /// clamps away to nothing is not recorded.
    pub fn adjust_tally(&mut self, entry: &str, delta: i64) -> bool {
        if !self.instruments_status.is_ready() {
            return false;
        }
        match self.apply_tally(entry, delta) {
            Some(applied) => {
                self.history.push(Action::TallyAdjustment {
                    entry: entry.to_string(),
                    delta: applied,
                });
                self.clamp_cursors();
                true
            }
            None => false,
        }
    }

    /// Revert the most recent interaction without recording anything new.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.history.pop() else {
            return false;
        };
        match action {
            Action::SelectionToggle {
                entry,
                previous_state,
            } => {
                if previous_state {
                    self.selected.insert(entry);
                } else {
                    self.selected.remove(&entry);
                }
            }
            Action::TallyAdjustment { entry, delta } => {
                self.apply_tally(&entry, -delta);
            }
        }
        self.clamp_cursors();
        true
    }

    /// Deselect everything, zero every tally and forget the undo log.
    pub fn clear_all(&mut self) -> bool {
        let has_tallies = self.tallies.values().any(|count| *count > 0);
        if self.selected.is_empty() && !has_tallies {
            return false;
        }
        self.selected.clear();
        self.tallies.values_mut().for_each(|count| *count = 0);
        self.history.clear();
        self.clamp_cursors();
        true
    }

    /// Record where the host moved a panel's highlight. Never touches history.
    pub fn highlight_moved(&mut self, panel: PanelKind, index: usize) -> bool {
        if !self.status(panel).is_ready() {
            return false;
        }
        let len = self.entries(panel).len();
        let cursor = self.cursor_mut(panel);
        let before = *cursor;
        cursor.move_to(index, len);
        *cursor != before
    }

    /// Dispatch an index-based host event.
    pub fn apply(&mut self, interaction: Interaction) -> bool {
        match interaction {
            Interaction::Select { panel, index } => match panel {
                PanelKind::Library => self.toggle_at(index),
                PanelKind::Instruments => self.adjust_at(index, 1),
            },
            Interaction::Increment { panel, index } => match panel {
                PanelKind::Library => false,
                PanelKind::Instruments => self.adjust_at(index, 1),
            },
            Interaction::Decrement { panel, index } => match panel {
                PanelKind::Library => false,
                PanelKind::Instruments => self.adjust_at(index, -1),
            },
            Interaction::HighlightMoved { panel, index } => self.highlight_moved(panel, index),
            Interaction::Undo => self.undo(),
            Interaction::ClearAll => self.clear_all(),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn toggle_at(&mut self, index: usize) -> bool {
        let Some(entry) = self.library_entries.get(index).cloned() else {
            return false;
        };
        let moved = self.highlight_moved(PanelKind::Library, index);
        self.toggle_selection(&entry) || moved
    }

    fn adjust_at(&mut self, index: usize, delta: i64) -> bool {
        let Some(entry) = self.instrument_entries.get(index).cloned() else {
            return false;
        };
        let moved = self.highlight_moved(PanelKind::Instruments, index);
        self.adjust_tally(&entry, delta) || moved
    }

    /// Returns the applied delta, or `None` when nothing changed.
    fn apply_tally(&mut self, entry: &str, delta: i64) -> Option<i64> {
        let count = self.tallies.get_mut(entry)?;
        let current = i64::from(*count);
        let new = current.saturating_add(delta).clamp(0, i64::from(u32::MAX));
        if new == current {
            return None;
        }
        *count = u32::try_from(new).ok()?;
        Some(new - current)
    }

    fn cursor_mut(&mut self, panel: PanelKind) -> &mut HighlightCursor {
        match panel {
            PanelKind::Library => &mut self.library_cursor,
            PanelKind::Instruments => &mut self.instruments_cursor,
        }
    }

    fn clamp_cursors(&mut self) {
        self.library_cursor.clamp(self.library_entries.len());
        self.instruments_cursor.clamp(self.instrument_entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_session(library: &[&str], instruments: &[&str]) -> SessionState {
        let mut state = SessionState::new();
        state.apply_library_load(Ok(library.iter().map(|s| s.to_string()).collect()));
        state.apply_instruments_load(Ok(instruments.iter().map(|s| s.to_string()).collect()));
        state
    }

    #[test]
    fn new_session_is_loading_and_rejects_interaction() {
        let mut state = SessionState::new();
        assert!(state.is_loading());
        assert_eq!(state.status(PanelKind::Library), &PanelStatus::Loading);
        assert!(!state.toggle_selection("a"));
        assert!(!state.adjust_tally("tuba", 1));
        assert!(!state.highlight_moved(PanelKind::Library, 3));
        assert!(state.history().is_empty());
    }

    #[test]
    fn toggle_records_previous_state() {
        let mut state = ready_session(&["a", "b"], &[]);
        assert!(state.toggle_selection("a"));
        assert!(state.is_selected("a"));
        assert!(state.toggle_selection("a"));
        assert!(!state.is_selected("a"));
        assert_eq!(
            state.history().last(),
            Some(&Action::SelectionToggle {
                entry: "a".into(),
                previous_state: true,
            })
        );
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn toggle_unknown_entry_is_noop() {
        let mut state = ready_session(&["a"], &[]);
        assert!(!state.toggle_selection("zzz"));
        assert!(state.history().is_empty());
        assert!(state.selected().is_empty());
    }

    #[test]
    fn duplicate_library_rows_share_one_selection() {
        let mut state = ready_session(&["b", "a", "b"], &[]);
        assert!(state.apply(Interaction::Select {
            panel: PanelKind::Library,
            index: 2,
        }));
        assert_eq!(state.selected().len(), 1);
        let marked: Vec<bool> = state.library_rows().iter().map(|row| row.selected).collect();
        assert_eq!(marked, vec![true, false, true]);
        assert!(state.undo());
        assert!(state.selected().is_empty());
    }

    #[test]
    fn undo_restores_selection() {
        let mut state = ready_session(&["a", "b"], &[]);
        state.toggle_selection("b");
        state.toggle_selection("a");
        assert!(state.undo());
        assert!(!state.is_selected("a"));
        assert!(state.is_selected("b"));
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn decrement_at_zero_is_noop_without_history() {
        let mut state = ready_session(&[], &["tuba"]);
        assert!(!state.adjust_tally("tuba", -1));
        assert_eq!(state.tally("tuba"), 0);
        assert!(state.history().is_empty());
    }

    #[test]
    fn adjust_records_clamped_delta() {
        let mut state = ready_session(&[], &["tuba"]);
        state.adjust_tally("tuba", 2);
        assert!(state.adjust_tally("tuba", -5));
        assert_eq!(state.tally("tuba"), 0);
        assert_eq!(
            state.history().last(),
            Some(&Action::TallyAdjustment {
                entry: "tuba".into(),
                delta: -2,
            })
        );
        assert!(state.undo());
        assert_eq!(state.tally("tuba"), 2);
        assert!(state.undo());
        assert_eq!(state.tally("tuba"), 0);
        assert!(state.history().is_empty());
    }

    #[test]
    fn extreme_deltas_saturate_instead_of_overflowing() {
        let mut state = ready_session(&[], &["tuba"]);
        state.adjust_tally("tuba", 1);
        assert!(state.adjust_tally("tuba", i64::MAX));
        assert_eq!(state.tally("tuba"), u32::MAX);
        assert_eq!(
            state.history().last(),
            Some(&Action::TallyAdjustment {
                entry: "tuba".into(),
                delta: i64::from(u32::MAX) - 1,
            })
        );
        assert!(!state.adjust_tally("tuba", i64::MAX));

        assert!(state.adjust_tally("tuba", i64::MIN));
        assert_eq!(state.tally("tuba"), 0);
        assert!(!state.adjust_tally("tuba", i64::MIN));

        assert!(state.undo());
        assert_eq!(state.tally("tuba"), u32::MAX);
        assert!(state.undo());
        assert_eq!(state.tally("tuba"), 1);
    }

    #[test]
    fn adjust_unknown_instrument_is_noop() {
        let mut state = ready_session(&[], &["tuba"]);
        assert!(!state.adjust_tally("oboe", 1));
        assert_eq!(state.tally("oboe"), 0);
        assert!(state.tallies().get("oboe").is_none());
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut state = ready_session(&["a"], &["tuba"]);
        assert!(!state.undo());
    }

    #[test]
    fn clear_all_then_undo_does_nothing() {
        let mut state = ready_session(&["a"], &["tuba"]);
        state.toggle_selection("a");
        state.adjust_tally("tuba", 3);
        assert!(state.clear_all());
        assert!(state.selected().is_empty());
        assert_eq!(state.tally("tuba"), 0);
        assert!(state.tallies().contains_key("tuba"));
        assert!(!state.undo());
        assert!(state.selected().is_empty());
        assert_eq!(state.tally("tuba"), 0);
    }

    #[test]
    fn clear_all_on_clean_state_is_noop() {
        let mut state = ready_session(&["a"], &["tuba"]);
        state.adjust_tally("tuba", 1);
        state.undo();
        assert!(!state.clear_all());
    }

    #[test]
    fn error_panel_does_not_block_other_panel() {
        let mut state = SessionState::new();
        state.apply_library_load(Err(ContentSourceError::Other("boom".into())));
        state.apply_instruments_load(Ok(vec!["tuba".into()]));
        assert_eq!(state.status(PanelKind::Library).error_message(), Some("boom"));
        assert!(state.status(PanelKind::Instruments).is_ready());
        assert!(state.adjust_tally("tuba", 1));
        assert!(!state.apply(Interaction::Select {
            panel: PanelKind::Library,
            index: 0,
        }));
    }

    #[test]
    fn index_events_dispatch_to_handlers() {
        let mut state = ready_session(&["a", "b"], &["horn", "tuba"]);
        assert!(state.apply(Interaction::Select {
            panel: PanelKind::Library,
            index: 1,
        }));
        assert!(state.is_selected("b"));
        assert_eq!(state.cursor(PanelKind::Library), 1);

        assert!(state.apply(Interaction::Select {
            panel: PanelKind::Instruments,
            index: 1,
        }));
        assert!(state.apply(Interaction::Increment {
            panel: PanelKind::Instruments,
            index: 1,
        }));
        assert_eq!(state.tally("tuba"), 2);
        assert!(state.apply(Interaction::Decrement {
            panel: PanelKind::Instruments,
            index: 1,
        }));
        assert_eq!(state.tally("tuba"), 1);

        assert!(!state.apply(Interaction::Increment {
            panel: PanelKind::Library,
            index: 0,
        }));
        assert!(!state.apply(Interaction::Select {
            panel: PanelKind::Library,
            index: 9,
        }));
    }

    #[test]
    fn highlight_is_clamped_and_not_recorded() {
        let mut state = ready_session(&["a", "b", "c"], &[]);
        assert!(state.highlight_moved(PanelKind::Library, 10));
        assert_eq!(state.cursor(PanelKind::Library), 2);
        assert!(state.history().is_empty());
        assert!(!state.highlight_moved(PanelKind::Library, 2));
    }

    #[test]
    fn reload_resets_cursor_for_shorter_list() {
        let mut state = ready_session(&["a", "b", "c"], &["horn"]);
        state.highlight_moved(PanelKind::Library, 2);
        state.toggle_selection("c");
        state.apply_library_load(Ok(vec!["a".into()]));
        assert_eq!(state.cursor(PanelKind::Library), 0);
        assert!(state.selected().is_empty());
        assert!(state.history().is_empty());

        state.apply_library_load(Ok(vec![]));
        assert_eq!(state.cursor(PanelKind::Library), 0);
    }

    #[test]
    fn begin_reload_returns_to_loading() {
        let mut state = ready_session(&["a"], &["tuba"]);
        state.toggle_selection("a");
        state.begin_reload();
        assert!(state.is_loading());
        assert!(state.entries(PanelKind::Library).is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn rows_reflect_selection_and_counts() {
        let mut state = ready_session(&["a", "b"], &["tuba"]);
        state.toggle_selection("b");
        state.adjust_tally("tuba", 2);
        assert_eq!(
            state.library_rows(),
            vec![
                LibraryRow {
                    identity: "a",
                    selected: false,
                },
                LibraryRow {
                    identity: "b",
                    selected: true,
                },
            ]
        );
        assert_eq!(
            state.instrument_rows(),
            vec![InstrumentRow {
                identity: "tuba",
                count: 2,
            }]
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const LIBRARY: [&str; 4] = ["a", "B", "c", "D"];
    const INSTRUMENTS: [&str; 3] = ["horn", "tuba", "sax"];

    fn ready_session() -> SessionState {
        let mut state = SessionState::new();
        state.apply_library_load(Ok(LIBRARY.iter().map(|s| s.to_string()).collect()));
        state.apply_instruments_load(Ok(INSTRUMENTS.iter().map(|s| s.to_string()).collect()));
        state
    }

    fn arb_panel() -> impl Strategy<Value = PanelKind> {
        prop_oneof![Just(PanelKind::Library), Just(PanelKind::Instruments)]
    }

    fn arb_interaction() -> impl Strategy<Value = Interaction> {
        prop_oneof![
            (arb_panel(), 0usize..6).prop_map(|(panel, index)| Interaction::Select { panel, index }),
            (arb_panel(), 0usize..6)
                .prop_map(|(panel, index)| Interaction::Increment { panel, index }),
            (arb_panel(), 0usize..6)
                .prop_map(|(panel, index)| Interaction::Decrement { panel, index }),
            (arb_panel(), 0usize..10)
                .prop_map(|(panel, index)| Interaction::HighlightMoved { panel, index }),
            Just(Interaction::Undo),
            Just(Interaction::ClearAll),
        ]
    }

    proptest! {
        #[test]
        fn undo_reverts_last_toggle(toggles in prop::collection::vec(0usize..4, 1..20)) {
            let mut state = ready_session();
            let Some((last, earlier)) = toggles.split_last() else {
                return Ok(());
            };
            for index in earlier {
                state.toggle_selection(LIBRARY[*index]);
            }
            let before = state.selected().clone();
            state.toggle_selection(LIBRARY[*last]);
            prop_assert!(state.undo());
            prop_assert_eq!(state.selected(), &before);
        }

        #[test]
        fn tallies_never_negative_and_undo_restores(deltas in prop::collection::vec((0usize..3, -3i64..4), 0..30)) {
            let mut state = ready_session();
            for (index, delta) in deltas {
                let entry = INSTRUMENTS[index];
                let before = state.tally(entry);
                let history_before = state.history().len();
                let changed = state.adjust_tally(entry, delta);
                prop_assert_eq!(changed, state.history().len() == history_before + 1);
                if changed {
                    prop_assert!(state.undo());
                    prop_assert_eq!(state.tally(entry), before);
                    state.adjust_tally(entry, delta);
                }
            }
        }

        #[test]
        fn cursors_stay_in_bounds(events in prop::collection::vec(arb_interaction(), 0..40)) {
            let mut state = ready_session();
            for event in events {
                state.apply(event);
                prop_assert!(state.cursor(PanelKind::Library) < LIBRARY.len());
                prop_assert!(state.cursor(PanelKind::Instruments) < INSTRUMENTS.len());
                prop_assert!(state.tallies().len() == INSTRUMENTS.len());
            }
            state.apply_library_load(Ok(vec!["only".into()]));
            prop_assert_eq!(state.cursor(PanelKind::Library), 0);
            state.apply_instruments_load(Ok(vec![]));
            prop_assert_eq!(state.cursor(PanelKind::Instruments), 0);
        }
    }
}
