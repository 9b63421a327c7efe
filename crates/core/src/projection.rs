//! Read-only summaries derived from [`SessionState`].
//!
//! Recomputed in full after every change; nothing here is cached.

use crate::entries::cmp_identity;
use crate::session::{PanelKind, SessionState};

/// Strings used when rendering summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionLabels {
    pub selection_heading: String,
    pub selection_placeholder: String,
    pub tally_heading: String,
    pub tally_placeholder: String,
    pub detail_placeholder: String,
    pub detail_error: String,
}

impl Default for ProjectionLabels {
    fn default() -> Self {
        Self {
            selection_heading: "Selected items".to_string(),
            selection_placeholder: "No items selected.".to_string(),
            tally_heading: "Instrument counts".to_string(),
            tally_placeholder: "No instruments counted.".to_string(),
            detail_placeholder: "Select an item to see its metadata and preview details."
                .to_string(),
            detail_error: "Unable to show details.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSummary {
    pub identities: Vec<String>,
}

impl SelectionSummary {
    pub fn count(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn render(&self, heading: &str, placeholder: &str) -> String {
        if self.is_empty() {
            return placeholder.to_string();
        }
        format!(
            "{heading} ({}):\n{}",
            self.count(),
            self.identities.join("\n")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TallySummary {
    pub counts: Vec<(String, u32)>,
}

impl TallySummary {
    pub fn count(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.counts
            .iter()
            .map(|(identity, count)| format!("{identity}: {count}"))
            .collect()
    }

    pub fn render(&self, heading: &str, placeholder: &str) -> String {
        if self.is_empty() {
            return placeholder.to_string();
        }
        format!("{heading} ({}):\n{}", self.count(), self.lines().join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailProjection {
    pub selection: SelectionSummary,
    pub tallies: TallySummary,
    pub library_failed: bool,
}

impl DetailProjection {
    /// Text for the combined detail panel: the detail placeholder when nothing
    /// is selected or counted, otherwise both summaries (each falling back to
    /// its own placeholder) separated by a blank line. The error text wins
    /// while the library panel is failed.
    pub fn render_detail(&self, labels: &ProjectionLabels) -> String {
        if self.library_failed {
            return labels.detail_error.clone();
        }
        if self.selection.is_empty() && self.tallies.is_empty() {
            return labels.detail_placeholder.clone();
        }
        format!("{}\n\n{}", self.selection_text(labels), self.tally_text(labels))
    }

    pub fn selection_text(&self, labels: &ProjectionLabels) -> String {
        self.selection
            .render(&labels.selection_heading, &labels.selection_placeholder)
    }

    pub fn tally_text(&self, labels: &ProjectionLabels) -> String {
        self.tallies
            .render(&labels.tally_heading, &labels.tally_placeholder)
    }
}

pub fn project(state: &SessionState) -> DetailProjection {
    let mut identities: Vec<String> = state.selected().iter().cloned().collect();
    identities.sort_by(|a, b| cmp_identity(a, b).then_with(|| a.cmp(b)));

    let mut counts: Vec<(String, u32)> = state
        .tallies()
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(identity, count)| (identity.clone(), *count))
        .collect();
    counts.sort_by(|(a, _), (b, _)| cmp_identity(a, b).then_with(|| a.cmp(b)));

    DetailProjection {
        selection: SelectionSummary { identities },
        tallies: TallySummary { counts },
        library_failed: state.status(PanelKind::Library).error_message().is_some(),
    }
}
