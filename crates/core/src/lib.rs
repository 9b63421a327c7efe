//! Session state engine for the bandbox terminal client.
//!
//! Owns selection and tally state, the undo log, the parallel panel load and
//! the read-only detail projection. Rendering and the concrete content source
//! live in other crates.

pub mod entries;
pub mod flight;
pub mod history;
pub mod projection;
pub mod session;
pub mod source;
pub mod startup;

pub use flight::{FlightPermit, SingleFlight};
pub use history::{Action, ActionHistory};
pub use projection::{project, DetailProjection, ProjectionLabels};
pub use session::{
    HighlightCursor, InstrumentRow, Interaction, LibraryRow, PanelKind, PanelStatus, SessionState,
};
pub use source::{ContentSource, ContentSourceError};
pub use startup::{PanelLoad, StartupOrchestrator, StartupOutcome, StartupPlan, StartupRun};
