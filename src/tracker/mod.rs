//! Interview round tracking.
//!
//! - **Progress**: a candidate's ordered rounds (`models::progress`)
//! - **Decisions**: what the operator asks for (`Decision`)
//! - **Events**: what happened as a result (`ProgressEvent`)
//! - **Transition**: pure `(progress, decision) -> (progress, events)`
//!
//! Layout, statistics and the template editor are pure helpers over the
//! same data. Services wire these to storage and notifications.

pub mod config_editor;
pub mod error;
pub mod event;
pub mod layout;
pub mod stats;
pub mod transition;

pub use config_editor::{EditorOptions, RoundConfigEditor};
pub use error::{InvalidState, TrackerError};
pub use event::ProgressEvent;
pub use layout::{layout_for, GridCell, LayoutPolicy, RoundLayout};
pub use stats::{PipelineSummary, ProgressStats};
pub use transition::{apply, Decision, Transition};
