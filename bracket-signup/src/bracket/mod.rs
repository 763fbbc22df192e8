pub mod types;
pub mod progression;
pub mod state;

pub use types::{Occupant, ScoreTable, Slot, StateResponse};
pub use progression::ProgressionGraph;
pub use state::{read_state, slot_view, DEFAULT_ROOT_COUNT};
