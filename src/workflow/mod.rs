pub mod roster_session;

pub use roster_session::{AiAction, CleanOutcome, NamingOutcome, RosterSession};
