pub mod roster_loader;

pub use roster_loader::{load_audio_bytes, load_roster_text};
