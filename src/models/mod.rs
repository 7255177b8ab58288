pub mod candidate;
pub mod group;
pub mod loaders;
pub mod mock;

pub use candidate::Candidate;
pub use group::Group;
pub use loaders::{load_audio_bytes, load_roster_text};
pub use mock::MOCK_ROSTER;
