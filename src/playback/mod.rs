pub mod controller;
pub mod session;
pub mod stream;

pub use controller::{PlaybackController, PlaybackState};
pub use session::{AudioBackend, AudioSession, ExternalPlayer, ProcessSession};
pub use stream::{RodioBackend, SinkSession};
