pub mod browser;
pub mod config;
pub mod deezer;
pub mod error;
pub mod logging;
pub mod playback;
pub mod proxy;
pub mod search;
pub mod view;

#[cfg(test)]
mod testing;

pub use browser::Browser;
pub use config::Config;
pub use deezer::{ProxyClient, Track, TrackSearch};
pub use error::{AppError, Result};
pub use playback::{ExternalPlayer, PlaybackController, PlaybackState, RodioBackend};
pub use proxy::{ProxyState, create_router};
pub use search::{SearchController, SearchState};
pub use view::{TrackListView, TrackRow};
