use tracing::{info, warn};

use crate::deezer::Track;
use crate::playback::session::{AudioBackend, AudioSession};

/// Which track is selected and whether it is audible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub selected: Option<u64>,
    pub playing: bool,
}

impl PlaybackState {
    pub fn is_playing(&self, track_id: u64) -> bool {
        self.playing && self.selected == Some(track_id)
    }
}

/// Owns the single active audio session.
///
/// Selecting a different track tears down the previous session before the
/// new one starts, so at most one track is ever playing. When playback ends
/// on its own the selection is cleared.
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    state: PlaybackState,
    current: Option<Track>,
    session: Option<B::Session>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: PlaybackState::default(),
            current: None,
            session: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// The single control exposed per track: toggles the selected track,
    /// selects and starts any other.
    pub fn select_or_toggle(&mut self, track: &Track) -> PlaybackState {
        if self.state.selected == Some(track.id) {
            self.toggle();
        } else {
            self.select(track);
        }
        self.state
    }

    /// Makes `track` the selection and starts it.
    pub fn select(&mut self, track: &Track) {
        self.release();

        info!(track_id = track.id, title = %track.title, "Selecting track");
        self.state = PlaybackState {
            selected: Some(track.id),
            playing: false,
        };
        self.current = Some(track.clone());

        match self.backend.open(track) {
            Ok(session) => {
                self.session = Some(session);
                self.start();
            }
            Err(e) => warn!(track_id = track.id, "Error opening audio: {}", e),
        }
    }

    /// Flips play/pause on the current selection. No-op without a selection.
    pub fn toggle(&mut self) {
        if self.state.selected.is_none() {
            return;
        }

        if self.state.playing {
            self.halt();
        } else {
            self.start();
        }
    }

    /// Natural end of the preview.
    pub fn on_ended(&mut self) {
        info!(track_id = ?self.state.selected, "Playback ended");
        self.stop();
    }

    /// Checks the active session for a natural end. Returns `true` if it ended.
    pub fn poll_ended(&mut self) -> bool {
        let ended = self.state.playing
            && self
                .session
                .as_mut()
                .is_some_and(|session| session.has_ended());

        if ended {
            self.on_ended();
        }
        ended
    }

    /// Releases the audio session and clears the selection.
    pub fn stop(&mut self) {
        self.release();
        self.state = PlaybackState::default();
        self.current = None;
    }

    fn start(&mut self) {
        let Some(session) = self.session.as_mut() else {
            warn!(track_id = ?self.state.selected, "No audio session to play");
            return;
        };

        match session.play() {
            Ok(()) => self.state.playing = true,
            Err(e) => warn!(track_id = ?self.state.selected, "Error playing audio: {}", e),
        }
    }

    fn halt(&mut self) {
        let Some(session) = self.session.as_mut() else {
            self.state.playing = false;
            return;
        };

        match session.pause() {
            Ok(()) => self.state.playing = false,
            Err(e) => warn!(track_id = ?self.state.selected, "Error pausing audio: {}", e),
        }
    }

    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
    }
}

impl<B: AudioBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.release();
    }
}
