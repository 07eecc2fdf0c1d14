//! Track list rendering.
//!
//! [`TrackListView::build`] is a pure mapping from search and playback
//! state to what the list shows. The terminal front-end draws it; nothing
//! here holds state of its own.

pub mod terminal;

use crate::deezer::Track;
use crate::playback::PlaybackState;
use crate::search::{SearchPhase, SearchState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub track_id: u64,
    pub title: String,
    pub artist: String,
    pub playing: bool,
}

impl TrackRow {
    pub fn from_track(track: &Track, playback: &PlaybackState) -> Self {
        Self {
            track_id: track.id,
            title: track.title.clone(),
            artist: track.artist.name.clone(),
            playing: playback.is_playing(track.id),
        }
    }

    pub fn label(&self) -> String {
        format!("{} — {}", self.title, self.artist)
    }

    /// Icon for the row's play/pause control.
    pub fn control(&self) -> &'static str {
        if self.playing { "⏸" } else { "▶" }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackListView {
    Loading,
    Error(String),
    Empty(String),
    Rows(Vec<TrackRow>),
}

impl TrackListView {
    pub fn build(search: &SearchState, playback: &PlaybackState) -> Self {
        match &search.phase {
            SearchPhase::Idle | SearchPhase::Loading => TrackListView::Loading,
            SearchPhase::Error(message) => TrackListView::Error(message.clone()),
            SearchPhase::Success => match search.empty_notice() {
                Some(notice) => TrackListView::Empty(notice),
                None => TrackListView::Rows(
                    search
                        .tracks
                        .iter()
                        .map(|track| TrackRow::from_track(track, playback))
                        .collect(),
                ),
            },
        }
    }

    pub fn rows(&self) -> &[TrackRow] {
        match self {
            TrackListView::Rows(rows) => rows,
            _ => &[],
        }
    }
}
