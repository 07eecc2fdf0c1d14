//! In-memory catalog and audio backend shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::deezer::{Track, TrackSearch};
use crate::error::{AppError, Result};
use crate::playback::{AudioBackend, AudioSession};

/// Answers every query with one track titled after the query unless told otherwise.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    calls: Arc<Mutex<Vec<String>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    results: Arc<Mutex<HashMap<String, Vec<Track>>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeCatalog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn delay(&self, query: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(query.to_string(), delay);
    }

    pub fn respond(&self, query: &str, tracks: Vec<Track>) {
        self.results.lock().unwrap().insert(query.to_string(), tracks);
    }

    pub fn fail(&self, query: &str) {
        self.failing.lock().unwrap().insert(query.to_string());
    }
}

impl TrackSearch for FakeCatalog {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Track>>> + Send {
        let query = query.to_string();
        self.calls.lock().unwrap().push(query.clone());

        let delay = self.delays.lock().unwrap().get(&query).copied().unwrap_or_default();
        let failing = self.failing.lock().unwrap().contains(&query);
        let tracks = self
            .results
            .lock()
            .unwrap()
            .get(&query)
            .cloned()
            .unwrap_or_else(|| vec![Track::mock(1, &query, "Artist")]);

        async move {
            tokio::time::sleep(delay).await;
            if failing {
                Err(AppError::Proxy {
                    status: 500,
                    message: "Failed to fetch data from Deezer API".to_string(),
                })
            } else {
                Ok(tracks)
            }
        }
    }
}

/// Logs every session operation as `"<op> <track id>"` and tracks which
/// sessions are audible.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    log: Arc<Mutex<Vec<String>>>,
    live: Arc<Mutex<HashSet<u64>>>,
    ended: Arc<Mutex<HashSet<u64>>>,
    unplayable: HashSet<u64>,
}

impl RecordingBackend {
    /// A backend whose sessions for `track_ids` fail to start.
    pub fn with_unplayable(track_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            unplayable: track_ids.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn live(&self) -> HashSet<u64> {
        self.live.lock().unwrap().clone()
    }

    /// Marks the track's session as having reached its natural end.
    pub fn finish(&self, track_id: u64) {
        self.ended.lock().unwrap().insert(track_id);
    }
}

pub struct RecordingSession {
    track_id: u64,
    backend: RecordingBackend,
    fails: bool,
}

impl RecordingSession {
    fn record(&self, event: &str) {
        self.backend
            .log
            .lock()
            .unwrap()
            .push(format!("{} {}", event, self.track_id));
    }
}

impl AudioSession for RecordingSession {
    fn play(&mut self) -> Result<()> {
        if self.fails {
            self.record("play-failed");
            return Err(AppError::Playback("autoplay blocked".into()));
        }
        self.record("play");
        self.backend.live.lock().unwrap().insert(self.track_id);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record("pause");
        self.backend.live.lock().unwrap().remove(&self.track_id);
        Ok(())
    }

    fn has_ended(&mut self) -> bool {
        self.backend.ended.lock().unwrap().remove(&self.track_id)
    }

    fn stop(&mut self) {
        self.record("stop");
        self.backend.live.lock().unwrap().remove(&self.track_id);
    }
}

impl AudioBackend for RecordingBackend {
    type Session = RecordingSession;

    fn open(&mut self, track: &Track) -> Result<RecordingSession> {
        self.log.lock().unwrap().push(format!("open {}", track.id));
        Ok(RecordingSession {
            track_id: track.id,
            backend: self.clone(),
            fails: self.unplayable.contains(&track.id),
        })
    }
}
