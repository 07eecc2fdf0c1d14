//! Interactive terminal client: search box, result list and preview playback.

use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::deezer::TrackSearch;
use crate::error::Result;
use crate::playback::{AudioBackend, PlaybackController};
use crate::search::{SearchController, SearchEvent};
use crate::view::TrackListView;
use crate::view::terminal::{Screen, render};

const TICK: Duration = Duration::from_millis(250);
const INPUT_POLL: Duration = Duration::from_millis(100);

pub struct Browser<S: TrackSearch, B: AudioBackend> {
    search: SearchController<S>,
    playback: PlaybackController<B>,
    cursor: usize,
    should_quit: bool,
}

impl<S: TrackSearch, B: AudioBackend> Browser<S, B> {
    pub fn new(search: SearchController<S>, playback: PlaybackController<B>) -> Self {
        Self {
            search,
            playback,
            cursor: 0,
            should_quit: false,
        }
    }

    pub fn search(&self) -> &SearchController<S> {
        &self.search
    }

    pub fn playback(&self) -> &PlaybackController<B> {
        &self.playback
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view(&self) -> TrackListView {
        TrackListView::build(self.search.state(), &self.playback.state())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(c) => {
                let mut query = self.search.state().query.clone();
                query.push(c);
                self.search.input(query);
            }
            KeyCode::Backspace => {
                let mut query = self.search.state().query.clone();
                if query.pop().is_some() {
                    self.search.input(query);
                }
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                let last = self.search.state().tracks.len().saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
            }
            KeyCode::Enter => self.activate(),
            _ => {}
        }
    }

    /// Play/pause control of the row under the cursor.
    fn activate(&mut self) {
        let Some(row) = self.view().rows().get(self.cursor).cloned() else {
            return;
        };
        let Some(track) = self
            .search
            .state()
            .tracks
            .iter()
            .find(|t| t.id == row.track_id)
            .cloned()
        else {
            return;
        };

        self.playback.select_or_toggle(&track);
    }

    pub fn on_search_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Started(ticket) => {
                debug!(query = %ticket.query, "Search started");
                self.cursor = 0;
            }
            SearchEvent::Applied(ticket) => {
                debug!(query = %ticket.query, "Search results shown");
                self.cursor = 0;
            }
            SearchEvent::Discarded(_) => {}
        }
    }

    /// Periodic work between input events.
    pub fn tick(&mut self) {
        self.playback.poll_ended();
    }

    pub fn status_line(&self) -> String {
        match self.playback.current_track() {
            Some(track) if self.playback.state().playing => {
                format!("▶ {}", track.display_label())
            }
            Some(track) => format!("⏸ {}", track.display_label()),
            None => "Nothing playing".to_string(),
        }
    }

    pub async fn run(
        mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        mut events: mpsc::Receiver<Event>,
    ) -> Result<()> {
        self.search.start();
        let mut ticker = tokio::time::interval(TICK);

        loop {
            let list = self.view();
            let status = self.status_line();
            terminal.draw(|frame| {
                render(
                    frame,
                    &Screen {
                        query: &self.search.state().query,
                        list: &list,
                        cursor: self.cursor,
                        status: &status,
                    },
                )
            })?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                event = events.recv() => match event {
                    Some(Event::Key(key)) => self.handle_key(key),
                    Some(_) => {}
                    None => {
                        warn!("Terminal input closed");
                        break;
                    }
                },
                event = self.search.next_event() => self.on_search_event(event),
                _ = ticker.tick() => self.tick(),
            }
        }

        info!("Leaving browser");
        self.playback.stop();
        Ok(())
    }
}

/// Reads terminal events on a dedicated thread until the receiver is dropped.
pub fn spawn_input_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel(64);

    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read terminal event: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
        }
    });

    rx
}
