//! In-process preview playback with `rodio`.
//!
//! Each session owns one [`Sink`]. The preview is downloaded and decoded on a
//! background task and appended to the sink once ready; pausing and resuming
//! act on the sink, so a resumed preview continues where it stopped.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Client;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::deezer::Track;
use crate::error::{AppError, Result};
use crate::playback::session::{AudioBackend, AudioSession};

type PreviewSource = Decoder<Cursor<Vec<u8>>>;

/// Plays previews on the default output device.
///
/// The device is opened on first use, so a machine without audio only fails
/// when a track is selected.
pub struct RodioBackend {
    http_client: Client,
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            output: None,
        }
    }

    fn output_handle(&mut self) -> Result<&OutputStreamHandle> {
        let output = match self.output.take() {
            Some(output) => output,
            None => {
                let output = OutputStream::try_default().map_err(|e| {
                    AppError::Playback(format!("no audio output device: {}", e))
                })?;
                info!("Opened default audio output");
                output
            }
        };

        Ok(&self.output.insert(output).1)
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    type Session = SinkSession;

    fn open(&mut self, track: &Track) -> Result<SinkSession> {
        if track.preview.is_empty() {
            return Err(AppError::Playback(format!(
                "track {} has no preview URL",
                track.id
            )));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Playback(format!("no async runtime to load preview: {}", e)))?;

        let sink = Sink::try_new(self.output_handle()?)
            .map_err(|e| AppError::Playback(format!("could not create audio sink: {}", e)))?;
        // Stays silent until the controller calls play.
        sink.pause();

        let sink = Arc::new(sink);
        let loaded = Arc::new(AtomicBool::new(false));

        let loader = runtime.spawn(load_preview(
            self.http_client.clone(),
            track.preview.clone(),
            Arc::clone(&sink),
            Arc::clone(&loaded),
        ));

        Ok(SinkSession {
            sink,
            loaded,
            loader: Some(loader),
        })
    }
}

async fn load_preview(client: Client, url: String, sink: Arc<Sink>, loaded: Arc<AtomicBool>) {
    match fetch_preview(&client, &url).await {
        Ok(source) => {
            debug!(url = %url, "Preview loaded");
            sink.append(source);
        }
        Err(e) => warn!(url = %url, "Error loading preview: {}", e),
    }

    loaded.store(true, Ordering::Release);
}

async fn fetch_preview(client: &Client, url: &str) -> Result<PreviewSource> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    Decoder::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::Playback(format!("could not decode preview: {}", e)))
}

/// One preview queued on a sink.
pub struct SinkSession {
    sink: Arc<Sink>,
    loaded: Arc<AtomicBool>,
    loader: Option<JoinHandle<()>>,
}

impl AudioSession for SinkSession {
    fn play(&mut self) -> Result<()> {
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.sink.pause();
        Ok(())
    }

    /// A preview that failed to load counts as ended, so the selection clears.
    fn has_ended(&mut self) -> bool {
        self.loaded.load(Ordering::Acquire) && self.sink.empty()
    }

    fn stop(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.abort();
        }
        self.sink.stop();
    }
}

impl Drop for SinkSession {
    fn drop(&mut self) {
        self.stop();
    }
}
