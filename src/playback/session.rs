use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::deezer::Track;
use crate::error::{AppError, Result};

/// One track's audio, owned by the playback controller.
pub trait AudioSession: Send {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    /// True once playback finished on its own. Reported once per run.
    fn has_ended(&mut self) -> bool;
    /// Releases the underlying resource. Must not block on playback.
    fn stop(&mut self);
}

pub trait AudioBackend {
    type Session: AudioSession;

    fn open(&mut self, track: &Track) -> Result<Self::Session>;
}

/// Plays previews by running a command-line player on the preview URL.
///
/// A player process cannot be suspended portably, so pausing ends it and
/// playing again restarts the preview. [`RodioBackend`] resumes in place.
///
/// [`RodioBackend`]: crate::playback::RodioBackend
#[derive(Debug, Clone)]
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
}

impl ExternalPlayer {
    pub fn new(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::Config("player command is empty".into()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl AudioBackend for ExternalPlayer {
    type Session = ProcessSession;

    fn open(&mut self, track: &Track) -> Result<ProcessSession> {
        if track.preview.is_empty() {
            return Err(AppError::Playback(format!(
                "track {} has no preview URL",
                track.id
            )));
        }

        Ok(ProcessSession {
            program: self.program.clone(),
            args: self.args.clone(),
            url: track.preview.clone(),
            child: None,
        })
    }
}

/// A player process for one preview URL.
///
/// Pausing ends the process; playing again restarts the preview from the top.
#[derive(Debug)]
pub struct ProcessSession {
    program: String,
    args: Vec<String>,
    url: String,
    child: Option<Child>,
}

impl ProcessSession {
    fn terminate(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            debug!("Stopping {} (pid {})", self.program, child.id());
            if child.try_wait()?.is_none() {
                child.kill()?;
            }
            child.wait()?;
        }
        Ok(())
    }
}

impl AudioSession for ProcessSession {
    fn play(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Playback(format!("failed to start {}: {}", self.program, e)))?;

        debug!("Started {} (pid {}) for {}", self.program, child.id(), self.url);
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.terminate()
    }

    fn has_ended(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                if status.success() {
                    debug!("{} exited with {}", self.program, status);
                } else {
                    warn!(url = %self.url, "{} failed with {}", self.program, status);
                }
                self.child = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Could not poll {}: {}", self.program, e);
                false
            }
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.terminate() {
            warn!("Failed to stop {}: {}", self.program, e);
        }
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        self.stop();
    }
}
