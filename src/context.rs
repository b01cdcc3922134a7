//! Service context that bundles the port trait objects a node needs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::banana::BananaClient;
use crate::adapters::recording::image_fetcher::RecordingImageFetcher;
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::replaying::image_fetcher::ReplayingImageFetcher;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::BananaError;
use crate::ports::{ImageFetcher, ImageGenerator};

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Posts generation requests.
    pub generator: Box<dyn ImageGenerator>,
    /// Downloads images for URL-shaped responses.
    pub fetcher: Box<dyn ImageFetcher>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if adapters still hold the recorder or the cassette
    /// file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapters still hold references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Assemble a context from arbitrary port implementations.
    #[must_use]
    pub fn new(generator: Box<dyn ImageGenerator>, fetcher: Box<dyn ImageFetcher>) -> Self {
        Self { generator, fetcher }
    }

    /// Create a live context talking to the configured endpoint.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        let client = BananaClient::new(config.api.endpoint.clone());
        Self::new(Box::new(client.clone()), Box::new(client))
    }

    /// Create a recording context that wraps the live adapters.
    #[must_use]
    pub fn recording(config: &Config) -> (Self, RecordingSession) {
        let live = Self::live(config);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".banana/cassettes")
            .join(&timestamp)
            .join("session.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-session"),
            get_commit_hash(),
        )));

        let ctx = Self::new(
            Box::new(RecordingImageGenerator::new(live.generator, Arc::clone(&recorder))),
            Box::new(RecordingImageFetcher::new(live.fetcher, Arc::clone(&recorder))),
        );
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, BananaError> {
        let replayer = load_cassette(path)
            .map_err(|e| BananaError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self::new(
            Box::new(ReplayingImageGenerator::new(Arc::clone(&replayer))),
            Box::new(ReplayingImageFetcher::new(replayer)),
        ))
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
