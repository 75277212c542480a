//! The audio output seam, and its `rodio` implementation.
//!
//! Opening/decoding happens here; a voice comes back paused at the requested
//! start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::EngineError;

/// One opened item on an output.
pub(super) trait Voice {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    /// Whether every sample has been played.
    fn is_finished(&self) -> bool;
}

/// Where the audio thread opens queue items.
pub(super) trait Output {
    type Voice: Voice;

    fn open(
        &self,
        path: &Path,
        start_at: Duration,
        volume: f32,
    ) -> Result<Opened<Self::Voice>, EngineError>;
}

pub(super) struct Opened<V> {
    pub voice: V,
    /// Length reported by the decoder, when the container knows it.
    pub total: Option<Duration>,
}

impl Voice for Sink {
    fn play(&self) {
        Sink::play(self);
    }

    fn pause(&self) {
        Sink::pause(self);
    }

    fn stop(&self) {
        Sink::stop(self);
    }

    fn is_finished(&self) -> bool {
        self.empty()
    }
}

impl Output for OutputStream {
    type Voice = Sink;

    fn open(
        &self,
        path: &Path,
        start_at: Duration,
        volume: f32,
    ) -> Result<Opened<Sink>, EngineError> {
        create_sink_at(self, path, start_at, volume)
    }
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<Opened<Sink>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let total = decoder.total_duration();
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(Opened { voice: sink, total })
}
