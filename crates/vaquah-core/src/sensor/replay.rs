//! Replay adapters: lifecycle-only stand-ins for the camera and speech engines.
//!
//! Events are fed into the pipeline by the caller (a script, a test, or a host
//! bridge); these adapters only record `start`/`stop` so the coordination
//! logic can be observed. A shared [`StreamProbe`] exposes the counters.

use std::sync::{Arc, Mutex};

use super::{LandmarkStream, StreamRole, TranscriptStream};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamStats {
    pub starts: usize,
    pub stops: usize,
    pub running: bool,
    /// When set, `start()` fails as if permission was refused.
    pub deny: bool,
}

/// Shared view of a replay adapter's lifecycle counters.
#[derive(Debug, Default, Clone)]
pub struct StreamProbe(Arc<Mutex<StreamStats>>);

impl StreamProbe {
    pub fn stats(&self) -> StreamStats {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make subsequent `start()` calls fail.
    pub fn deny(&self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).deny = true;
    }

    fn start(&self, name: &str) -> anyhow::Result<()> {
        let mut stats = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if stats.deny {
            anyhow::bail!("{name}: permission denied");
        }
        stats.starts += 1;
        stats.running = true;
        log::debug!("{name}: started");
        Ok(())
    }

    fn stop(&self, name: &str) -> anyhow::Result<()> {
        let mut stats = self.0.lock().unwrap_or_else(|e| e.into_inner());
        stats.stops += 1;
        stats.running = false;
        log::debug!("{name}: stopped");
        Ok(())
    }
}

pub struct ReplayLandmarkStream {
    probe: StreamProbe,
}

impl ReplayLandmarkStream {
    pub fn new() -> Self {
        Self { probe: StreamProbe::default() }
    }

    pub fn with_probe(probe: StreamProbe) -> Self {
        Self { probe }
    }
}

impl Default for ReplayLandmarkStream {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkStream for ReplayLandmarkStream {
    fn start(&mut self) -> anyhow::Result<()> {
        self.probe.start("replay-camera")
    }
    fn stop(&mut self) -> anyhow::Result<()> {
        self.probe.stop("replay-camera")
    }
    fn name(&self) -> &str {
        "replay-camera"
    }
}

pub struct ReplayTranscriptStream {
    role: StreamRole,
    probe: StreamProbe,
}

impl ReplayTranscriptStream {
    pub fn new(role: StreamRole) -> Self {
        Self { role, probe: StreamProbe::default() }
    }

    pub fn with_probe(role: StreamRole, probe: StreamProbe) -> Self {
        Self { role, probe }
    }
}

impl TranscriptStream for ReplayTranscriptStream {
    fn start(&mut self) -> anyhow::Result<()> {
        let name = self.name().to_string();
        self.probe.start(&name)
    }
    fn stop(&mut self) -> anyhow::Result<()> {
        let name = self.name().to_string();
        self.probe.stop(&name)
    }
    fn name(&self) -> &str {
        match self.role {
            StreamRole::Command => "replay-command",
            StreamRole::Wake => "replay-wake",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_counts_lifecycle() {
        let probe = StreamProbe::default();
        let mut stream = ReplayLandmarkStream::with_probe(probe.clone());
        stream.start().unwrap();
        assert!(probe.stats().running);
        stream.stop().unwrap();
        let stats = probe.stats();
        assert_eq!((stats.starts, stats.stops, stats.running), (1, 1, false));
    }

    #[test]
    fn denied_probe_fails_start() {
        let probe = StreamProbe::default();
        probe.deny();
        let mut stream = ReplayTranscriptStream::with_probe(StreamRole::Command, probe.clone());
        let err = stream.start().unwrap_err().to_string();
        assert!(err.contains("replay-command"), "{err}");
        assert_eq!(probe.stats().starts, 0);
    }
}
