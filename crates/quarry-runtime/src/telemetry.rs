use std::time::Duration;

/// Timed stages of loading and unloading a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Synthesize,
    Extract,
    Link,
    Unload,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Synthesize, Phase::Extract, Phase::Link, Phase::Unload];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Synthesize => "synthesize",
            Phase::Extract => "extract",
            Phase::Link => "link",
            Phase::Unload => "unload",
        }
    }
}

/// Receives per-phase durations from the streamer.
pub trait PhaseReporter {
    fn record(&mut self, phase: Phase, elapsed: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReporter;

impl PhaseReporter for NoopReporter {
    #[inline]
    fn record(&mut self, _phase: Phase, _elapsed: Duration) {}
}

/// Running mean per phase.
#[derive(Clone, Debug, Default)]
pub struct RunningAverages {
    samples: [u64; 4],
    mean_us: [f64; 4],
}

impl RunningAverages {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn samples(&self, phase: Phase) -> u64 {
        self.samples[phase.index()]
    }

    pub fn average(&self, phase: Phase) -> Option<Duration> {
        let i = phase.index();
        if self.samples[i] == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(self.mean_us[i] / 1_000_000.0))
    }
}

impl PhaseReporter for RunningAverages {
    fn record(&mut self, phase: Phase, elapsed: Duration) {
        let i = phase.index();
        self.samples[i] += 1;
        let x = elapsed.as_secs_f64() * 1_000_000.0;
        self.mean_us[i] += (x - self.mean_us[i]) / self.samples[i] as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_mean_tracks_samples() {
        let mut r = RunningAverages::new();
        assert_eq!(r.average(Phase::Extract), None);
        r.record(Phase::Extract, Duration::from_micros(100));
        r.record(Phase::Extract, Duration::from_micros(300));
        assert_eq!(r.samples(Phase::Extract), 2);
        let avg = r.average(Phase::Extract).unwrap();
        assert!((avg.as_secs_f64() - 200e-6).abs() < 1e-9);
        assert_eq!(r.samples(Phase::Link), 0);
    }
}
