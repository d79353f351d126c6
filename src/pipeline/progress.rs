//! Progress reporting
//!
//! Callers observe the pipeline through a `(message, percent)` callback.
//! Sinks must tolerate being called zero or many times and must never
//! block the pipeline; implementations are expected to be
//! fire-and-forget (log, channel send, atomic store).

/// Progress sink contract
pub trait ProgressSink: Send + Sync {
    /// Receive a human-readable stage message and an overall percent in
    /// `[0, 100]`
    fn report(&self, message: &str, percent: u8);
}

/// Sink that discards all progress
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _message: &str, _percent: u8) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn report(&self, message: &str, percent: u8) {
        self(message, percent);
    }
}

/// Maps a stage's local `[0, 100]` onto a slice of the overall range, so
/// the caller sees monotonically increasing progress across stages
pub struct StageProgress<'a> {
    inner: &'a dyn ProgressSink,
    from: u8,
    to: u8,
}

impl<'a> StageProgress<'a> {
    pub fn new(inner: &'a dyn ProgressSink, from: u8, to: u8) -> Self {
        debug_assert!(from <= to && to <= 100);
        Self { inner, from, to }
    }
}

impl ProgressSink for StageProgress<'_> {
    fn report(&self, message: &str, percent: u8) {
        let span = (self.to - self.from) as u16;
        let local = percent.min(100) as u16;
        let overall = self.from + (local * span / 100) as u8;
        self.inner.report(message, overall);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_stage_progress_scales_into_range() {
        let seen: Mutex<Vec<u8>> = Mutex::new(Vec::new());
        let sink = |_: &str, percent: u8| seen.lock().unwrap().push(percent);

        let stage = StageProgress::new(&sink, 0, 60);
        stage.report("extract", 0);
        stage.report("extract", 50);
        stage.report("extract", 100);

        let stage = StageProgress::new(&sink, 65, 100);
        stage.report("chunk", 100);

        assert_eq!(*seen.lock().unwrap(), vec![0, 30, 60, 100]);
    }

    #[test]
    fn test_stage_progress_clamps_overflow() {
        let seen: Mutex<Vec<u8>> = Mutex::new(Vec::new());
        let sink = |_: &str, percent: u8| seen.lock().unwrap().push(percent);
        let stage = StageProgress::new(&sink, 60, 65);
        stage.report("identifiers", 200);
        assert_eq!(*seen.lock().unwrap(), vec![65]);
    }
}
