//! Progress reporting for long page-by-page work

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

impl Progress {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    /// 0.0 ..= 100.0; an empty job counts as done
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current.min(self.total) as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }

    pub fn message(&self) -> String {
        format!("Analyzing page {} of {}...", self.current, self.total)
    }
}

/// Receives progress updates
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(Progress),
{
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Sink that drops every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: Progress) {}
}
