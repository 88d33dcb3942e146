use std::time::Instant;
use tracing::{debug, info};

/// Logs how long a run phase took when dropped.
pub struct Timer {
    phase: String,
    start: Instant,
}

impl Timer {
    pub fn start(phase: impl Into<String>) -> Self {
        let phase = phase.into();
        debug!("⏱  {} started", phase);
        Self {
            phase,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("⏱  {} finished in {:.2?}", self.phase, self.start.elapsed());
    }
}

/// Thousands separators for counts in summaries: 12345 → "12,345".
pub fn fmt_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
