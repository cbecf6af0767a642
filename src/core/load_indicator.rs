//! The cosmetic "GPU" readout shown in the header while a request runs.
//!
//! Short prompts show a fixed band; long prompts ramp one unit every tick
//! until the gauge is full. The numbers are decorative and unrelated to any
//! real resource usage.

use std::time::{Duration, Instant};

use tokio_util::sync::{CancellationToken, DropGuard};

pub const GPU_TOTAL: u32 = 17;
pub const RAMP_START: u32 = 5;
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const SETTLE_HIGHLIGHT: Duration = Duration::from_millis(1500);

const SHORT_PROMPT_WORDS: usize = 40;
const LONG_PROMPT_WORDS: usize = 100;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEstimate {
    Band(&'static str),
    Ramp(u32),
}

impl LoadEstimate {
    pub fn for_prompt(text: &str) -> Self {
        match word_count(text) {
            n if n < SHORT_PROMPT_WORDS => LoadEstimate::Band("3-5"),
            n if n < LONG_PROMPT_WORDS => LoadEstimate::Band("5-10"),
            _ => LoadEstimate::Ramp(RAMP_START),
        }
    }

    pub fn needs_ticker(self) -> bool {
        matches!(self, LoadEstimate::Ramp(current) if current < GPU_TOTAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTone {
    Active,
    JustSettled,
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct LoadIndicator {
    estimate: Option<LoadEstimate>,
    settled_at: Option<Instant>,
}

impl LoadIndicator {
    /// Starts a new reading; returns whether a ramp ticker is needed.
    pub fn start(&mut self, prompt: &str) -> bool {
        let estimate = LoadEstimate::for_prompt(prompt);
        self.estimate = Some(estimate);
        self.settled_at = None;
        estimate.needs_ticker()
    }

    /// Advances a ramp by one unit. Returns `false` once the gauge is full
    /// or when nothing is ramping.
    pub fn tick(&mut self) -> bool {
        match &mut self.estimate {
            Some(LoadEstimate::Ramp(current)) if *current < GPU_TOTAL => {
                *current += 1;
                *current < GPU_TOTAL
            }
            _ => false,
        }
    }

    pub fn settle(&mut self, now: Instant) {
        if self.estimate.take().is_some() {
            self.settled_at = Some(now);
        }
    }

    pub fn text(&self) -> String {
        match self.estimate {
            None => format!("0/{GPU_TOTAL} GPU"),
            Some(LoadEstimate::Band(band)) => format!("{band} GPU"),
            Some(LoadEstimate::Ramp(current)) => format!("{current}/{GPU_TOTAL} GPU"),
        }
    }

    pub fn tone(&self, now: Instant) -> LoadTone {
        if self.estimate.is_some() {
            return LoadTone::Active;
        }
        match self.settled_at {
            Some(at) if now.saturating_duration_since(at) < SETTLE_HIGHLIGHT => {
                LoadTone::JustSettled
            }
            _ => LoadTone::Idle,
        }
    }
}

/// Spawns the ramp ticker. `on_tick` runs every [`TICK_INTERVAL`] until the
/// ramp is full, `on_tick` returns `false`, or the returned guard is dropped.
pub fn spawn_load_ticker<F>(mut on_tick: F) -> DropGuard
where
    F: FnMut() -> bool + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        for _ in RAMP_START..GPU_TOTAL {
            tokio::select! {
                biased;
                _ = child.cancelled() => return,
                _ = tokio::time::sleep(TICK_INTERVAL) => {}
            }
            if !on_tick() {
                return;
            }
        }
    });
    token.drop_guard()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn estimate_bands_follow_word_count() {
        assert_eq!(LoadEstimate::for_prompt(&words(39)), LoadEstimate::Band("3-5"));
        assert_eq!(LoadEstimate::for_prompt(&words(40)), LoadEstimate::Band("5-10"));
        assert_eq!(LoadEstimate::for_prompt(&words(99)), LoadEstimate::Band("5-10"));
        assert_eq!(LoadEstimate::for_prompt(&words(100)), LoadEstimate::Ramp(5));
        assert_eq!(word_count("  spaced \n out\twords "), 3);
    }

    #[test]
    fn indicator_ramps_to_full_and_settles() {
        let mut indicator = LoadIndicator::default();
        assert_eq!(indicator.text(), "0/17 GPU");
        assert!(indicator.start(&words(120)));
        assert_eq!(indicator.text(), "5/17 GPU");

        let mut ticks = 0;
        while indicator.tick() {
            ticks += 1;
        }
        assert_eq!(ticks, 11);
        assert_eq!(indicator.text(), "17/17 GPU");
        assert!(!indicator.tick());

        let now = Instant::now();
        indicator.settle(now);
        assert_eq!(indicator.text(), "0/17 GPU");
        assert_eq!(indicator.tone(now), LoadTone::JustSettled);
        assert_eq!(indicator.tone(now + SETTLE_HIGHLIGHT), LoadTone::Idle);
    }

    #[test]
    fn banded_readings_do_not_tick() {
        let mut indicator = LoadIndicator::default();
        assert!(!indicator.start("short prompt"));
        assert!(!indicator.tick());
        assert_eq!(indicator.text(), "3-5 GPU");
        assert_eq!(indicator.tone(Instant::now()), LoadTone::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_after_twelve_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let _guard = spawn_load_ticker(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(TICK_INTERVAL * 30).await;
        assert_eq!(count.load(Ordering::SeqCst), GPU_TOTAL - RAMP_START);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_guard_cancels_the_ticker() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let guard = spawn_load_ticker(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(TICK_INTERVAL * 2 + TICK_INTERVAL / 2).await;
        drop(guard);
        let before = count.load(Ordering::SeqCst);
        assert_eq!(before, 2);

        tokio::time::sleep(TICK_INTERVAL * 10).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }
}
