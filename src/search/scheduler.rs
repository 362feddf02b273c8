use std::{thread::sleep, time::Duration};

/// Runs jobs one after another with a fixed pause between them.
///
/// This is a courtesy towards rate-limited APIs, not backpressure: there is
/// no pause before the first job or after the last one.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitedScheduler {
    delay: Duration,
}

impl RateLimitedScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn run<T, R>(&self, items: impl IntoIterator<Item = T>, mut job: impl FnMut(T) -> R) -> Vec<R> {
        let mut results = Vec::new();

        for (idx, item) in items.into_iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                sleep(self.delay);
            }
            results.push(job(item));
        }

        results
    }
}
