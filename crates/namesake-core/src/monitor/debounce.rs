/// Coalesces bursts of change notifications into one set of changed names.
///
/// The first name arms the debouncer; every further name pushes the deadline
/// back by the full window. Once the deadline passes, [`Debouncer::poll`]
/// yields everything collected so far and disarms. Time is always passed in,
/// so the caller decides what "now" is.
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Default quiet period before a batch of changes is released.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
    pending: BTreeSet<String>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            pending: BTreeSet::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a changed name and (re)start the quiet period.
    pub fn push(&mut self, name: impl Into<String>, now: Instant) {
        self.pending.insert(name.into());
        self.deadline = Some(now + self.window);
    }

    /// When the pending batch will be released, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Number of distinct names waiting.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Release the batch if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<BTreeSet<String>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(std::mem::take(&mut self.pending))
            }
            _ => None,
        }
    }

    /// Drop everything without releasing it.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(3);

    #[test]
    fn idle_debouncer_yields_nothing() {
        let mut d = Debouncer::new(WINDOW);
        assert!(!d.is_armed());
        assert!(d.poll(Instant::now()).is_none());
    }

    #[test]
    fn releases_after_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.push("wow02", t0);
        assert!(d.is_armed());
        assert!(d.poll(t0 + Duration::from_secs(2)).is_none());

        let batch = d.poll(t0 + WINDOW).unwrap();
        assert_eq!(batch.into_iter().collect::<Vec<_>>(), ["wow02"]);
        assert!(!d.is_armed());
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn new_event_extends_the_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.push("a", t0);
        d.push("b", t0 + Duration::from_secs(2));

        // The first deadline has passed but the second push moved it.
        assert!(d.poll(t0 + WINDOW).is_none());
        assert_eq!(d.deadline(), Some(t0 + Duration::from_secs(5)));

        let batch = d.poll(t0 + Duration::from_secs(5)).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn duplicates_are_coalesced() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for _ in 0..10 {
            d.push("report.txt", t0);
        }
        assert_eq!(d.pending_len(), 1);
        assert_eq!(d.poll(t0 + WINDOW).unwrap().len(), 1);
    }

    #[test]
    fn reset_discards_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.push("x", t0);
        d.reset();
        assert!(!d.is_armed());
        assert!(d.poll(t0 + WINDOW).is_none());
    }
}
