// The effect's only way out: after the burst, go somewhere else. Exactly once.

/// Receives the destination once the eye has burst.
pub trait Navigator {
    fn navigate(&mut self, destination: &str);
}

/// Default host: logs the hop and prints the destination for whoever launched us.
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&mut self, destination: &str) {
        tracing::info!(destination, "navigating");
        println!("{destination}");
    }
}

/// Delay between the end of the burst and the hop, so the filtered frame is seen.
pub const NAVIGATE_DELAY_MS: f64 = 300.0;

/// Fire-and-forget delayed navigation. No retry, no cancel.
pub struct PendingNavigation {
    destination: String,
    due_ms: f64,
    fired: bool,
}

impl PendingNavigation {
    pub fn schedule(destination: impl Into<String>, now_ms: f64) -> Self {
        Self { destination: destination.into(), due_ms: now_ms + NAVIGATE_DELAY_MS, fired: false }
    }

    /// Call every tick; hands the destination to `nav` the first time the delay has elapsed.
    /// Returns true on that tick only.
    pub fn poll(&mut self, now_ms: f64, nav: &mut dyn Navigator) -> bool {
        if self.fired || now_ms < self.due_ms {
            return false;
        }
        self.fired = true;
        nav.navigate(&self.destination);
        true
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Records every call so tests can count them.
    #[derive(Default)]
    pub struct RecordingNavigator {
        pub visits: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, destination: &str) {
            self.visits.push(destination.to_string());
        }
    }

    #[test]
    fn fires_once_after_delay() {
        let mut nav = RecordingNavigator::default();
        let mut pending = PendingNavigation::schedule("search.html", 1000.0);
        assert!(!pending.poll(1000.0, &mut nav));
        assert!(!pending.poll(1299.0, &mut nav));
        assert!(pending.poll(1300.0, &mut nav));
        for t in [1301.0, 2000.0, 1e9] {
            assert!(!pending.poll(t, &mut nav));
        }
        assert_eq!(nav.visits, vec!["search.html".to_string()]);
    }
}
