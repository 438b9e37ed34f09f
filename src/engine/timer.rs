/// Repeating interval timer driven by explicit `advance` calls.
///
/// A stopped timer never fires. Starting (or restarting) resets the phase so
/// the first fire comes one full interval later.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    interval_ms: f64,
    elapsed_ms: f64,
    running: bool,
}

impl Timer {
    pub fn new(interval_ms: f64) -> Self {
        Timer {
            interval_ms,
            elapsed_ms: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.elapsed_ms = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Add `delta_ms` and return how many intervals elapsed.
    pub fn advance(&mut self, delta_ms: f64) -> u32 {
        if !self.running || !(self.interval_ms > 0.0) {
            return 0;
        }
        self.elapsed_ms += delta_ms.max(0.0);
        let fires = (self.elapsed_ms / self.interval_ms).floor();
        self.elapsed_ms -= fires * self.interval_ms;
        fires as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_timer_never_fires() {
        let mut t = Timer::new(100.0);
        assert_eq!(t.advance(1000.0), 0);
    }

    #[test]
    fn fires_once_per_interval_and_keeps_remainder() {
        let mut t = Timer::new(100.0);
        t.start();
        assert_eq!(t.advance(60.0), 0);
        assert_eq!(t.advance(60.0), 1);
        assert_eq!(t.advance(80.0), 1);
        assert_eq!(t.advance(350.0), 3);
    }

    #[test]
    fn restart_resets_phase() {
        let mut t = Timer::new(100.0);
        t.start();
        t.advance(90.0);
        t.start();
        assert_eq!(t.advance(20.0), 0);
        t.stop();
        assert!(!t.is_running());
        assert_eq!(t.advance(500.0), 0);
    }
}
