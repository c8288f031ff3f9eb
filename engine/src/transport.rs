//! Playback clock driven by host frame timestamps.

/// Logical time and wall-clock delta for one frame, both in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub time: f64,
    pub delta: f64,
}

/// Turns monotonically increasing millisecond timestamps into logical playback time.
///
/// Delta always follows the wall clock so anything counting down (debug log lifetimes,
/// animations) keeps ticking; logical time only advances while playing.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    last_frame_ms: Option<f64>,
    time: f64,
    delta: f64,
    paused: bool,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts logical time at `-lead_in` seconds so content can arrive before beat zero.
    pub fn with_lead_in(lead_in: f64) -> Self {
        Self {
            time: 0.0 - lead_in.max(0.0),
            ..Self::default()
        }
    }

    pub fn advance(&mut self, now_ms: f64) -> FrameTime {
        if !now_ms.is_finite() {
            // Unusable timestamp: hold the clock and keep the last good one.
            self.delta = 0.0;
            return self.frame();
        }
        let delta = match self.last_frame_ms {
            Some(last) if now_ms > last => (now_ms - last) / 1000.0,
            _ => 0.0,
        };
        // Track the max seen so a backwards timestamp cannot produce a later jump.
        self.last_frame_ms = Some(self.last_frame_ms.map_or(now_ms, |last| last.max(now_ms)));
        self.delta = delta;
        if !self.paused {
            self.time += delta;
        }
        self.frame()
    }

    pub fn frame(&self) -> FrameTime {
        FrameTime {
            time: self.time,
            delta: self.delta,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_delta() {
        let mut t = Transport::new();
        let f = t.advance(5000.0);
        assert_eq!(f, FrameTime { time: 0.0, delta: 0.0 });
    }

    #[test]
    fn time_advances_by_wall_clock_delta_in_seconds() {
        let mut t = Transport::new();
        t.advance(1000.0);
        let f = t.advance(1250.0);
        assert!((f.delta - 0.25).abs() < 1e-12);
        assert!((f.time - 0.25).abs() < 1e-12);
        let f = t.advance(1500.0);
        assert!((f.time - 0.5).abs() < 1e-12);
    }

    #[test]
    fn paused_transport_holds_time_but_reports_delta() {
        let mut t = Transport::new();
        t.advance(0.0);
        t.advance(100.0);
        t.pause();
        let a = t.advance(200.0);
        let b = t.advance(300.0);
        assert_eq!(a.time, b.time);
        assert!((a.time - 0.1).abs() < 1e-12);
        assert!(b.delta > 0.0);

        t.resume();
        let c = t.advance(400.0);
        assert!((c.time - 0.2).abs() < 1e-12);
    }

    #[test]
    fn backwards_timestamps_do_not_rewind() {
        let mut t = Transport::new();
        t.advance(1000.0);
        let f = t.advance(900.0);
        assert_eq!(f.delta, 0.0);
        let f = t.advance(1100.0);
        assert!((f.delta - 0.1).abs() < 1e-12);
    }

    #[test]
    fn non_finite_timestamps_are_ignored() {
        let mut t = Transport::new();
        let f = t.advance(f64::NAN);
        assert_eq!(f, FrameTime::default());
        t.advance(1000.0);
        let f = t.advance(1250.0);
        assert!((f.delta - 0.25).abs() < 1e-12);

        let f = t.advance(f64::INFINITY);
        assert_eq!(f.delta, 0.0);
        assert!((f.time - 0.25).abs() < 1e-12);
        let f = t.advance(1500.0);
        assert!((f.delta - 0.25).abs() < 1e-12);
        assert!((f.time - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reset_returns_to_zero_and_keeps_pause_flag() {
        let mut t = Transport::with_lead_in(1.0);
        assert_eq!(t.time(), -1.0);
        t.advance(0.0);
        t.advance(3000.0);
        t.pause();
        t.reset();
        assert_eq!(t.time(), 0.0);
        assert!(t.is_paused());
        assert!(!t.toggle_pause());
    }
}
