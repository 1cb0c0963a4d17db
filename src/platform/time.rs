//! Frame timing

/// Converts animation-frame timestamps (ms) into capped deltas (s)
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Delta since the previous frame. The first frame, and any clock that
    /// runs backwards, yields 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms > last => ((now_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.min(self.max_dt)
    }

    /// Forget the last timestamp (after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.advance(1234.0), 0.0);
        assert!((clock.advance(1250.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_delta_capped() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(0.0);
        assert_eq!(clock.advance(30_000.0), 0.1);
    }

    #[test]
    fn test_backwards_and_reset() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(500.0);
        assert_eq!(clock.advance(400.0), 0.0);
        clock.reset();
        assert_eq!(clock.advance(900.0), 0.0);
    }
}
