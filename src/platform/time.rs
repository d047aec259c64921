//! Millisecond clocks for the spawn timers and the combo window

/// Source of monotonically non-decreasing timestamps (ms)
pub trait Clock {
    fn now_ms(&mut self) -> f64;
}

/// Advances by a fixed step on every read; deterministic
#[derive(Debug, Clone)]
pub struct SteppedClock {
    now: f64,
    step: f64,
}

impl SteppedClock {
    /// One 60 Hz frame
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn new(step_ms: f64) -> Self {
        Self {
            now: 0.0,
            step: step_ms.max(0.0),
        }
    }

    pub fn starting_at(start_ms: f64, step_ms: f64) -> Self {
        Self {
            now: start_ms,
            ..Self::new(step_ms)
        }
    }

    /// Jump forward without reading (e.g. to skip past a spawn timer)
    pub fn advance(&mut self, ms: f64) {
        self.now += ms.max(0.0);
    }

    /// Last timestamp handed out
    pub fn peek(&self) -> f64 {
        self.now
    }
}

impl Default for SteppedClock {
    fn default() -> Self {
        Self::new(Self::FRAME_MS)
    }
}

impl Clock for SteppedClock {
    fn now_ms(&mut self) -> f64 {
        self.now += self.step;
        self.now
    }
}

/// Wall clock measured from construction
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// `Date.now()`, clamped so it never runs backwards
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct BrowserClock {
    last: f64,
}

#[cfg(target_arch = "wasm32")]
impl BrowserClock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for BrowserClock {
    fn now_ms(&mut self) -> f64 {
        self.last = self.last.max(js_sys::Date::now());
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepped_clock() {
        let mut clock = SteppedClock::new(10.0);
        assert_eq!(clock.now_ms(), 10.0);
        assert_eq!(clock.now_ms(), 20.0);
        clock.advance(1000.0);
        assert_eq!(clock.peek(), 1020.0);
        assert_eq!(clock.now_ms(), 1030.0);
    }

    #[test]
    fn test_negative_step_is_clamped() {
        let mut clock = SteppedClock::starting_at(50.0, -5.0);
        assert_eq!(clock.now_ms(), 50.0);
        clock.advance(-100.0);
        assert_eq!(clock.now_ms(), 50.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_system_clock_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
