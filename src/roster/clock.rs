//! Millisecond clock used to mint page and player ids.

pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock: `Date.now()` in the browser, `SystemTime` elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_millis(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Next id: the current time, bumped past every id already in use so two
/// records created within the same millisecond never collide.
pub fn fresh_id(clock: &dyn Clock, existing: impl IntoIterator<Item = i64>) -> i64 {
    let now = clock.now_millis();
    match existing.into_iter().max() {
        Some(max) if max >= now => max.saturating_add(1),
        _ => now,
    }
}
