use std::time::{Duration, Instant};

/// Frames-per-second estimate over a rolling one-second window.
pub struct FpsCounter {
    window_start: Instant,
    frames_in_window: u32,
    fps: Option<f32>,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames_in_window: 0,
            fps: None,
        }
    }

    /// Records one presented frame. The estimate updates once a full
    /// second has elapsed; until the first window closes, `fps()` is
    /// `None` rather than a misleading spike.
    pub fn frame(&mut self, now: Instant) {
        self.frames_in_window += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
            tracing::debug!(fps = fps.round(), "render stats");
            self.fps = Some(fps);
            self.frames_in_window = 0;
            self.window_start = now;
        }
    }

    pub fn fps(&self) -> Option<f32> {
        self.fps
    }
}
