use std::time::Instant;

/// Poids de l'historique dans la moyenne exponentielle.
const SMOOTHING: f64 = 0.9;

/// Compteur FPS lissé (moyenne exponentielle 0.9 / 0.1).
///
/// # Example
/// ```
/// use gc_app::fps::FpsCounter;
/// let mut counter = FpsCounter::new();
/// counter.tick();
/// assert!(counter.fps() >= 0.0);
/// ```
pub struct FpsCounter {
    last: Option<Instant>,
    fps: f64,
    /// Durée de la dernière frame en ms.
    pub frame_time_ms: f64,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: None,
            fps: 0.0,
            frame_time_ms: 0.0,
        }
    }

    /// Appeler une fois par frame, APRÈS le rendu.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// [`tick`](Self::tick) avec une horloge explicite.
    pub fn tick_at(&mut self, now: Instant) {
        if let Some(last) = self.last {
            let secs = now.duration_since(last).as_secs_f64();
            self.frame_time_ms = secs * 1000.0;
            if secs > 0.0 {
                let instant = 1.0 / secs;
                self.fps = if self.fps == 0.0 {
                    instant
                } else {
                    SMOOTHING * self.fps + (1.0 - SMOOTHING) * instant
                };
            }
        }
        self.last = Some(now);
    }

    /// FPS lissé.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
