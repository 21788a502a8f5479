//! Verrouillage du ratio largeur/hauteur de la grille.
//!
//! Une seule machine à états, une seule direction de vérité par appel :
//! `set_width` dérive la hauteur, `set_height` dérive la largeur.

use std::fmt;

/// Hauteur par unité de largeur quand le verrou est actif.
pub const ASPECT_RATIO: f64 = 0.55;

/// Bornes de la largeur de grille (en cellules).
pub const MIN_WIDTH: u32 = 20;
/// Upper width bound.
pub const MAX_WIDTH: u32 = 120;
/// Bornes de la hauteur de grille (en cellules).
pub const MIN_HEIGHT: u32 = 10;
/// Upper height bound.
pub const MAX_HEIGHT: u32 = 70;

/// Clamp a width to [20, 120].
#[must_use]
pub fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Clamp a height to [10, 70].
#[must_use]
pub fn clamp_height(height: u32) -> u32 {
    height.clamp(MIN_HEIGHT, MAX_HEIGHT)
}

/// `clamp(round(width * 0.55), 10, 70)`.
///
/// # Example
/// ```
/// use gc_core::aspect::height_for_width;
/// assert_eq!(height_for_width(100), 55);
/// assert_eq!(height_for_width(120), 66);
/// assert_eq!(height_for_width(5), 10);
/// ```
#[must_use]
pub fn height_for_width(width: u32) -> u32 {
    let h = (f64::from(width) * ASPECT_RATIO).round() as u32;
    clamp_height(h)
}

/// `clamp(round(height / 0.55), 20, 120)`.
///
/// # Example
/// ```
/// use gc_core::aspect::width_for_height;
/// assert_eq!(width_for_height(55), 100);
/// assert_eq!(width_for_height(70), 120);
/// ```
#[must_use]
pub fn width_for_height(height: u32) -> u32 {
    let w = (f64::from(height) / ASPECT_RATIO).round() as u32;
    clamp_width(w)
}

type Listener = Box<dyn FnMut(u32) + Send>;

/// Coordinates grid width and height under an optional aspect lock.
///
/// Listeners are only called when the stored value actually changes, so a
/// control surface that echoes values back cannot start a feedback loop.
///
/// # Example
/// ```
/// use gc_core::aspect::AspectCoordinator;
/// let mut aspect = AspectCoordinator::new(60, 34, true);
/// aspect.set_width(100);
/// assert_eq!(aspect.height(), 55);
/// aspect.set_height(55);
/// assert_eq!(aspect.width(), 100);
/// ```
pub struct AspectCoordinator {
    width: u32,
    height: u32,
    locked: bool,
    on_width: Option<Listener>,
    on_height: Option<Listener>,
}

impl AspectCoordinator {
    /// Create a coordinator. Values are clamped; a locked coordinator derives
    /// its height from the width immediately.
    #[must_use]
    pub fn new(width: u32, height: u32, locked: bool) -> Self {
        let width = clamp_width(width);
        let height = if locked {
            height_for_width(width)
        } else {
            clamp_height(height)
        };
        Self {
            width,
            height,
            locked,
            on_width: None,
            on_height: None,
        }
    }

    /// Current width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Lock state.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Register the width-changed listener (replaces any previous one).
    pub fn on_width_changed(&mut self, listener: impl FnMut(u32) + Send + 'static) {
        self.on_width = Some(Box::new(listener));
    }

    /// Register the height-changed listener (replaces any previous one).
    pub fn on_height_changed(&mut self, listener: impl FnMut(u32) + Send + 'static) {
        self.on_height = Some(Box::new(listener));
    }

    /// Width is the source of truth for this call.
    pub fn set_width(&mut self, width: u32) {
        let width = clamp_width(width);
        self.store_width(width);
        if self.locked {
            self.store_height(height_for_width(width));
        }
    }

    /// Height is the source of truth for this call.
    pub fn set_height(&mut self, height: u32) {
        let height = clamp_height(height);
        self.store_height(height);
        if self.locked {
            self.store_width(width_for_height(height));
        }
    }

    /// Toggle the lock. Locking re-derives the height from the current width.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            self.store_height(height_for_width(self.width));
        }
    }

    fn store_width(&mut self, width: u32) {
        if width == self.width {
            return;
        }
        self.width = width;
        if let Some(listener) = self.on_width.as_mut() {
            listener(width);
        }
    }

    fn store_height(&mut self, height: u32) {
        if height == self.height {
            return;
        }
        self.height = height;
        if let Some(listener) = self.on_height.as_mut() {
            listener(height);
        }
    }
}

impl fmt::Debug for AspectCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectCoordinator")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(aspect: &mut AspectCoordinator) -> Arc<Mutex<Vec<(char, u32)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let w = Arc::clone(&log);
        aspect.on_width_changed(move |v| w.lock().unwrap().push(('w', v)));
        let h = Arc::clone(&log);
        aspect.on_height_changed(move |v| h.lock().unwrap().push(('h', v)));
        log
    }

    #[test]
    fn lock_round_trip_is_a_fixed_point() {
        let mut aspect = AspectCoordinator::new(60, 34, true);
        aspect.set_width(100);
        assert_eq!((aspect.width(), aspect.height()), (100, 55));
        aspect.set_height(55);
        assert_eq!((aspect.width(), aspect.height()), (100, 55));
    }

    #[test]
    fn unlocked_leaves_other_side_alone() {
        let mut aspect = AspectCoordinator::new(60, 34, false);
        aspect.set_width(100);
        assert_eq!(aspect.height(), 34);
        aspect.set_height(12);
        assert_eq!(aspect.width(), 100);
    }

    #[test]
    fn values_are_clamped() {
        let mut aspect = AspectCoordinator::new(60, 34, false);
        aspect.set_width(500);
        assert_eq!(aspect.width(), MAX_WIDTH);
        aspect.set_width(0);
        assert_eq!(aspect.width(), MIN_WIDTH);
        aspect.set_height(1);
        assert_eq!(aspect.height(), MIN_HEIGHT);
        aspect.set_height(99);
        assert_eq!(aspect.height(), MAX_HEIGHT);
    }

    #[test]
    fn locked_height_is_clamped_derivation() {
        let mut aspect = AspectCoordinator::new(60, 34, true);
        aspect.set_height(70);
        // 70 / 0.55 = 127.3 → clamped to 120
        assert_eq!(aspect.width(), 120);
        assert_eq!(aspect.height(), 70);
    }

    #[test]
    fn locking_rederives_height() {
        let mut aspect = AspectCoordinator::new(60, 34, false);
        aspect.set_locked(true);
        assert_eq!(aspect.height(), 33);
    }

    #[test]
    fn no_notification_without_change() {
        let mut aspect = AspectCoordinator::new(100, 55, true);
        let log = recorder(&mut aspect);
        aspect.set_width(100);
        aspect.set_height(55);
        aspect.set_locked(true);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn notifications_report_new_values() {
        let mut aspect = AspectCoordinator::new(60, 33, true);
        let log = recorder(&mut aspect);
        aspect.set_width(100);
        assert_eq!(*log.lock().unwrap(), vec![('w', 100), ('h', 55)]);
    }

    #[test]
    fn echoed_values_do_not_loop() {
        let mut aspect = AspectCoordinator::new(60, 33, true);
        let log = recorder(&mut aspect);
        aspect.set_width(80);
        let emitted: Vec<(char, u32)> = log.lock().unwrap().clone();
        // a bound control surface echoes every emitted value back
        for (side, value) in emitted {
            match side {
                'w' => aspect.set_width(value),
                _ => aspect.set_height(value),
            }
        }
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!((aspect.width(), aspect.height()), (80, 44));
    }
}
