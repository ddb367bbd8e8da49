//! Keeps the active lyric line centered in its container.
//!
//! Geometry is supplied by the caller, so nothing here knows about the
//! terminal. Offsets and heights share one unit (rows for the TUI).

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerGeometry {
    /// Visible height of the scrolling container.
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineGeometry {
    /// Top edge of the line relative to the container's visible top.
    pub top: f64,
    pub height: f64,
}

/// Scroll offset that puts the middle of `active` at the container midpoint.
///
/// Returns `current_offset` unchanged when there is no active line or the
/// container has not been measured yet.
pub fn compute_scroll_offset(
    container: ContainerGeometry,
    active: Option<LineGeometry>,
    current_offset: f64,
) -> f64 {
    let Some(line) = active else {
        return current_offset;
    };
    if container.height <= 0.0 {
        return current_offset;
    }

    let wanted_top = container.height / 2.0 - line.height / 2.0;
    (current_offset + (line.top - wanted_top)).max(0.0)
}

/// Eases a scroll position toward its target over successive ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothScroll {
    position: f64,
    target: f64,
    time_constant: Duration,
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(Duration::from_millis(120))
    }
}

impl SmoothScroll {
    const SNAP: f64 = 0.5;

    pub fn new(time_constant: Duration) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            time_constant,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn scroll_to(&mut self, target: f64) {
        self.target = target.max(0.0);
    }

    /// Jump without animating.
    pub fn reset(&mut self, position: f64) {
        self.position = position.max(0.0);
        self.target = self.position;
    }

    pub fn is_animating(&self) -> bool {
        self.position != self.target
    }

    /// Advance the animation by `dt`. Returns true if the position moved.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.is_animating() {
            return false;
        }
        let tau = self.time_constant.as_secs_f64();
        let alpha = if tau <= 0.0 {
            1.0
        } else {
            1.0 - (-dt.as_secs_f64() / tau).exp()
        };
        self.position += (self.target - self.position) * alpha;
        if (self.target - self.position).abs() < Self::SNAP {
            self.position = self.target;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers_line() {
        let container = ContainerGeometry { height: 10.0 };
        let line = LineGeometry {
            top: 8.0,
            height: 2.0,
        };
        // Line should end up with its top at 4.0, so scroll down by 4.
        assert_eq!(compute_scroll_offset(container, Some(line), 3.0), 7.0);
    }

    #[test]
    fn test_never_negative() {
        let container = ContainerGeometry { height: 10.0 };
        let line = LineGeometry {
            top: 0.0,
            height: 1.0,
        };
        assert_eq!(compute_scroll_offset(container, Some(line), 0.0), 0.0);
    }

    #[test]
    fn test_noop_without_line_or_height() {
        let line = LineGeometry {
            top: 5.0,
            height: 1.0,
        };
        assert_eq!(
            compute_scroll_offset(ContainerGeometry { height: 0.0 }, Some(line), 2.0),
            2.0
        );
        assert_eq!(
            compute_scroll_offset(ContainerGeometry { height: 10.0 }, None, 2.0),
            2.0
        );
    }

    #[test]
    fn test_smooth_scroll_converges() {
        let mut s = SmoothScroll::default();
        s.scroll_to(12.0);
        assert!(s.is_animating());
        let mut last = s.position();
        for _ in 0..100 {
            s.tick(Duration::from_millis(33));
            assert!(s.position() >= last);
            last = s.position();
        }
        assert_eq!(s.position(), 12.0);
        assert!(!s.is_animating());
        assert!(!s.tick(Duration::from_millis(33)));
    }
}
