//! Time-based tweens and the winner-removal animation.

use std::time::{
    Duration,
    Instant,
};
use tracing::debug;

pub const DISSOLVE_DURATION: Duration = Duration::from_millis(600);
pub const COLLAPSE_DURATION: Duration = Duration::from_millis(800);

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Tween {
    started_at: Instant,
    duration: Duration,
    easing: fn(f64) -> f64,
}

impl Tween {
    pub fn new(started_at: Instant, duration: Duration, easing: fn(f64) -> f64) -> Self {
        Tween {
            started_at,
            duration,
            easing,
        }
    }

    /// Linear progress in [0, 1].
    pub fn raw_progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn progress(&self, now: Instant) -> f64 {
        (self.easing)(self.raw_progress(now))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.raw_progress(now) >= 1.0
    }

    pub fn ends_at(&self) -> Instant {
        self.started_at + self.duration
    }
}

/// Displayed wheel angle while a spin is animating.
#[derive(Clone, Copy, Debug)]
pub struct RotationTween {
    from: f64,
    to: f64,
    tween: Tween,
}

impl RotationTween {
    pub fn new(from: f64, to: f64, started_at: Instant, duration: Duration) -> Self {
        RotationTween {
            from,
            to,
            tween: Tween::new(started_at, duration, ease_out_cubic),
        }
    }

    pub fn angle(&self, now: Instant) -> f64 {
        self.from + (self.to - self.from) * self.tween.progress(now)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.tween.is_finished(now)
    }
}

#[derive(Clone, Copy, Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Dissolving(Tween),
    Collapsing(Tween),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalStep {
    Idle,
    Running,
    Completed,
}

/// Dissolve, then collapse, then hand control back to the wheel state.
#[derive(Clone, Copy, Debug)]
pub struct RemovalAnimation {
    phase: Phase,
    winner_index: usize,
    segment_count: usize,
    alpha: f64,
    collapse: f64,
}

impl Default for RemovalAnimation {
    fn default() -> Self {
        RemovalAnimation {
            phase: Phase::Idle,
            winner_index: 0,
            segment_count: 0,
            alpha: 1.0,
            collapse: 0.0,
        }
    }
}

impl RemovalAnimation {
    pub fn start(&mut self, winner_index: usize, segment_count: usize, now: Instant) {
        self.winner_index = winner_index;
        self.segment_count = segment_count;
        self.enter_dissolving(now);
    }

    pub fn advance(&mut self, now: Instant) -> RemovalStep {
        match self.phase {
            Phase::Idle => RemovalStep::Idle,
            Phase::Dissolving(tween) => {
                self.alpha = 1.0 - tween.progress(now);
                if !tween.is_finished(now) {
                    return RemovalStep::Running;
                }
                if self.segment_count > 1 {
                    self.enter_collapsing(tween.ends_at());
                    // the collapse may already be partly due on a slow frame
                    self.advance(now)
                } else {
                    self.exit();
                    RemovalStep::Completed
                }
            }
            Phase::Collapsing(tween) => {
                self.collapse = tween.progress(now);
                if tween.is_finished(now) {
                    self.exit();
                    RemovalStep::Completed
                } else {
                    RemovalStep::Running
                }
            }
        }
    }

    /// Abandons the animation and restores neutral alpha and progress.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!(index = self.winner_index, "removal animation cancelled");
        }
        self.exit();
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.is_active().then_some(self.winner_index)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn collapse_progress(&self) -> f64 {
        self.collapse
    }

    fn enter_dissolving(&mut self, now: Instant) {
        self.alpha = 1.0;
        self.collapse = 0.0;
        self.phase = Phase::Dissolving(Tween::new(now, DISSOLVE_DURATION, ease_out_cubic));
    }

    fn enter_collapsing(&mut self, now: Instant) {
        self.alpha = 0.0;
        self.collapse = 0.0;
        self.phase = Phase::Collapsing(Tween::new(now, COLLAPSE_DURATION, ease_in_out_cubic));
    }

    fn exit(&mut self) {
        self.phase = Phase::Idle;
        self.alpha = 1.0;
        self.collapse = 0.0;
    }
}

/// Angular extent of one segment in wheel-local degrees, clockwise from the
/// top of the unrotated wheel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSpan {
    pub start: f64,
    pub sweep: f64,
}

impl SegmentSpan {
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.start && angle < self.start + self.sweep
    }

    pub fn mid(&self) -> f64 {
        self.start + self.sweep / 2.0
    }
}

/// Segment layout for `count` options. While collapsing, the `shrinking`
/// segment narrows to nothing and the rest widen toward an equal share of
/// the circle. Starts accumulate in list order.
pub fn segment_spans(count: usize, shrinking: Option<usize>, progress: f64) -> Vec<SegmentSpan> {
    if count == 0 {
        return Vec::new();
    }
    let equal = 360.0 / count as f64;
    let survivor = if count > 1 {
        360.0 / (count - 1) as f64
    } else {
        0.0
    };
    let progress = progress.clamp(0.0, 1.0);
    let mut start = 0.0;
    (0..count)
        .map(|i| {
            let target = match shrinking {
                Some(idx) if idx == i => 0.0,
                Some(_) => survivor,
                None => equal,
            };
            let sweep = equal + (target - equal) * progress;
            let span = SegmentSpan { start, sweep };
            start += sweep;
            span
        })
        .collect()
}
