//! Selection state machine for the wheel.
//!
//! All delayed transitions (winner reveal, removal start, confetti clear)
//! go through a [`TimerQueue`] keyed to the spin generation. Starting a new
//! spin or resetting bumps the generation, so a timer left over from an
//! earlier spin can never write into current state.

use crate::{
    options,
    schedule::TimerQueue,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use std::time::{
    Duration,
    Instant,
};
use tokio::sync::{
    mpsc,
    oneshot,
};
use tracing::{
    debug,
    info,
};

pub const DEFAULT_SPIN_DURATION: Duration = Duration::from_millis(5000);
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(4000);
pub const DEFAULT_CONFETTI_DURATION: Duration = Duration::from_millis(5000);

const MIN_SPINS: u32 = 6;
const MAX_SPINS: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WheelTimings {
    pub spin: Duration,
    pub removal_delay: Duration,
    pub confetti: Duration,
}

impl Default for WheelTimings {
    fn default() -> Self {
        WheelTimings {
            spin: DEFAULT_SPIN_DURATION,
            removal_delay: DEFAULT_REMOVAL_DELAY,
            confetti: DEFAULT_CONFETTI_DURATION,
        }
    }
}

/// State changes observed by the render loop.
#[derive(Clone, Debug, PartialEq)]
pub enum WheelEvent {
    OptionsChanged,
    SpinStarted {
        generation: u64,
        from_rotation: f64,
        to_rotation: f64,
        started_at: Instant,
        duration: Duration,
    },
    WinnerRevealed {
        index: usize,
        winner: String,
    },
    ConfettiChanged(bool),
    RemovalStarted {
        index: usize,
    },
    RemovalCancelled,
    WinnerRemoved {
        index: usize,
        winner: String,
    },
    RemoveWinnerToggled(bool),
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    RevealWinner,
    StartRemoval,
    ClearConfetti,
}

/// Which segment sits under the fixed pointer at the top of the wheel after
/// the wheel has turned clockwise by `rotation` degrees.
pub fn pointer_index(rotation: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let segment_angle = 360.0 / count as f64;
    let normalized = rotation.rem_euclid(360.0);
    let pointer_angle = (360.0 - normalized + 360.0) % 360.0;
    ((pointer_angle / segment_angle).floor() as usize) % count
}

pub struct WheelService {
    options: Vec<String>,
    winner: Option<String>,
    winner_index: Option<usize>,
    is_spinning: bool,
    rotation: f64,
    show_confetti: bool,
    remove_winner: bool,
    is_removing: bool,
    generation: u64,
    timers: TimerQueue<TimerKind>,
    responder: Option<oneshot::Sender<String>>,
    timings: WheelTimings,
    rng: StdRng,
    events: mpsc::UnboundedSender<WheelEvent>,
}

impl WheelService {
    pub fn new(timings: WheelTimings) -> (Self, mpsc::UnboundedReceiver<WheelEvent>) {
        Self::with_rng(timings, StdRng::from_os_rng())
    }

    pub fn with_rng(
        timings: WheelTimings,
        rng: StdRng,
    ) -> (Self, mpsc::UnboundedReceiver<WheelEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let service = WheelService {
            options: Vec::new(),
            winner: None,
            winner_index: None,
            is_spinning: false,
            rotation: 0.0,
            show_confetti: false,
            remove_winner: false,
            is_removing: false,
            generation: 0,
            timers: TimerQueue::default(),
            responder: None,
            timings,
            rng,
            events,
        };
        (service, rx)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.winner_index
    }

    pub fn is_spinning(&self) -> bool {
        self.is_spinning
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn show_confetti(&self) -> bool {
        self.show_confetti
    }

    pub fn remove_winner(&self) -> bool {
        self.remove_winner
    }

    pub fn is_removing(&self) -> bool {
        self.is_removing
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn timings(&self) -> WheelTimings {
        self.timings
    }

    pub fn set_options<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options = options::sanitize(options);
        self.winner = None;
        self.winner_index = None;
        self.timers.cancel(TimerKind::StartRemoval);
        if self.is_removing {
            self.is_removing = false;
            self.emit(WheelEvent::RemovalCancelled);
        }
        debug!(count = self.options.len(), "options replaced");
        self.emit(WheelEvent::OptionsChanged);
    }

    pub fn toggle_remove_winner(&mut self) -> bool {
        self.remove_winner = !self.remove_winner;
        debug!(enabled = self.remove_winner, "remove-winner toggled");
        self.emit(WheelEvent::RemoveWinnerToggled(self.remove_winner));
        self.remove_winner
    }

    /// Starts a spin. The returned receiver resolves with the winning option
    /// once the reveal timer fires, or with an empty string straight away when
    /// a spin is already running or there is nothing to spin.
    pub fn spin(&mut self, now: Instant) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        if self.is_spinning || self.options.is_empty() {
            debug!(
                spinning = self.is_spinning,
                count = self.options.len(),
                "spin ignored"
            );
            let _ = tx.send(String::new());
            return rx;
        }

        self.generation += 1;
        self.timers.retain_generation(self.generation);
        self.is_spinning = true;
        self.winner = None;
        self.winner_index = None;
        if self.show_confetti {
            self.show_confetti = false;
            self.emit(WheelEvent::ConfettiChanged(false));
        }
        if self.is_removing {
            self.is_removing = false;
            self.emit(WheelEvent::RemovalCancelled);
        }

        let spins = self.rng.random_range(MIN_SPINS..=MAX_SPINS);
        let offset = self.rng.random_range(0.0..360.0);
        let from_rotation = self.rotation;
        self.rotation += f64::from(spins) * 360.0 + offset;
        self.responder = Some(tx);
        self.timers.schedule(
            now + self.timings.spin,
            self.generation,
            TimerKind::RevealWinner,
        );

        info!(
            generation = self.generation,
            spins,
            offset,
            rotation = self.rotation,
            "spin started"
        );
        self.emit(WheelEvent::SpinStarted {
            generation: self.generation,
            from_rotation,
            to_rotation: self.rotation,
            started_at: now,
            duration: self.timings.spin,
        });
        rx
    }

    /// Fires every timer due at `now`, including follow-ups scheduled by a
    /// timer that fired in the same call. Called once per frame.
    pub fn advance(&mut self, now: Instant) {
        while self.timers.next_deadline().is_some_and(|due| due <= now) {
            self.fire_due(now);
        }
    }

    fn fire_due(&mut self, now: Instant) {
        for timer in self.timers.pop_due(now) {
            if timer.generation != self.generation {
                debug!(
                    stale = timer.generation,
                    current = self.generation,
                    "dropping stale timer"
                );
                continue;
            }
            match timer.kind {
                TimerKind::RevealWinner => self.reveal_winner(timer.due),
                TimerKind::StartRemoval => self.start_removal(),
                TimerKind::ClearConfetti => self.clear_confetti(),
            }
        }
    }

    /// Strikes the pending winner from the list. Safe to call repeatedly.
    pub fn complete_removal(&mut self) -> Option<String> {
        let index = self.winner_index.take()?;
        self.winner = None;
        self.is_removing = false;
        if index >= self.options.len() {
            return None;
        }
        let removed = self.options.remove(index);
        info!(index, winner = %removed, remaining = self.options.len(), "winner removed");
        self.emit(WheelEvent::WinnerRemoved {
            index,
            winner: removed.clone(),
        });
        Some(removed)
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.timers.clear();
        self.is_spinning = false;
        if let Some(tx) = self.responder.take() {
            let _ = tx.send(String::new());
        }
        self.winner = None;
        self.winner_index = None;
        self.rotation = 0.0;
        self.show_confetti = false;
        self.is_removing = false;
        debug!(generation = self.generation, "wheel reset");
        self.emit(WheelEvent::Reset);
    }

    fn reveal_winner(&mut self, due: Instant) {
        self.is_spinning = false;
        let responder = self.responder.take();
        if self.options.is_empty() {
            if let Some(tx) = responder {
                let _ = tx.send(String::new());
            }
            return;
        }

        let index = pointer_index(self.rotation, self.options.len());
        let winner = self.options[index].clone();
        self.winner = Some(winner.clone());
        self.winner_index = Some(index);
        self.show_confetti = true;
        info!(index, winner = %winner, "winner revealed");
        self.emit(WheelEvent::WinnerRevealed {
            index,
            winner: winner.clone(),
        });
        self.emit(WheelEvent::ConfettiChanged(true));

        if self.remove_winner {
            self.timers.schedule(
                due + self.timings.removal_delay,
                self.generation,
                TimerKind::StartRemoval,
            );
        }
        self.timers.schedule(
            due + self.timings.confetti,
            self.generation,
            TimerKind::ClearConfetti,
        );

        if let Some(tx) = responder {
            let _ = tx.send(winner);
        }
    }

    fn start_removal(&mut self) {
        let Some(index) = self.winner_index else {
            return;
        };
        if !self.remove_winner || self.is_spinning {
            return;
        }
        self.is_removing = true;
        debug!(index, "removal started");
        self.emit(WheelEvent::RemovalStarted { index });
    }

    fn clear_confetti(&mut self) {
        if self.show_confetti {
            self.show_confetti = false;
            self.emit(WheelEvent::ConfettiChanged(false));
        }
    }

    fn emit(&self, event: WheelEvent) {
        // the receiver may already be gone during shutdown
        let _ = self.events.send(event);
    }
}
