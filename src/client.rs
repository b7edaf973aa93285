use crate::ui;
use chrono::{
    DateTime,
    Local,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use spin_wheel::{
    config::AppConfig,
    confetti::ConfettiField,
    options,
    tween::{
        RemovalAnimation,
        RemovalStep,
        RotationTween,
    },
    wheel::{
        WheelEvent,
        WheelService,
    },
};
use std::{
    collections::VecDeque,
    time::Instant,
};
use tokio::{
    sync::{
        mpsc,
        oneshot,
    },
    time::{
        self,
        MissedTickBehavior,
    },
};
use tracing::{
    debug,
    info,
    warn,
};

const RECENT_WINNERS: usize = 10;
/// Virtual confetti pixels per terminal row; keeps fall speed close to a
/// browser-sized window.
const PIXELS_PER_ROW: f64 = 16.0;
const FALLBACK_ROWS: u16 = 40;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinnerRecord {
    pub name: String,
    pub at: DateTime<Local>,
}

/// Borrowed view of everything one frame needs.
pub struct AppSnapshot<'a> {
    pub options: &'a [String],
    pub rotation: f64,
    pub winner: Option<&'a str>,
    pub winner_index: Option<usize>,
    pub is_spinning: bool,
    pub remove_winner: bool,
    /// Winner index under removal with its alpha and collapse progress.
    pub removal: Option<(usize, f64, f64)>,
    pub recent_winners: &'a VecDeque<WinnerRecord>,
    pub status: &'a str,
    pub confetti: &'a ConfettiField,
}

pub struct AppController {
    service: WheelService,
    events: mpsc::UnboundedReceiver<WheelEvent>,
    removal: RemovalAnimation,
    confetti: ConfettiField,
    spin_tween: Option<RotationTween>,
    displayed_rotation: f64,
    input_text: String,
    recent_winners: VecDeque<WinnerRecord>,
    status: String,
    confetti_count: usize,
    rng: StdRng,
    dirty: bool,
}

impl AppController {
    pub fn new(config: &AppConfig) -> Self {
        let (service, events) = WheelService::new(config.timings());
        Self::from_parts(config, service, events, StdRng::from_os_rng())
    }

    fn from_parts(
        config: &AppConfig,
        mut service: WheelService,
        events: mpsc::UnboundedReceiver<WheelEvent>,
        rng: StdRng,
    ) -> Self {
        service.set_options(options::parse_input(&config.options));
        if config.remove_winner != service.remove_winner() {
            service.toggle_remove_winner();
        }
        AppController {
            service,
            events,
            removal: RemovalAnimation::default(),
            confetti: ConfettiField::new(f64::from(FALLBACK_ROWS) * PIXELS_PER_ROW),
            spin_tween: None,
            displayed_rotation: 0.0,
            input_text: config.options.clone(),
            recent_winners: VecDeque::with_capacity(RECENT_WINNERS),
            status: String::new(),
            confetti_count: config.confetti_count,
            rng,
            dirty: true,
        }
    }

    pub fn snapshot(&self) -> AppSnapshot<'_> {
        AppSnapshot {
            options: self.service.options(),
            rotation: self.displayed_rotation,
            winner: self.service.winner(),
            winner_index: self.service.winner_index(),
            is_spinning: self.service.is_spinning(),
            remove_winner: self.service.remove_winner(),
            removal: self.removal.winner_index().map(|index| {
                (
                    index,
                    self.removal.alpha(),
                    self.removal.collapse_progress(),
                )
            }),
            recent_winners: &self.recent_winners,
            status: &self.status,
            confetti: &self.confetti,
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn resize(&mut self, rows: u16) {
        self.confetti.resize(f64::from(rows) * PIXELS_PER_ROW);
    }

    pub fn spin(&mut self, now: Instant) -> oneshot::Receiver<String> {
        self.service.spin(now)
    }

    pub fn edit_options(&mut self, text: String) {
        self.service.set_options(options::parse_input(&text));
        self.input_text = text;
    }

    pub fn clear_options(&mut self) {
        self.edit_options(String::new());
        self.set_status("Options cleared");
    }

    pub fn sample_options(&mut self) {
        self.edit_options(options::SAMPLE_OPTIONS_TEXT.to_string());
        self.set_status("Loaded sample options");
    }

    pub fn toggle_remove_winner(&mut self) {
        self.service.toggle_remove_winner();
    }

    pub fn reset(&mut self) {
        self.service.reset();
    }

    /// Runs one frame: fires due timers, applies wheel events and advances
    /// the animations. Returns whether anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.service.advance(now);
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event, now);
        }

        if let Some(tween) = self.spin_tween {
            self.displayed_rotation = tween.angle(now);
            if tween.is_finished(now) {
                self.spin_tween = None;
            }
            self.dirty = true;
        }

        match self.removal.advance(now) {
            RemovalStep::Idle => {}
            RemovalStep::Running => self.dirty = true,
            RemovalStep::Completed => {
                self.service.complete_removal();
                // apply the removal event in the same frame
                while let Ok(event) = self.events.try_recv() {
                    self.apply_event(event, now);
                }
                self.dirty = true;
            }
        }

        if self.confetti.is_running() {
            if self.service.show_confetti() {
                self.confetti.step();
            } else {
                self.confetti.stop();
            }
            self.dirty = true;
        }

        std::mem::take(&mut self.dirty)
    }

    fn apply_event(&mut self, event: WheelEvent, now: Instant) {
        debug!(?event, "wheel event");
        self.dirty = true;
        match event {
            WheelEvent::OptionsChanged => {
                self.removal.cancel();
            }
            WheelEvent::SpinStarted {
                from_rotation,
                to_rotation,
                started_at,
                duration,
                ..
            } => {
                self.removal.cancel();
                self.spin_tween = Some(RotationTween::new(
                    from_rotation,
                    to_rotation,
                    started_at,
                    duration,
                ));
                self.set_status("Spinning...");
            }
            WheelEvent::WinnerRevealed { winner, .. } => {
                // land exactly on the wheel's final angle
                self.displayed_rotation = self.service.rotation();
                self.spin_tween = None;
                self.set_status(format!("Winner: {winner}"));
                if self.recent_winners.len() == RECENT_WINNERS {
                    self.recent_winners.pop_back();
                }
                self.recent_winners.push_front(WinnerRecord {
                    name: winner,
                    at: Local::now(),
                });
            }
            WheelEvent::ConfettiChanged(true) => {
                self.confetti.launch(self.confetti_count, &mut self.rng);
            }
            WheelEvent::ConfettiChanged(false) => {
                self.confetti.stop();
            }
            WheelEvent::RemovalStarted { index } => {
                self.removal
                    .start(index, self.service.options().len(), now);
            }
            WheelEvent::RemovalCancelled => {
                self.removal.cancel();
            }
            WheelEvent::WinnerRemoved { winner, .. } => {
                self.removal.cancel();
                self.input_text = options::join_options(self.service.options());
                self.set_status(format!("Removed {winner}"));
            }
            WheelEvent::RemoveWinnerToggled(enabled) => {
                let state = if enabled { "on" } else { "off" };
                self.set_status(format!("Remove winner {state}"));
            }
            WheelEvent::Reset => {
                self.removal.cancel();
                self.confetti.stop();
                self.spin_tween = None;
                self.displayed_rotation = 0.0;
                self.set_status("Wheel reset");
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let controller = AppController::new(&config);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    info!("UI ready");
    let res = run_loop(controller, &config, &mut ui_state, &mut input_events).await;
    ui::terminal_exit(&mut ui_state)?;
    res
}

async fn run_loop(
    mut controller: AppController,
    config: &AppConfig,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    info!("Running app loop");
    let mut frames = time::interval(config.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pending_spin: Option<oneshot::Receiver<String>> = None;

    if let Some(rows) = ui::viewport_rows(ui_state) {
        controller.resize(rows);
    }
    ui::draw(ui_state, &controller.snapshot()).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            _ = frames.tick() => {
                if controller.tick(Instant::now()) {
                    ui::draw(ui_state, &controller.snapshot())
                        .wrap_err("draw after frame tick failed")?;
                }
            }
            settled = async {
                match pending_spin.as_mut() {
                    Some(rx) => rx.await,
                    None => std::future::pending().await,
                }
            }, if pending_spin.is_some() => {
                pending_spin = None;
                match settled {
                    Ok(winner) if !winner.is_empty() => info!(%winner, "spin settled"),
                    Ok(_) => debug!("spin settled without a winner"),
                    Err(_) => warn!("spin abandoned before it settled"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Spin => {
                        let rx = controller.spin(Instant::now());
                        if pending_spin.is_none() {
                            pending_spin = Some(rx);
                        }
                    }
                    ui::UserEvent::ToggleRemoveWinner => controller.toggle_remove_winner(),
                    ui::UserEvent::ResetWheel => controller.reset(),
                    ui::UserEvent::ClearOptions => controller.clear_options(),
                    ui::UserEvent::SampleOptions => controller.sample_options(),
                    ui::UserEvent::OpenEditor => {
                        ui::open_editor(ui_state, controller.input_text());
                    }
                    ui::UserEvent::OptionsEdited(text) => controller.edit_options(text),
                    ui::UserEvent::Redraw => {
                        if let Some(rows) = ui::viewport_rows(ui_state) {
                            controller.resize(rows);
                        }
                    }
                }
                // apply resulting wheel events before redrawing
                controller.tick(Instant::now());
                ui::draw(ui_state, &controller.snapshot())
                    .wrap_err("draw after input failed")?;
            }
        }
    }
    info!("Shutting down");
    Ok(())
}
