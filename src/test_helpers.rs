use crate::wheel::{
    WheelEvent,
    WheelService,
    WheelTimings,
};
use rand::{
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

pub const TEST_SEED: u64 = 0x5EED;

/// A seeded wheel plus a manual clock, so timers fire exactly when a test
/// says they do.
pub struct TestContext {
    service: WheelService,
    events: mpsc::UnboundedReceiver<WheelEvent>,
    now: Instant,
}

impl TestContext {
    pub fn new(options: &[&str]) -> Self {
        Self::with_seed(options, TEST_SEED)
    }

    pub fn with_seed(options: &[&str], seed: u64) -> Self {
        let (mut service, events) =
            WheelService::with_rng(WheelTimings::default(), StdRng::seed_from_u64(seed));
        service.set_options(options.iter().copied());
        let mut ctx = TestContext {
            service,
            events,
            now: Instant::now(),
        };
        ctx.drain_events();
        ctx
    }

    pub fn service(&self) -> &WheelService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut WheelService {
        &mut self.service
    }

    pub fn timings(&self) -> WheelTimings {
        self.service.timings()
    }

    pub fn spin(&mut self) -> oneshot::Receiver<String> {
        let now = self.now;
        self.service.spin(now)
    }

    /// Moves the clock forward and fires whatever came due.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        let now = self.now;
        self.service.advance(now);
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Spins and runs the clock through the reveal.
    pub fn spin_to_completion(&mut self) -> String {
        let mut rx = self.spin();
        let spin = self.timings().spin;
        self.advance(spin);
        rx.try_recv().unwrap_or_default()
    }

    pub fn drain_events(&mut self) -> Vec<WheelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
