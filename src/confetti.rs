//! Confetti particle simulation. Positions are in a virtual viewport: `x` is
//! a percentage of the width and `y` is in pixels, growing downward.

use rand::Rng;
use std::f64::consts::PI;
use tracing::debug;

pub const DEFAULT_CONFETTI_COUNT: usize = 300;

const GRAVITY: f64 = 0.08;
const AIR_RESISTANCE: f64 = 0.99;
const ROTATION_DAMPING: f64 = 0.995;
const FADE_START: f64 = 0.7;
const FADE_FACTOR: f64 = 0.98;
const WOBBLE_DRIFT: f64 = 0.5;
/// Particles are retired once they fall this far past the bottom edge.
const OFFSCREEN_MARGIN: f64 = 50.0;
const CENTER_SHARE: f64 = 0.6;

pub const CONFETTI_COLORS: [(u8, u8, u8); 16] = [
    (0xFF, 0x6B, 0x6B),
    (0x4E, 0xCD, 0xC4),
    (0xFF, 0xE6, 0x6D),
    (0x95, 0xE1, 0xD3),
    (0xF3, 0x81, 0x81),
    (0xAA, 0x96, 0xDA),
    (0xFC, 0xBA, 0xD3),
    (0xA8, 0xD8, 0xEA),
    (0xFF, 0x9F, 0x43),
    (0x6B, 0xCB, 0x77),
    (0x4D, 0x96, 0xFF),
    (0xFF, 0xD9, 0x3D),
    (0xFF, 0x47, 0x57),
    (0x2E, 0xD5, 0x73),
    (0x1E, 0x90, 0xFF),
    (0xFF, 0x63, 0x48),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfettiShape {
    Rect,
    Circle,
    Star,
}

const SHAPES: [ConfettiShape; 3] = [ConfettiShape::Rect, ConfettiShape::Circle, ConfettiShape::Star];

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: (u8, u8, u8),
    pub rotation: f64,
    pub speed_x: f64,
    pub speed_y: f64,
    pub rotation_speed: f64,
    pub shape: ConfettiShape,
    pub opacity: f64,
    pub wobble: f64,
    pub wobble_speed: f64,
}

impl Particle {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let x = if rng.random::<f64>() < CENTER_SHARE {
            30.0 + rng.random::<f64>() * 40.0
        } else {
            rng.random::<f64>() * 100.0
        };
        Particle {
            x,
            y: -20.0 - rng.random::<f64>() * 100.0,
            size: 5.0 + rng.random::<f64>() * 10.0,
            color: CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())],
            rotation: rng.random::<f64>() * 360.0,
            speed_x: (rng.random::<f64>() - 0.5) * 4.0,
            speed_y: 1.0 + rng.random::<f64>() * 3.0,
            rotation_speed: (rng.random::<f64>() - 0.5) * 15.0,
            shape: SHAPES[rng.random_range(0..SHAPES.len())],
            opacity: 0.8 + rng.random::<f64>() * 0.2,
            wobble: rng.random::<f64>() * PI * 2.0,
            wobble_speed: 0.05 + rng.random::<f64>() * 0.1,
        }
    }

    pub fn is_active(&self, viewport_height: f64) -> bool {
        self.y < viewport_height + OFFSCREEN_MARGIN
    }

    /// One frame of motion.
    pub fn step(&mut self, viewport_height: f64) {
        self.wobble += self.wobble_speed;
        self.x += self.speed_x + self.wobble.sin() * WOBBLE_DRIFT;
        self.y += self.speed_y;
        self.rotation += self.rotation_speed;

        self.speed_y += GRAVITY;
        self.speed_x *= AIR_RESISTANCE;
        self.rotation_speed *= ROTATION_DAMPING;

        if self.y > viewport_height * FADE_START {
            self.opacity *= FADE_FACTOR;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfettiField {
    particles: Vec<Particle>,
    viewport_height: f64,
    running: bool,
}

impl ConfettiField {
    pub fn new(viewport_height: f64) -> Self {
        ConfettiField {
            particles: Vec::new(),
            viewport_height,
            running: false,
        }
    }

    pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Vec<Particle> {
        (0..count).map(|_| Particle::random(rng)).collect()
    }

    pub fn launch<R: Rng>(&mut self, count: usize, rng: &mut R) {
        self.particles = Self::generate(count, rng);
        self.running = !self.is_empty();
        debug!(count, "confetti launched");
    }

    /// Drops the whole batch and halts the loop.
    pub fn stop(&mut self) {
        if self.running {
            debug!("confetti stopped");
        }
        self.particles.clear();
        self.running = false;
    }

    pub fn resize(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances every on-screen particle by one frame and returns how many
    /// are still on screen. The loop halts itself when that reaches zero.
    pub fn step(&mut self) -> usize {
        if !self.running {
            return 0;
        }
        let height = self.viewport_height;
        let mut active = 0;
        for particle in self.particles.iter_mut().filter(|p| p.is_active(height)) {
            particle.step(height);
            active += 1;
        }
        if active == 0 {
            self.particles.clear();
            self.running = false;
            debug!("confetti finished");
        }
        active
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        let height = self.viewport_height;
        self.particles.iter().filter(move |p| p.is_active(height))
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
