pub mod confetti;
pub mod config;
pub mod options;
pub mod render;
pub mod schedule;
pub mod tween;
pub mod wheel;

pub mod test_helpers;

pub use wheel::{
    WheelEvent,
    WheelService,
    WheelTimings,
    pointer_index,
};
