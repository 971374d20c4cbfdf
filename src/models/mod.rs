pub mod activity;
pub mod candidate;
pub mod progress;
pub mod round;
pub mod round_config;
