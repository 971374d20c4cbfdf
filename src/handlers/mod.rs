pub mod activity;
pub mod progress;
pub mod round_configs;
