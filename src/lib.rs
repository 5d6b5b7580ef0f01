pub mod batch;
pub mod config;
pub mod engine;
pub mod keyboard;
pub mod language;
pub mod model;
pub mod playback;
pub mod sim;
pub mod trace;
