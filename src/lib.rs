pub mod app;
pub mod audio;
pub mod browser;
pub mod config;
pub mod core;
pub mod error;
pub mod metadata;
pub mod model;
pub mod playback;
pub mod playlist;
pub mod queue;
pub mod ui;
