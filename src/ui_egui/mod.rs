pub mod action_button;
mod app;
pub mod display;
pub mod pulse;

pub use app::{CountdownApp, MIN_ROOT_HEIGHT, MIN_ROOT_WIDTH};
