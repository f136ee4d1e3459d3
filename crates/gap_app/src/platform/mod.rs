pub mod app;
mod effects;
pub mod logging;
pub mod ui;
