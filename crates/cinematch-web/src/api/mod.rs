//! HTTP API handlers

pub mod health;
pub mod recommend;
pub mod ui;

pub use health::health_routes;
pub use recommend::recommend_routes;
pub use ui::ui_routes;
