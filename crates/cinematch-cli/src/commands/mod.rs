pub mod bootstrap;
pub mod config;
pub mod recommend;
pub mod serve;
pub mod status;

pub use bootstrap::run_bootstrap;
pub use recommend::run_recommend;
pub use serve::run_serve;
pub use status::show_status;
