pub mod config;
pub mod logging;
pub mod wiring;

pub use config::load_config;
pub use logging::init_logging;
pub use wiring::build_resolver;
