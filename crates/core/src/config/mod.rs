pub mod app_config;
pub mod context;
pub mod sources;
pub mod validation;

pub use app_config::AppConfigTrait;
pub use context::*;
pub use sources::*;
pub use validation::*;
