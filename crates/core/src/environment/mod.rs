pub mod runtime;
pub mod service;

pub use runtime::RuntimeEnvironment;
pub use service::{FilterMapping, ServiceEnvironment};
