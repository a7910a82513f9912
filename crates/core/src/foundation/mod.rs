pub mod lifecycle;
pub mod traits;

pub use lifecycle::ManagedObject;
pub use traits::{
    Filter, FilterDecision, FilterRequest, HealthCheck, HealthCheckResult, InjectableProvider,
    LifeCycle, Managed, Task,
};
