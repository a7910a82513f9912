use std::sync::Arc;

use crate::errors::CoreError;
use crate::foundation::traits::{LifeCycle, Managed};

/// Anything the runtime's lifecycle manager can start and stop
#[derive(Clone)]
pub enum ManagedObject {
    Managed(Arc<dyn Managed>),
    LifeCycle(Arc<dyn LifeCycle>),
}

impl ManagedObject {
    pub fn start(&self) -> Result<(), CoreError> {
        match self {
            ManagedObject::Managed(managed) => managed.start(),
            ManagedObject::LifeCycle(life_cycle) => life_cycle.start(),
        }
    }

    pub fn stop(&self) -> Result<(), CoreError> {
        match self {
            ManagedObject::Managed(managed) => managed.stop(),
            ManagedObject::LifeCycle(life_cycle) => life_cycle.stop(),
        }
    }

    /// Whether the runtime drives this object through `LifeCycle`
    pub fn is_life_cycle(&self) -> bool {
        matches!(self, ManagedObject::LifeCycle(_))
    }
}

impl std::fmt::Debug for ManagedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManagedObject::Managed(_) => f.debug_tuple("Managed").field(&"<managed>").finish(),
            ManagedObject::LifeCycle(life_cycle) => f
                .debug_struct("LifeCycle")
                .field("running", &life_cycle.is_running())
                .finish(),
        }
    }
}
