mod lifecycle;

pub use lifecycle::{EventBus, LifecycleEvent};
