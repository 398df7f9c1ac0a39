mod diff;
mod engine;
mod estimate;
mod store;

pub use diff::{changed_fields, generate_diff};
pub use engine::{DryRunEngine, PlanError, lookup_key};
pub use estimate::estimate_execution_time;
pub use store::{EntityStore, ExistingEntity, IdGenerator, InMemoryStore, SequentialIds, UuidIds};
