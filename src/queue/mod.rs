pub mod scheduler;
pub mod summary;
pub mod target;

pub use scheduler::Scheduler;
pub use summary::{Summary, TaskResult};
pub use target::{load_targets, parse_target_line, Target};
