pub mod scheduler;
pub mod watcher;
