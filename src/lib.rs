pub mod agent;
pub mod anchor;
pub mod cli;
pub mod dom;
pub mod edit;
pub mod popup;
pub mod store;
pub mod trace;
pub mod watch;
