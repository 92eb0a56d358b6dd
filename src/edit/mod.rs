pub mod applicator;
pub mod edit_id;
pub mod edit_model;
pub mod session;
