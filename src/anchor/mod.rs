pub mod anchor_model;
pub mod fingerprint;
pub mod locator;
pub mod scorer;
pub mod selector;
