#![allow(dead_code)]

pub mod full_store;
pub mod pages;
pub mod spy;
