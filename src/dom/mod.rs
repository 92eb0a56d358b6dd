pub mod document;
pub mod markup;
pub mod query;
pub mod tree;

pub use document::{Document, PageSnapshot};
pub use query::{SelectorError, query_selector};
pub use tree::{Dom, NodeId, Rect};
