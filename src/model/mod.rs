//! Data model: wire [`Element`]s and in-memory [`Document`]s.

pub mod document;
pub mod element;


pub use document::{Document, Node, NodeId, Value};
pub use element::Element;
