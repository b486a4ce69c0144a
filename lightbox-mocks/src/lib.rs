//! lightbox mocks - In-memory document for running the gallery without a browser
//!
//! Used by the gallery tests: clicks are dispatched by hand and image loads
//! complete only when the test says so.

pub mod memory_dom;

pub use memory_dom::{MemoryDom, MemoryListener, NodeId};
