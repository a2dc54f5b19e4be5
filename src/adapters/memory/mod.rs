//! In-process room hub adapter.

mod hub;

pub use hub::MemoryHub;
