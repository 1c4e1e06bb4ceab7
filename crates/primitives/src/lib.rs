//! Core types shared by every clone boundary: the structured [`Value`] graph and
//! opaque host handles.

/// Handles to host objects that cannot be structurally serialized.
pub mod opaque;
/// The dynamically typed value graph.
pub mod value;

pub use opaque::OpaqueHandle;
pub use value::{Map, Value};
