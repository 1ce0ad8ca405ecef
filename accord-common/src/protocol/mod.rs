//! Wire-level protocol types shared by every crate in the workspace.

pub mod message;
pub mod types;
