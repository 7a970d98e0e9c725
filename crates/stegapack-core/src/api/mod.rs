//! Builder-style convenience layer over [`crate::commands`].

pub mod embed;
pub mod extract;
