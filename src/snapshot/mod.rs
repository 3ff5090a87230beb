//! Read-only views of package trees: filesystem access, listing, glob search.

pub mod fs;
pub mod glob;
pub mod walker;
