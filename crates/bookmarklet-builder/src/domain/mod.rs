//! Domain types shared by the build stages.

pub mod errors;
pub mod model;
