//! Application layer: the build stages and the pipeline that runs them.

pub mod enrich;
pub mod minify;
pub mod pipeline;
pub mod sync;
