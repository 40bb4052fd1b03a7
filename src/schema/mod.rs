//! Data types shared across the pipeline.

pub mod context;
pub mod message;
pub mod record;
