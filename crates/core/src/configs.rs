//! Configuration parsing for pipeline definition files

pub mod pipeline;
