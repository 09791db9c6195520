pub mod domain;
pub mod history;
pub mod import;
pub mod report;
pub mod scoring;

mod pipeline;

pub use pipeline::RecoveryPipeline;
