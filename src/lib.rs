pub mod cli;
pub mod event;
pub mod ingest;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod sweep;
