pub mod artifact_writer;

pub use artifact_writer::{combined_columns, ArtifactWriter, WriteSummary};
