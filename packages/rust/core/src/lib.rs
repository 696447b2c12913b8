//! Core pipeline orchestration for the curriculum seeder.
//!
//! This crate ties together folder listing, descriptor/outline parsing,
//! exercise assembly, and reconciliation with the content service into the
//! end-to-end `seed` workflow.

pub mod assembler;
pub mod catalog;
pub mod ingest;
pub mod pipeline;
pub mod sync;

#[cfg(test)]
mod testing;

pub use assembler::{AssembleOptions, Assembly, DroppedExercise, ExerciseAssembler};
pub use catalog::list_course_folders;
pub use ingest::{FolderIssue, FolderOutcome, IngestContext, ingest_folder};
pub use pipeline::{
    Curriculum, ProgressReporter, SeedResult, SilentProgress, load_curriculum, run_seed,
};
pub use sync::{ItemKind, ItemOutcome, ItemStatus, SyncEngine, SyncReport};
