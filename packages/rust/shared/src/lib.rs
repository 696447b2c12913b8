//! Shared types, error model, and configuration for the curriculum seeder.
//!
//! This crate is the foundation depended on by all other seeder crates.
//! It provides:
//! - [`SeederError`], the unified error type
//! - Domain types ([`Course`], [`CourseDescriptor`], [`Exercise`], [`ContentBlock`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CurriculumConfig, FaqMode, RemoteConfig, SyncConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, SeederError};
pub use types::{
    ContentBlock, Course, CourseDescriptor, CourseId, DEFAULT_LOGO_URL, Exercise, ExerciseContent,
    ExerciseEntry, ExerciseFileRef, ExerciseId, FAQ_LANGUAGE, Faq, MAX_EXERCISE_NAME_LEN,
};
