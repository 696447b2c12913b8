//! Course folder listing and file reads.

use std::path::Path;

use tracing::{debug, instrument};

use seeder_shared::{Result, SeederError};

/// List the immediate subdirectories of `root`, sorted by name.
///
/// Only one level is read. Loose files (a top-level `README.md`, `.gitignore`
/// and the like) are never course folders. An unreadable root is an error.
#[instrument(skip_all, fields(root = %root.display()))]
pub async fn list_course_folders(root: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|e| SeederError::io(root, e))?;

    let mut folders = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SeederError::io(root, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| SeederError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            debug!(%name, "skipping file at curriculum root");
            continue;
        }
        folders.push(name);
    }

    folders.sort();
    debug!(count = folders.len(), "course folders listed");
    Ok(folders)
}

/// Read a UTF-8 file. A missing file is [`SeederError::NotFound`].
pub(crate) async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeederError::io(path, e))
}
