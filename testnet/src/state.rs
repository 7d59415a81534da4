use std::{io::ErrorKind, path::Path};

use crate::Error;

/// Remove persisted state, `entries` are resolved against `workdir`.
///
/// Directories are removed recursively. Entries that don't exist are skipped.
#[tracing::instrument(level = "debug", skip_all, fields(workdir = %workdir.display()))]
pub fn remove_state_files<P>(workdir: &Path, entries: &[P]) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    for entry in entries {
        let path = workdir.join(entry);
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };

        match result {
            Ok(()) => tracing::info!("removed {}", path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} does not exist", path.display())
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
