/// Source and destination kinds of a transfer job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FromTo {
    LocalBlob,
    LocalFile,
    BlobLocal,
    FileLocal,
    BlobBlob,
    FileFile,
    BlobFile,
    FileBlob,
}

/// Told about every folder a transfer creates, so the job can later set
/// folder properties or clean up after itself.
pub trait FolderCreationTracker: Send + Sync {
    fn record_creation(&self, folder: &std::path::Path);
}

/// Tracker for callers that do not care which folders got created.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFolderTracker;

impl FolderCreationTracker for NullFolderTracker {
    fn record_creation(&self, _folder: &std::path::Path) {}
}

/// Creates the missing ancestors of `path`'s parent.
///
/// Folders are recorded with `tracker` outermost first, and only the ones
/// this call actually found missing. Losing a creation race to another
/// transfer is not an error.
pub fn create_parent_directory_if_not_exist(
    path: &std::path::Path,
    tracker: &dyn FolderCreationTracker,
) -> crate::Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if parent.is_dir() {
        return Ok(());
    }

    let missing: Vec<&std::path::Path> = parent
        .ancestors()
        .take_while(|folder| !folder.as_os_str().is_empty() && !folder.exists())
        .collect();

    match std::fs::create_dir_all(parent) {
        Ok(()) => {}
        Err(_) if parent.is_dir() => {
            crate::log_trace!("Parent {:?} was created concurrently", parent);
        }
        Err(source) => {
            crate::log_debug_with_context!(source, "Failed to create directory {:?}", parent);
            return Err(crate::Error::DirectoryCreation {
                path: parent.to_owned(),
                source,
            });
        }
    }

    for folder in missing.into_iter().rev() {
        tracker.record_creation(folder);
    }

    Ok(())
}
