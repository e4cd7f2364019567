use std::os::unix::fs::{MetadataExt, OpenOptionsExt};

use crate::utils::windows::file::{FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_NORMAL, PortableFileInfo};
use crate::utils::windows::time::Filetime;

/// The subset of `struct stat` the portable record is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatRecord {
    pub mode: u32,
    pub atime: (i64, i64),
    pub mtime: (i64, i64),
    pub size: u64,
    pub nlink: u64,
    pub ino: u64,
}

impl From<&std::fs::Metadata> for StatRecord {
    fn from(st: &std::fs::Metadata) -> Self {
        Self {
            mode: st.mode(),
            atime: (st.atime(), st.atime_nsec()),
            mtime: (st.mtime(), st.mtime_nsec()),
            size: st.size(),
            nlink: st.nlink(),
            ino: st.ino(),
        }
    }
}

impl PortableFileInfo {
    /// Maps a POSIX status record onto the Windows-shaped record.
    ///
    /// Anything that is not a directory, devices and sockets included, is
    /// reported as a normal file. There is no birth time in the record, so
    /// the creation time is the modification time. Link counts above
    /// `u32::MAX` are truncated.
    pub fn from_stat(st: &StatRecord) -> Self {
        let file_attributes = if (st.mode & libc::S_IFMT as u32) == libc::S_IFDIR as u32 {
            FILE_ATTRIBUTE_DIRECTORY
        } else {
            FILE_ATTRIBUTE_NORMAL
        };

        let mtime = Filetime::from_timespec(st.mtime.0, st.mtime.1);

        let mut info = Self {
            file_attributes,
            creation_time: mtime,
            last_access_time: Filetime::from_timespec(st.atime.0, st.atime.1),
            last_write_time: mtime,
            volume_serial_number: 0,
            number_of_links: st.nlink as u32,
            ..Self::default()
        };
        info.set_file_size(st.size);
        info.set_file_index(st.ino);
        info
    }
}

/// Stats `path`, following symbolic links.
pub fn query_file_info(path: impl AsRef<std::path::Path>) -> crate::Result<PortableFileInfo> {
    let path = path.as_ref();

    let metadata = std::fs::metadata(path).map_err(|source| {
        crate::log_debug_with_context!(source, "stat failed for {:?}", path);
        crate::Error::FileStat {
            path: path.to_owned(),
            source,
        }
    })?;

    let info = PortableFileInfo::from_stat(&StatRecord::from(&metadata));
    crate::log_trace!("File info for {:?}: {:?}", path, info);
    Ok(info)
}

/// Creates (or truncates) `destination` and sizes it to `file_size` bytes.
///
/// With `write_through` the file is opened `O_SYNC`. `force_if_read_only`
/// has no meaning on this platform and is ignored. If resizing fails the
/// handle is closed before the error is returned.
pub fn create_sized_file(
    destination: impl AsRef<std::path::Path>,
    file_size: i64,
    write_through: bool,
    tracker: &dyn crate::utils::transfer::FolderCreationTracker,
    force_if_read_only: bool,
) -> crate::Result<std::fs::File> {
    let _ = force_if_read_only;
    let destination = destination.as_ref();

    crate::utils::transfer::create_parent_directory_if_not_exist(destination, tracker)?;

    let mut options = std::fs::OpenOptions::new();
    options
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .mode(crate::utils::config::DEFAULT_FILE_PERM);
    if write_through {
        // O_DSYNC would do, but O_SYNC is available everywhere
        options.custom_flags(libc::O_SYNC);
    }

    let file = options.open(destination).map_err(|source| {
        crate::log_debug_with_context!(source, "Failed to open {:?}", destination);
        crate::Error::FileOpen {
            path: destination.to_owned(),
            source,
        }
    })?;

    if file_size == 0 {
        return Ok(file);
    }

    let resized = u64::try_from(file_size)
        .map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "negative file size")
        })
        .and_then(|len| file.set_len(len));

    if let Err(source) = resized {
        // close errors are not reported on top of the resize error
        drop(file);
        crate::log_debug_with_context!(source, "Failed to size {:?}", destination);
        return Err(crate::Error::FileResize {
            path: destination.to_owned(),
            size: file_size,
            source,
        });
    }

    crate::log_trace!(
        "Created {:?} with {} bytes (write-through: {})",
        destination,
        file_size,
        write_through
    );
    Ok(file)
}

/// Backup semantics do not exist here; accepted and ignored.
pub fn set_backup_mode(enable: bool, from_to: crate::utils::transfer::FromTo) -> crate::Result<()> {
    crate::log_trace!("Backup mode ({}) n/a for {:?}", enable, from_to);
    Ok(())
}
