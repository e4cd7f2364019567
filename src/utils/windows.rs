pub mod time {

    /// 100-ns intervals (ticks) from 1601-01-01 to 1970-01-01.
    pub const TICKS_FROM_WINDOWS_EPOCH_TO_UNIX_EPOCH: i64 = 116_444_736_000_000_000;

    const NANOS_PER_TICK: i64 = 100;
    const NANOS_PER_SECOND: i64 = 1_000_000_000;

    /// Ticks since the Windows epoch, split the way `FILETIME` stores them.
    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct Filetime {
        pub low_date_time: u32,
        pub high_date_time: u32,
    }

    impl Filetime {
        pub fn from_ticks(ticks: i64) -> Self {
            Self {
                low_date_time: (ticks & 0xFFFF_FFFF) as u32,
                high_date_time: (ticks >> 32) as u32,
            }
        }

        /// Reassembled tick count, `(high << 32) | low`.
        pub fn ticks(self) -> i64 {
            (i64::from(self.high_date_time) << 32) + i64::from(self.low_date_time)
        }

        /// Nanoseconds since the Unix epoch. Negative before 1970.
        ///
        /// Arithmetic wraps on overflow.
        pub fn nanoseconds(self) -> i64 {
            windows_ticks_to_unix_nano(self.ticks())
        }

        /// Sub-100ns precision is truncated toward zero.
        pub fn from_unix_nanos(nsec: i64) -> Self {
            Self::from_ticks(unix_nano_to_windows_ticks(nsec))
        }

        /// Converts a POSIX `(tv_sec, tv_nsec)` pair.
        pub fn from_timespec(sec: i64, nsec: i64) -> Self {
            Self::from_unix_nanos(sec.wrapping_mul(NANOS_PER_SECOND).wrapping_add(nsec))
        }
    }

    pub fn windows_ticks_to_unix_nano(ticks: i64) -> i64 {
        ticks
            .wrapping_sub(TICKS_FROM_WINDOWS_EPOCH_TO_UNIX_EPOCH)
            .wrapping_mul(NANOS_PER_TICK)
    }

    pub fn unix_nano_to_windows_ticks(nsec: i64) -> i64 {
        // i64::MAX / 100 + offset still fits, no wrap possible here
        nsec / NANOS_PER_TICK + TICKS_FROM_WINDOWS_EPOCH_TO_UNIX_EPOCH
    }

    impl From<std::time::SystemTime> for Filetime {
        fn from(st: std::time::SystemTime) -> Self {
            match st.duration_since(std::time::UNIX_EPOCH) {
                Ok(after) => Self::from_timespec(after.as_secs() as i64, i64::from(after.subsec_nanos())),
                Err(e) => {
                    let before = e.duration();
                    Self::from_timespec(
                        -(before.as_secs() as i64),
                        -i64::from(before.subsec_nanos()),
                    )
                }
            }
        }
    }

    impl From<Filetime> for u64 {
        fn from(ft: Filetime) -> Self {
            (u64::from(ft.high_date_time) << 32) | u64::from(ft.low_date_time)
        }
    }

    impl From<u64> for Filetime {
        fn from(num: u64) -> Self {
            Self::from_ticks(num as i64)
        }
    }

}

pub mod file {

    pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
    pub const FILE_ATTRIBUTE_NORMAL: u32 = 0x80;

    /// Layout-compatible with `BY_HANDLE_FILE_INFORMATION`.
    ///
    /// 64-bit quantities are stored as `(high, low)` halves; use
    /// [`PortableFileInfo::file_size`] and [`PortableFileInfo::file_index`]
    /// to work with the whole value.
    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
    pub struct PortableFileInfo {
        pub file_attributes: u32,
        pub creation_time: super::time::Filetime,
        pub last_access_time: super::time::Filetime,
        pub last_write_time: super::time::Filetime,
        pub volume_serial_number: u32,
        pub file_size_high: u32,
        pub file_size_low: u32,
        pub number_of_links: u32,
        pub file_index_high: u32,
        pub file_index_low: u32,
    }

    impl PortableFileInfo {
        pub fn is_directory(&self) -> bool {
            self.file_attributes & FILE_ATTRIBUTE_DIRECTORY != 0
        }

        pub fn file_size(&self) -> u64 {
            join_u64(self.file_size_high, self.file_size_low)
        }

        pub fn set_file_size(&mut self, size: u64) {
            (self.file_size_high, self.file_size_low) = split_u64(size);
        }

        pub fn file_index(&self) -> u64 {
            join_u64(self.file_index_high, self.file_index_low)
        }

        pub fn set_file_index(&mut self, index: u64) {
            (self.file_index_high, self.file_index_low) = split_u64(index);
        }
    }

    /// Returns `(high, low)`.
    #[inline]
    pub fn split_u64(value: u64) -> (u32, u32) {
        ((value >> 32) as u32, (value & 0xFFFF_FFFF) as u32)
    }

    #[inline]
    pub fn join_u64(high: u32, low: u32) -> u64 {
        (u64::from(high) << 32) | u64::from(low)
    }

}
