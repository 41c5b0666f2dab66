use clap::ValueEnum;
use serde::Serialize;

/// Initial filesystem put on a new drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriveFormat {
    Windows,
    #[value(name = "macos")]
    MacOs,
    Linux,
    Universal,
}

impl DriveFormat {
    pub const ALL: [DriveFormat; 4] =
        [DriveFormat::Windows, DriveFormat::MacOs, DriveFormat::Linux, DriveFormat::Universal];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Windows   => "Windows (NTFS)",
            Self::MacOs     => "macOS (exFAT)",
            Self::Linux     => "Linux (ext3)",
            Self::Universal => "Universal (FAT32)",
        }
    }

    /// Next entry down the picker; stops at the last one.
    pub fn next(&self) -> Self {
        match self {
            Self::Windows   => Self::MacOs,
            Self::MacOs     => Self::Linux,
            Self::Linux     => Self::Universal,
            Self::Universal => Self::Universal,
        }
    }

    /// Next entry up the picker; stops at the first one.
    pub fn prev(&self) -> Self {
        match self {
            Self::Windows   => Self::Windows,
            Self::MacOs     => Self::Windows,
            Self::Linux     => Self::MacOs,
            Self::Universal => Self::Linux,
        }
    }

    /// Filesystem type recorded in the msdos partition entry.
    pub fn partition_type(&self) -> &'static str {
        match self {
            Self::Windows | Self::MacOs => "ntfs",
            Self::Linux                 => "ext3",
            Self::Universal             => "fat32",
        }
    }

    /// mkfs tool and its options; the partition path goes last.
    pub fn mkfs(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Windows   => ("mkfs.ntfs", &["--fast"]),
            Self::MacOs     => ("mkfs.exfat", &[]),
            Self::Linux     => ("mkfs.ext3", &["-q"]),
            Self::Universal => ("mkfs.fat", &["-F", "32"]),
        }
    }
}
