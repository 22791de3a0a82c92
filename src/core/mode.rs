//! Decoding of packed `st_mode` values into `ls -l` notation.
//!
//! The console hands out the raw mode as a decimal integer. Written in
//! octal, everything before the last four digits is the file type and the
//! last four digits are the special bits followed by the owner, group and
//! other permission triplets.

use crate::error::{DecodeError, Result};

const TRIPLETS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];

const SETUID: u8 = 4;
const SETGID: u8 = 2;
const STICKY: u8 = 1;

/// File type encoded in the leading octal digits of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Fifo,
    CharDevice,
    Directory,
    BlockDevice,
    Regular,
    Symlink,
    Socket,
    Unknown,
}

impl FileType {
    fn from_octal_digits(digits: &str) -> Self {
        match digits {
            "1" => Self::Fifo,
            "2" => Self::CharDevice,
            "4" => Self::Directory,
            "6" => Self::BlockDevice,
            "10" => Self::Regular,
            "12" => Self::Symlink,
            "14" => Self::Socket,
            _ => Self::Unknown,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Self::Fifo => 'p',
            Self::CharDevice => 'c',
            Self::Directory => 'd',
            Self::BlockDevice => 'b',
            Self::Symlink => 'l',
            Self::Socket => 's',
            Self::Regular | Self::Unknown => '-',
        }
    }
}

/// A non-zero packed file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode(u32);

impl FileMode {
    /// Wrap a raw mode. Zero means the console had no mode data.
    pub fn new(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Split the octal text into (file-type digits, four permission digits).
    fn octal_parts(&self) -> (String, [u8; 4]) {
        let octal = format!("{:04o}", self.0);
        let (type_digits, perm_digits) = octal.split_at(octal.len() - 4);

        let mut perms = [0u8; 4];
        for (slot, digit) in perms.iter_mut().zip(perm_digits.bytes()) {
            *slot = digit - b'0';
        }
        (type_digits.to_string(), perms)
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_octal_digits(&self.octal_parts().0)
    }

    /// Ten-character symbolic form, e.g. `drwxr-sr-x`.
    pub fn symbolic(&self) -> String {
        let (type_digits, [special, owner, group, other]) = self.octal_parts();

        let mut out: Vec<char> = Vec::with_capacity(10);
        out.push(FileType::from_octal_digits(&type_digits).symbol());
        for digit in [owner, group, other] {
            out.extend(TRIPLETS[usize::from(digit)].chars());
        }

        for (bit, index, lower, upper) in [
            (SETUID, 3, 's', 'S'),
            (SETGID, 6, 's', 'S'),
            (STICKY, 9, 't', 'T'),
        ] {
            if special & bit != 0 {
                out[index] = if out[index] == 'x' { lower } else { upper };
            }
        }

        out.into_iter().collect()
    }
}

/// Decode a console mode value. `Ok(None)` means "no mode data".
pub fn decode_mode(value: i64) -> Result<Option<String>> {
    let raw = u32::try_from(value).map_err(|_| DecodeError::InvalidMode(value))?;
    Ok(FileMode::new(raw).map(|mode| mode.symbolic()))
}
