/// Kind of job, from the console's single-character `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    Backup,
    Migrated,
    Verify,
    Restore,
    Console,
    Internal,
    Admin,
    Archive,
    CopyOfJob,
    Copy,
    Migration,
    Scan,
    Consolidate,
    Unknown(char),
}

impl JobType {
    pub const KNOWN_CODES: [char; 13] =
        ['B', 'M', 'V', 'R', 'U', 'I', 'D', 'A', 'C', 'c', 'g', 'S', 'O'];

    pub fn from_code(code: char) -> Self {
        match code {
            'B' => Self::Backup,
            'M' => Self::Migrated,
            'V' => Self::Verify,
            'R' => Self::Restore,
            'U' => Self::Console,
            'I' => Self::Internal,
            'D' => Self::Admin,
            'A' => Self::Archive,
            'C' => Self::CopyOfJob,
            'c' => Self::Copy,
            'g' => Self::Migration,
            'S' => Self::Scan,
            'O' => Self::Consolidate,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Backup => 'B',
            Self::Migrated => 'M',
            Self::Verify => 'V',
            Self::Restore => 'R',
            Self::Console => 'U',
            Self::Internal => 'I',
            Self::Admin => 'D',
            Self::Archive => 'A',
            Self::CopyOfJob => 'C',
            Self::Copy => 'c',
            Self::Migration => 'g',
            Self::Scan => 'S',
            Self::Consolidate => 'O',
            Self::Unknown(c) => *c,
        }
    }

    pub fn label(&self) -> String {
        let label = match self {
            Self::Backup => "Backup",
            Self::Migrated => "Migrated",
            Self::Verify => "Verify",
            Self::Restore => "Restore",
            Self::Console => "Console program",
            Self::Internal => "Internal system job",
            Self::Admin => "Admin",
            Self::Archive => "Archive",
            Self::CopyOfJob => "Copy of a job",
            Self::Copy => "Copy job",
            Self::Migration => "Migration job",
            Self::Scan => "Scan",
            Self::Consolidate => "Consolidate",
            Self::Unknown(c) => return c.to_string(),
        };
        label.to_string()
    }
}

impl From<char> for JobType {
    fn from(code: char) -> Self {
        Self::from_code(code)
    }
}
