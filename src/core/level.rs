/// Backup level, from the console's single-character `level` field.
///
/// Non-backup jobs report a space, which maps to [`JobLevel::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobLevel {
    Full,
    Differential,
    Incremental,
    VirtualFull,
    Base,
    Catalog,
    InitCatalog,
    VolumeToCatalog,
    DiskToCatalog,
    Data,
    None,
    Unknown(char),
}

impl JobLevel {
    pub const KNOWN_CODES: [char; 11] = ['F', 'D', 'I', 'f', 'B', 'C', 'V', 'O', 'd', 'A', ' '];

    pub fn from_code(code: char) -> Self {
        match code {
            'F' => Self::Full,
            'D' => Self::Differential,
            'I' => Self::Incremental,
            'f' => Self::VirtualFull,
            'B' => Self::Base,
            'C' => Self::Catalog,
            'V' => Self::InitCatalog,
            'O' => Self::VolumeToCatalog,
            'd' => Self::DiskToCatalog,
            'A' => Self::Data,
            ' ' => Self::None,
            other => Self::Unknown(other),
        }
    }

    pub fn label(&self) -> String {
        let label = match self {
            Self::Full => "Full",
            Self::Differential => "Differential",
            Self::Incremental => "Incremental",
            Self::VirtualFull => "VirtualFull",
            Self::Base => "Base",
            Self::Catalog => "Catalog",
            Self::InitCatalog => "InitCatalog",
            Self::VolumeToCatalog => "VolumeToCatalog",
            Self::DiskToCatalog => "DiskToCatalog",
            Self::Data => "Data",
            Self::None => "None",
            Self::Unknown(c) => return c.to_string(),
        };
        label.to_string()
    }
}

impl From<char> for JobLevel {
    fn from(code: char) -> Self {
        Self::from_code(code)
    }
}
