//! Job status codes reported by the backup console.
//!
//! Each job carries a single-character `jobstatus`. The set of codes is
//! closed but newer directors may add codes, so anything unrecognized is
//! kept as [`JobStatus::Unknown`] and rendered verbatim.

use serde::{Deserialize, Serialize};

/// Semantic grouping of job status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    Success,
    Warning,
    Failure,
    Canceled,
    Running,
    Waiting,
    Blocked,
    Incomplete,
    Unknown,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Failure => "Failure",
            Self::Canceled => "Canceled",
            Self::Running => "Running",
            Self::Waiting => "Waiting",
            Self::Blocked => "Blocked",
            Self::Incomplete => "Incomplete",
            Self::Unknown => "Unknown",
        }
    }
}

/// How a job in state `C` (created, not yet running) is labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitingLabel {
    #[default]
    Waiting,
    Queued,
}

/// How the running sub-phases (`a`, `i`, `L`, `l`) are labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningLabel {
    /// Plain "Running"
    #[default]
    Generic,
    /// The phase description, e.g. "Doing data despooling"
    Phase,
}

/// Label choices that differ between call sites of the web front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelOptions {
    #[serde(default)]
    pub waiting_label: WaitingLabel,
    #[serde(default)]
    pub running_label: RunningLabel,
}

/// Classification result for a status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub code: char,
    pub category: StatusCategory,
    pub label: String,
    pub tooltip: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// `T`
    Terminated,
    /// `W`
    TerminatedWithWarnings,
    /// `E`
    Error,
    /// `e`
    NonFatalError,
    /// `f`
    FatalError,
    /// `A`
    Canceled,
    /// `R`
    Running,
    /// `C`
    Created,
    /// `B`
    Blocked,
    /// `D`
    VerifyDifferences,
    /// `F`
    WaitingOnFileDaemon,
    /// `S`
    WaitingOnStorageDaemon,
    /// `m`
    WaitingForMedia,
    /// `M`
    WaitingForMount,
    /// `s`
    WaitingForStorageResource,
    /// `j`
    WaitingForJobResource,
    /// `c`
    WaitingForClientResource,
    /// `d`
    WaitingForMaxJobs,
    /// `t`
    WaitingForStartTime,
    /// `p`
    WaitingForPriority,
    /// `q`
    QueuedForDevice,
    /// `a`
    DespoolingAttributes,
    /// `i`
    BatchInsert,
    /// `L`
    CommittingData,
    /// `l`
    DespoolingData,
    /// `I`
    Incomplete,
    Unknown(char),
}

impl JobStatus {
    /// Every status code the registry knows about.
    pub const KNOWN_CODES: [char; 26] = [
        'T', 'W', 'E', 'e', 'f', 'A', 'R', 'C', 'B', 'D', 'F', 'S', 'm', 'M', 's', 'j', 'c', 'd',
        't', 'p', 'a', 'i', 'I', 'L', 'l', 'q',
    ];

    pub fn from_code(code: char) -> Self {
        match code {
            'T' => Self::Terminated,
            'W' => Self::TerminatedWithWarnings,
            'E' => Self::Error,
            'e' => Self::NonFatalError,
            'f' => Self::FatalError,
            'A' => Self::Canceled,
            'R' => Self::Running,
            'C' => Self::Created,
            'B' => Self::Blocked,
            'D' => Self::VerifyDifferences,
            'F' => Self::WaitingOnFileDaemon,
            'S' => Self::WaitingOnStorageDaemon,
            'm' => Self::WaitingForMedia,
            'M' => Self::WaitingForMount,
            's' => Self::WaitingForStorageResource,
            'j' => Self::WaitingForJobResource,
            'c' => Self::WaitingForClientResource,
            'd' => Self::WaitingForMaxJobs,
            't' => Self::WaitingForStartTime,
            'p' => Self::WaitingForPriority,
            'q' => Self::QueuedForDevice,
            'a' => Self::DespoolingAttributes,
            'i' => Self::BatchInsert,
            'L' => Self::CommittingData,
            'l' => Self::DespoolingData,
            'I' => Self::Incomplete,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Terminated => 'T',
            Self::TerminatedWithWarnings => 'W',
            Self::Error => 'E',
            Self::NonFatalError => 'e',
            Self::FatalError => 'f',
            Self::Canceled => 'A',
            Self::Running => 'R',
            Self::Created => 'C',
            Self::Blocked => 'B',
            Self::VerifyDifferences => 'D',
            Self::WaitingOnFileDaemon => 'F',
            Self::WaitingOnStorageDaemon => 'S',
            Self::WaitingForMedia => 'm',
            Self::WaitingForMount => 'M',
            Self::WaitingForStorageResource => 's',
            Self::WaitingForJobResource => 'j',
            Self::WaitingForClientResource => 'c',
            Self::WaitingForMaxJobs => 'd',
            Self::WaitingForStartTime => 't',
            Self::WaitingForPriority => 'p',
            Self::QueuedForDevice => 'q',
            Self::DespoolingAttributes => 'a',
            Self::BatchInsert => 'i',
            Self::CommittingData => 'L',
            Self::DespoolingData => 'l',
            Self::Incomplete => 'I',
            Self::Unknown(c) => *c,
        }
    }

    pub fn category(&self) -> StatusCategory {
        match self {
            Self::Terminated => StatusCategory::Success,
            Self::TerminatedWithWarnings | Self::VerifyDifferences => StatusCategory::Warning,
            Self::Error | Self::NonFatalError | Self::FatalError => StatusCategory::Failure,
            Self::Canceled => StatusCategory::Canceled,
            Self::Running
            | Self::DespoolingAttributes
            | Self::BatchInsert
            | Self::CommittingData
            | Self::DespoolingData => StatusCategory::Running,
            Self::Created
            | Self::WaitingOnFileDaemon
            | Self::WaitingOnStorageDaemon
            | Self::WaitingForMedia
            | Self::WaitingForMount
            | Self::WaitingForStorageResource
            | Self::WaitingForJobResource
            | Self::WaitingForClientResource
            | Self::WaitingForMaxJobs
            | Self::WaitingForStartTime
            | Self::WaitingForPriority
            | Self::QueuedForDevice => StatusCategory::Waiting,
            Self::Blocked => StatusCategory::Blocked,
            Self::Incomplete => StatusCategory::Incomplete,
            Self::Unknown(_) => StatusCategory::Unknown,
        }
    }

    /// Long description shown as a tooltip next to the label.
    pub fn tooltip(&self) -> &'static str {
        match self {
            Self::Terminated => "Terminated normally",
            Self::TerminatedWithWarnings => "Terminated normally with warnings",
            Self::Error => "Job terminated in error",
            Self::NonFatalError => "Non-fatal error",
            Self::FatalError => "Fatal error",
            Self::Canceled => "Canceled by user",
            Self::Running => "Running",
            Self::Created => "Created but not yet running",
            Self::Blocked => "Blocked",
            Self::VerifyDifferences => "Verify found differences",
            Self::WaitingOnFileDaemon => "Waiting on File daemon",
            Self::WaitingOnStorageDaemon => "Waiting on the Storage daemon",
            Self::WaitingForMedia => "Waiting for new media",
            Self::WaitingForMount => "Waiting for mount",
            Self::WaitingForStorageResource => "Waiting for storage resource",
            Self::WaitingForJobResource => "Waiting for job resource",
            Self::WaitingForClientResource => "Waiting for client resource",
            Self::WaitingForMaxJobs => "Waiting for maximum jobs",
            Self::WaitingForStartTime => "Waiting for start time",
            Self::WaitingForPriority => "Waiting for higher priority jobs to finish",
            Self::QueuedForDevice => "Queued waiting for device",
            Self::DespoolingAttributes => "SD despooling attributes",
            Self::BatchInsert => "Doing batch insert file records",
            Self::CommittingData => "Committing data (last despool)",
            Self::DespoolingData => "Doing data despooling",
            Self::Incomplete => "Incomplete Job",
            Self::Unknown(_) => "",
        }
    }

    fn is_running_phase(&self) -> bool {
        matches!(
            self,
            Self::DespoolingAttributes
                | Self::BatchInsert
                | Self::CommittingData
                | Self::DespoolingData
        )
    }

    /// Visible label for this status under the given label options.
    pub fn label(&self, options: &LabelOptions) -> String {
        match self {
            Self::Unknown(c) => c.to_string(),
            Self::Created if options.waiting_label == WaitingLabel::Queued => "Queued".to_string(),
            s if s.is_running_phase() && options.running_label == RunningLabel::Phase => {
                s.tooltip().to_string()
            }
            s => s.category().as_str().to_string(),
        }
    }

    pub fn classify(&self, options: &LabelOptions) -> StatusInfo {
        StatusInfo {
            code: self.code(),
            category: self.category(),
            label: self.label(options),
            tooltip: self.tooltip(),
        }
    }

    /// Job finished successfully, possibly with warnings.
    pub fn is_success_like(&self) -> bool {
        matches!(self, Self::Terminated | Self::TerminatedWithWarnings)
    }

    /// Job finished without producing a usable result.
    pub fn is_failure_like(&self) -> bool {
        matches!(
            self,
            Self::Error | Self::NonFatalError | Self::FatalError | Self::Canceled | Self::Incomplete
        )
    }

    /// Job reached a final state. `D` only occurs on finished verify jobs.
    pub fn is_terminal(&self) -> bool {
        self.is_success_like() || self.is_failure_like() || *self == Self::VerifyDifferences
    }
}

impl From<char> for JobStatus {
    fn from(code: char) -> Self {
        Self::from_code(code)
    }
}
