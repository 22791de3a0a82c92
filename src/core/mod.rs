pub mod actions;
pub mod format;
pub mod job_type;
pub mod level;
pub mod mode;
pub mod models;
pub mod render;
pub mod status;
pub mod volume;

pub use actions::{Action, ActionSet, available_actions};
pub use format::{
    SizeBase, format_binary_size, format_byte_size, format_duration, format_free_bytes,
    format_relative_age,
};
pub use job_type::JobType;
pub use level::JobLevel;
pub use mode::{FileMode, FileType, decode_mode};
pub use models::{FileNode, FileStat, JobRecord, NodeType, Numeric, VolumeRecord};
pub use render::{FileNodeView, JobView, RenderOptions, VolumeView};
pub use status::{JobStatus, LabelOptions, RunningLabel, StatusCategory, StatusInfo, WaitingLabel};
pub use volume::{Expiration, VolumeStatus, compute_expiration};
