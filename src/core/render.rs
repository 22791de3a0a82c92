//! Turning console records into display-ready views.
//!
//! A field that fails to decode is replaced by [`INVALID_PLACEHOLDER`] and
//! logged; the rest of the record and the rest of the list still render.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use tracing::warn;

use super::actions::{ActionSet, available_actions};
use super::format::{
    SizeBase, format_byte_size, format_duration, format_free_bytes, format_relative_age,
};
use super::job_type::JobType;
use super::level::JobLevel;
use super::mode::decode_mode;
use super::models::{self, FileNode, JobRecord, NodeType, VolumeRecord};
use super::status::{JobStatus, LabelOptions, StatusCategory, StatusInfo};
use super::volume::{Expiration, VolumeStatus, compute_expiration, parse_last_written};
use crate::error::{DecodeError, INVALID_PLACEHOLDER};

/// Everything a render call depends on besides the record itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub labels: LabelOptions,
    /// Offset of the director's local time, used for `lastwritten`
    pub utc_offset: FixedOffset,
    pub file_size_base: SizeBase,
    pub now: DateTime<Utc>,
}

impl RenderOptions {
    /// UTC, default labels, decimal sizes, clock fixed at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            labels: LabelOptions::default(),
            utc_offset: Utc.fix(),
            file_size_base: SizeBase::default(),
            now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub jobid: String,
    pub name: String,
    pub client: String,
    pub status: StatusInfo,
    pub job_type: String,
    pub level: String,
    pub files: String,
    pub bytes: String,
    pub errors: String,
    pub starttime: String,
    pub endtime: String,
    pub actions: ActionSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeView {
    pub name: String,
    pub pool: String,
    pub media_type: String,
    pub status: String,
    pub last_written: String,
    pub retention: String,
    pub expires: String,
    /// Sort key; `None` when the record could not be decoded
    #[serde(skip)]
    pub expiration: Option<Expiration>,
    pub capacity: String,
    pub used: String,
    pub free: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileNodeView {
    pub name: String,
    pub node_type: NodeType,
    /// `None` when the console had no mode data
    pub permissions: Option<String>,
    pub user: String,
    pub group: String,
    pub uid: String,
    pub gid: String,
    pub size: String,
    pub modified: String,
}

/// Unwrap a decoded value or log and substitute the placeholder.
fn or_placeholder<T>(
    value: Result<T, DecodeError>,
    record: &str,
    render: impl FnOnce(T) -> String,
) -> String {
    match value {
        Ok(value) => render(value),
        Err(e) => {
            warn!(record = %record, error = %e, "Failed to decode field");
            INVALID_PLACEHOLDER.to_string()
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn invalid_status() -> StatusInfo {
    StatusInfo {
        code: '?',
        category: StatusCategory::Unknown,
        label: INVALID_PLACEHOLDER.to_string(),
        tooltip: "",
    }
}

pub fn render_job(job: &JobRecord, options: &RenderOptions) -> JobView {
    let jobid = job.jobid.to_string();

    let status = models::code(&job.jobstatus, "jobstatus").map(JobStatus::from_code);
    let job_type = models::code(&job.job_type, "type").map(JobType::from_code);

    let actions = match (&status, &job_type) {
        (Ok(status), Ok(job_type)) => available_actions(*status, *job_type),
        (_, Ok(job_type)) => available_actions(JobStatus::Unknown('?'), *job_type),
        _ => available_actions(JobStatus::Unknown('?'), JobType::Unknown('?')),
    };

    let status = match status {
        Ok(status) => status.classify(&options.labels),
        Err(e) => {
            warn!(record = %jobid, error = %e, "Failed to decode field");
            invalid_status()
        }
    };

    // Restore and admin jobs have no level; the console sends " " or "".
    let level = match job.level.as_deref() {
        None | Some("") => Ok(JobLevel::None),
        Some(level) => models::code(level, "level").map(JobLevel::from_code),
    };

    JobView {
        name: job.name.clone().or_else(|| job.job.clone()).unwrap_or_default(),
        client: text(&job.client),
        status,
        job_type: or_placeholder(job_type, &jobid, |t| t.label()),
        level: or_placeholder(level, &jobid, |l| l.label()),
        files: or_placeholder(models::unsigned(job.jobfiles.as_ref(), "jobfiles"), &jobid, |n| {
            n.unwrap_or(0).to_string()
        }),
        bytes: or_placeholder(models::unsigned(job.jobbytes.as_ref(), "jobbytes"), &jobid, |n| {
            format_byte_size(n.unwrap_or(0))
        }),
        errors: or_placeholder(models::unsigned(job.joberrors.as_ref(), "joberrors"), &jobid, |n| {
            n.unwrap_or(0).to_string()
        }),
        starttime: text(&job.starttime),
        endtime: text(&job.endtime),
        actions,
        jobid,
    }
}

pub fn render_volume(volume: &VolumeRecord, options: &RenderOptions) -> VolumeView {
    let name = volume.volumename.as_str();
    let status = VolumeStatus::parse(&volume.volstatus);

    let retention = models::unsigned(volume.volretention.as_ref(), "volretention");
    let last_written = parse_last_written(volume.lastwritten.as_deref(), options.utc_offset);

    let expiration = match (&retention, &last_written) {
        (Ok(retention), Ok(last_written)) => Some(compute_expiration(
            &status,
            *last_written,
            retention.unwrap_or(0),
            options.now,
        )),
        _ => None,
    };

    let capacity = models::unsigned(volume.maxvolbytes.as_ref(), "maxvolbytes");
    let used = models::unsigned(volume.volbytes.as_ref(), "volbytes");

    let free = match (&capacity, &used) {
        (Ok(capacity), Ok(used)) => format_free_bytes(*capacity, *used),
        _ => INVALID_PLACEHOLDER.to_string(),
    };

    VolumeView {
        name: name.to_string(),
        pool: text(&volume.pool),
        media_type: text(&volume.mediatype),
        status: status.as_str().to_string(),
        last_written: or_placeholder(last_written, name, |lw| match lw {
            Some(_) => text(&volume.lastwritten),
            None => "-".to_string(),
        }),
        retention: or_placeholder(retention, name, |r| format_duration(r.unwrap_or(0))),
        expires: expiration.map_or_else(|| INVALID_PLACEHOLDER.to_string(), |e| e.to_string()),
        expiration,
        capacity: or_placeholder(capacity, name, |c| format_byte_size(c.unwrap_or(0))),
        used: or_placeholder(used, name, |u| format_byte_size(u.unwrap_or(0))),
        free,
    }
}

/// Order volumes the way the volume list shows them, undecodable rows last.
pub fn sort_by_expiration(volumes: &mut [VolumeView]) {
    volumes.sort_by(|a, b| match (a.expiration, b.expiration) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

pub fn render_file_node(node: &FileNode, options: &RenderOptions) -> FileNodeView {
    let name = node.name.as_str();
    let stat = &node.stat;

    let permissions = match models::signed(stat.mode.as_ref(), "mode")
        .and_then(|mode| mode.map_or(Ok(None), decode_mode))
    {
        Ok(permissions) => permissions,
        Err(e) => {
            warn!(record = %name, error = %e, "Failed to decode field");
            Some(INVALID_PLACEHOLDER.to_string())
        }
    };

    FileNodeView {
        name: name.to_string(),
        node_type: node.node_type,
        permissions,
        user: text(&stat.user),
        group: text(&stat.group),
        uid: or_placeholder(models::unsigned(stat.uid.as_ref(), "uid"), name, |v| {
            v.map(|v| v.to_string()).unwrap_or_default()
        }),
        gid: or_placeholder(models::unsigned(stat.gid.as_ref(), "gid"), name, |v| {
            v.map(|v| v.to_string()).unwrap_or_default()
        }),
        size: or_placeholder(models::unsigned(stat.size.as_ref(), "size"), name, |s| {
            options.file_size_base.format(s.unwrap_or(0))
        }),
        modified: or_placeholder(
            models::signed(node.mtime(), "mtime")
                .and_then(|mtime| format_relative_age(mtime, options.now)),
            name,
            |age| age,
        ),
    }
}

pub fn render_jobs(jobs: &[JobRecord], options: &RenderOptions) -> Vec<JobView> {
    jobs.iter().map(|job| render_job(job, options)).collect()
}

pub fn render_volumes(volumes: &[VolumeRecord], options: &RenderOptions) -> Vec<VolumeView> {
    let mut views: Vec<VolumeView> = volumes
        .iter()
        .map(|volume| render_volume(volume, options))
        .collect();
    sort_by_expiration(&mut views);
    views
}

pub fn render_file_nodes(nodes: &[FileNode], options: &RenderOptions) -> Vec<FileNodeView> {
    nodes
        .iter()
        .map(|node| render_file_node(node, options))
        .collect()
}
