//! Extraction of records from backup console responses.
//!
//! In JSON mode the console wraps every answer in a JSON-RPC style envelope
//! (`{"jsonrpc": "2.0", "id": null, "result": {...}}`). Callers may also hand
//! us the bare `result` object or just the record array.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::core::models::{FileNode, JobRecord, VolumeRecord};
use crate::error::ConsoleError;

#[derive(Debug, Deserialize)]
struct RemoteError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Strip the envelope, returning the `result` payload.
pub fn payload(response: Value) -> Result<Value, ConsoleError> {
    let Value::Object(mut map) = response else {
        return Ok(response);
    };

    if let Some(error) = map.remove("error").filter(|e| !e.is_null()) {
        let error: RemoteError = serde_json::from_value(error)?;
        return Err(ConsoleError::Remote {
            code: error.code,
            message: error.message,
        });
    }

    match map.remove("result") {
        Some(result) => Ok(result),
        None if map.contains_key("jsonrpc") => Err(ConsoleError::MissingMember("result")),
        None => Ok(Value::Object(map)),
    }
}

/// Parse response text and strip the envelope.
pub fn parse_payload(text: &str) -> Result<Value, ConsoleError> {
    payload(serde_json::from_str(text)?)
}

/// Take `member` out of a payload object, or use the payload itself if it
/// is already an array.
fn member(payload: Value, member: &'static str) -> Result<Value, ConsoleError> {
    match payload {
        Value::Array(_) => Ok(payload),
        Value::Object(mut map) => map.remove(member).ok_or(ConsoleError::MissingMember(member)),
        _ => Err(ConsoleError::MissingMember(member)),
    }
}

fn records<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ConsoleError> {
    Ok(serde_json::from_value(value)?)
}

/// Jobs from an `llist jobs` / `list jobs` response.
pub fn jobs(response: Value) -> Result<Vec<JobRecord>, ConsoleError> {
    let jobs: Vec<JobRecord> = records(member(payload(response)?, "jobs")?)?;
    debug!(count = jobs.len(), "Extracted jobs");
    Ok(jobs)
}

/// Volumes from a `list volumes` response.
///
/// Without a pool argument the console groups volumes by pool name; the
/// pool is copied into each record when the record lacks one.
pub fn volumes(response: Value) -> Result<Vec<VolumeRecord>, ConsoleError> {
    let value = member(payload(response)?, "volumes")?;

    let volumes = match value {
        Value::Object(_) => {
            let grouped: BTreeMap<String, Vec<VolumeRecord>> = serde_json::from_value(value)?;
            grouped
                .into_iter()
                .flat_map(|(pool, volumes)| {
                    volumes.into_iter().map(move |mut volume| {
                        if volume.pool.is_none() {
                            volume.pool = Some(pool.clone());
                        }
                        volume
                    })
                })
                .collect()
        }
        other => records(other)?,
    };

    debug!(count = volumes.len(), "Extracted volumes");
    Ok(volumes)
}

/// Directories and files from `.bvfs_lsdirs` / `.bvfs_lsfiles` responses,
/// directories first.
pub fn file_nodes(response: Value) -> Result<Vec<FileNode>, ConsoleError> {
    let payload = payload(response)?;

    let nodes = match payload {
        Value::Array(_) => records(payload)?,
        Value::Object(mut map) => {
            let directories = map.remove("directories");
            let files = map.remove("files");
            if directories.is_none() && files.is_none() {
                return Err(ConsoleError::MissingMember("files"));
            }

            let mut nodes: Vec<FileNode> = match directories {
                Some(directories) => records(directories)?,
                None => Vec::new(),
            };
            if let Some(files) = files {
                nodes.extend(records::<FileNode>(files)?);
            }
            nodes
        }
        _ => return Err(ConsoleError::MissingMember("files")),
    };

    debug!(count = nodes.len(), "Extracted file nodes");
    Ok(nodes)
}
