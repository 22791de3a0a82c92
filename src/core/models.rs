//! Records as emitted by the backup console's JSON API.
//!
//! The console is loose about types: integers may arrive as JSON numbers or
//! as numeric strings, and optional columns may be missing, null or empty.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, Result};

/// An integer column that may be encoded as a number or as text.
///
/// Anything else (floats, booleans, integers wider than `i64`) is kept as
/// [`Numeric::Other`] so one bad cell fails only its own field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Text(String),
    Other(Value),
}

impl Numeric {
    /// Parse the value. Empty text counts as absent.
    pub fn parse(&self, field: &'static str) -> Result<Option<i64>> {
        match self {
            Self::Int(value) => Ok(Some(*value)),
            Self::Text(text) if text.trim().is_empty() => Ok(None),
            Self::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| DecodeError::NotNumeric {
                    field,
                    value: text.clone(),
                }),
            Self::Other(value) => Err(DecodeError::NotNumeric {
                field,
                value: value.to_string(),
            }),
        }
    }

    /// Parse a value that must not be negative (sizes, counts, durations).
    pub fn parse_unsigned(&self, field: &'static str) -> Result<Option<u64>> {
        match self.parse(field)? {
            Some(value) => u64::try_from(value)
                .map(Some)
                .map_err(|_| DecodeError::NegativeValue { field, value }),
            None => Ok(None),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(text) => write!(f, "{}", text),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Parse an optional unsigned column.
pub fn unsigned(value: Option<&Numeric>, field: &'static str) -> Result<Option<u64>> {
    value.map_or(Ok(None), |v| v.parse_unsigned(field))
}

/// Parse an optional signed column.
pub fn signed(value: Option<&Numeric>, field: &'static str) -> Result<Option<i64>> {
    value.map_or(Ok(None), |v| v.parse(field))
}

/// Extract a single-character code column.
pub fn code(text: &str, field: &'static str) -> Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(DecodeError::InvalidCode {
            field,
            value: text.to_string(),
        }),
    }
}

/// One row of `llist jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub jobid: Numeric,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "clientname")]
    pub client: Option<String>,
    pub jobstatus: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub starttime: Option<String>,
    #[serde(default)]
    pub endtime: Option<String>,
    #[serde(default)]
    pub jobfiles: Option<Numeric>,
    #[serde(default)]
    pub jobbytes: Option<Numeric>,
    #[serde(default)]
    pub joberrors: Option<Numeric>,
}

/// One row of `list volumes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    #[serde(default)]
    pub volumename: String,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub mediatype: Option<String>,
    pub volstatus: String,
    #[serde(default)]
    pub lastwritten: Option<String>,
    #[serde(default)]
    pub volretention: Option<Numeric>,
    #[serde(default)]
    pub maxvolbytes: Option<Numeric>,
    #[serde(default)]
    pub volbytes: Option<Numeric>,
}

/// The decoded `stat` block attached to each file-tree node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    #[serde(default)]
    pub mode: Option<Numeric>,
    #[serde(default)]
    pub uid: Option<Numeric>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub gid: Option<Numeric>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub size: Option<Numeric>,
    #[serde(default)]
    pub mtime: Option<Numeric>,
}

/// Directory or file in the browse/restore tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "D")]
    Directory,
    #[serde(rename = "F")]
    File,
}

/// One entry of `.bvfs_lsdirs` / `.bvfs_lsfiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub stat: FileStat,
    #[serde(default)]
    pub mtime: Option<Numeric>,
}

impl FileNode {
    /// Modification time, wherever the console put it.
    pub fn mtime(&self) -> Option<&Numeric> {
        self.stat.mtime.as_ref().or(self.mtime.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_numbers_and_text() {
        let int: Numeric = serde_json::from_str("42").unwrap();
        let text: Numeric = serde_json::from_str("\"42\"").unwrap();
        let empty: Numeric = serde_json::from_str("\"\"").unwrap();

        assert_eq!(int.parse("x"), Ok(Some(42)));
        assert_eq!(text.parse("x"), Ok(Some(42)));
        assert_eq!(empty.parse("x"), Ok(None));
    }

    #[test]
    fn numeric_rejects_garbage() {
        let bad = Numeric::Text("12kb".to_string());
        assert_eq!(
            bad.parse("jobbytes"),
            Err(DecodeError::NotNumeric {
                field: "jobbytes",
                value: "12kb".to_string()
            })
        );
        assert_eq!(
            Numeric::Int(-3).parse_unsigned("size"),
            Err(DecodeError::NegativeValue {
                field: "size",
                value: -3
            })
        );
    }

    #[test]
    fn non_integer_json_is_kept_for_later() {
        let float: Numeric = serde_json::from_str("1.5").unwrap();
        let flag: Numeric = serde_json::from_str("true").unwrap();
        let wide: Numeric = serde_json::from_str("18446744073709551615").unwrap();

        assert_eq!(
            float.parse("jobbytes"),
            Err(DecodeError::NotNumeric {
                field: "jobbytes",
                value: "1.5".to_string()
            })
        );
        assert!(flag.parse("jobfiles").is_err());
        assert!(wide.parse_unsigned("volbytes").is_err());
    }

    #[test]
    fn test_code() {
        assert_eq!(code("T", "jobstatus"), Ok('T'));
        assert_eq!(code(" ", "level"), Ok(' '));
        assert!(code("", "jobstatus").is_err());
        assert!(code("TT", "jobstatus").is_err());
    }

    #[test]
    fn test_parse_job_record() {
        let json = r#"{
            "jobid": "17",
            "job": "backup-client1.2024-05-01_21.00.00_05",
            "name": "backup-client1",
            "clientname": "client1-fd",
            "jobstatus": "T",
            "type": "B",
            "level": "I",
            "jobfiles": "120",
            "jobbytes": 1500000,
            "joberrors": "0"
        }"#;
        let job: JobRecord = serde_json::from_str(json).unwrap();

        assert_eq!(job.jobid, Numeric::Text("17".to_string()));
        assert_eq!(job.client.as_deref(), Some("client1-fd"));
        assert_eq!(job.job_type, "B");
        assert_eq!(unsigned(job.jobbytes.as_ref(), "jobbytes"), Ok(Some(1_500_000)));
        assert!(job.starttime.is_none());
    }

    #[test]
    fn test_parse_file_node() {
        let json = r#"{
            "type": "F",
            "name": "passwd",
            "stat": {"mode": 33188, "uid": 0, "user": "root", "gid": 0, "group": "root", "size": 2048, "mtime": 1714550400}
        }"#;
        let node: FileNode = serde_json::from_str(json).unwrap();

        assert_eq!(node.node_type, NodeType::File);
        assert_eq!(node.mtime(), Some(&Numeric::Int(1_714_550_400)));
        assert_eq!(signed(node.stat.mode.as_ref(), "mode"), Ok(Some(0o100644)));
    }

    #[test]
    fn file_node_mtime_outside_stat() {
        let json = r#"{"type": "D", "name": "etc/", "stat": {"mode": 16877}, "mtime": 1700000000}"#;
        let node: FileNode = serde_json::from_str(json).unwrap();

        assert_eq!(node.node_type, NodeType::Directory);
        assert_eq!(node.mtime(), Some(&Numeric::Int(1_700_000_000)));
    }
}
