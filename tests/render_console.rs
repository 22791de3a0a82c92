use std::io::Write;

use bkview::console;
use bkview::core::render::{render_file_nodes, render_jobs, render_volumes};
use bkview::core::{Action, NodeType, RenderOptions, StatusCategory};
use bkview::error::{ConsoleError, INVALID_PLACEHOLDER};
use chrono::{TimeZone, Utc};
use tempfile::NamedTempFile;

fn options() -> RenderOptions {
    RenderOptions::at(Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap())
}

fn response_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(body.as_bytes()).expect("write response");
    file
}

fn read_payload(file: &NamedTempFile) -> serde_json::Value {
    let text = std::fs::read_to_string(file.path()).expect("read response");
    console::parse_payload(&text).expect("valid envelope")
}

#[test]
fn test_render_jobs_from_console_file() {
    let file = response_file(
        r#"{"jsonrpc": "2.0", "id": null, "result": {"jobs": [
            {"jobid": "12", "job": "nightly.2024-01-10_23.05.00_03", "name": "nightly",
             "clientname": "web-fd", "level": "I", "type": "B", "jobstatus": "T",
             "jobfiles": "120", "jobbytes": "1500000", "joberrors": "0",
             "starttime": "2024-01-10 23:05:01", "endtime": "2024-01-10 23:09:40"},
            {"jobid": 13, "name": "restore", "client": "db-fd", "level": " ",
             "type": "R", "jobstatus": "R"},
            {"jobid": 14, "name": "broken", "level": "F", "type": "B",
             "jobstatus": "f", "jobbytes": "lots"}
        ]}}"#,
    );

    let jobs = console::jobs(read_payload(&file)).expect("jobs");
    let views = render_jobs(&jobs, &options());

    assert_eq!(views.len(), 3);

    let nightly = &views[0];
    assert_eq!(nightly.jobid, "12");
    assert_eq!(nightly.client, "web-fd");
    assert_eq!(nightly.status.category, StatusCategory::Success);
    assert_eq!(nightly.job_type, "Backup");
    assert_eq!(nightly.level, "Incremental");
    assert_eq!(nightly.files, "120");
    assert_eq!(nightly.bytes, "1.50 MB");
    assert!(nightly.actions.contains(Action::Rerun));
    assert!(nightly.actions.contains(Action::Restore));

    let restore = &views[1];
    assert_eq!(restore.status.category, StatusCategory::Running);
    assert!(restore.actions.contains(Action::Cancel));
    assert!(!restore.actions.contains(Action::Rerun));

    let broken = &views[2];
    assert_eq!(broken.status.category, StatusCategory::Failure);
    assert_eq!(broken.bytes, INVALID_PLACEHOLDER);
    assert!(broken.actions.contains(Action::Rerun));
}

#[test]
fn test_fractional_count_spoils_one_field() {
    let file = response_file(
        r#"{"jsonrpc": "2.0", "id": null, "result": {"jobs": [
            {"jobid": 20, "name": "good", "type": "B", "jobstatus": "T", "jobbytes": 100},
            {"jobid": 21, "name": "odd", "type": "B", "jobstatus": "T", "jobbytes": 1.5,
             "jobfiles": true}
        ]}}"#,
    );

    let jobs = console::jobs(read_payload(&file)).expect("jobs");
    let views = render_jobs(&jobs, &options());

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].bytes, "100.00 B");
    assert_eq!(views[1].bytes, INVALID_PLACEHOLDER);
    assert_eq!(views[1].files, INVALID_PLACEHOLDER);
    assert_eq!(views[1].status.category, StatusCategory::Success);
}

#[test]
fn test_render_volumes_grouped_by_pool() {
    let file = response_file(
        r#"{"jsonrpc": "2.0", "id": null, "result": {"volumes": {
            "Full": [
                {"volumename": "Full-0001", "volstatus": "Full", "mediatype": "File",
                 "lastwritten": "2023-01-01 00:00:00", "volretention": "2592000",
                 "maxvolbytes": "0", "volbytes": "5000000000"},
                {"volumename": "Full-0002", "volstatus": "Append", "mediatype": "File",
                 "lastwritten": "2024-01-10 12:00:00", "volretention": "2592000",
                 "maxvolbytes": "10000000000", "volbytes": "2500000000"}
            ],
            "Inc": [
                {"volumename": "Inc-0007", "volstatus": "Used", "mediatype": "File",
                 "lastwritten": "2024-01-01 00:00:00", "volretention": 2592000,
                 "maxvolbytes": 0, "volbytes": 1000},
                {"volumename": "Inc-0008", "volstatus": "Used",
                 "lastwritten": "0000-00-00 00:00:00", "volretention": 2592000}
            ]
        }}}"#,
    );

    let volumes = console::volumes(read_payload(&file)).expect("volumes");
    let views = render_volumes(&volumes, &options());

    let names: Vec<&str> = views.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Full-0001", "Inc-0007", "Inc-0008", "Full-0002"]);

    assert_eq!(views[0].expires, "expired");
    assert_eq!(views[0].pool, "Full");
    assert_eq!(views[1].expires, "expires in 20 days");
    assert_eq!(views[1].pool, "Inc");
    assert_eq!(views[2].expires, "-");
    assert_eq!(views[2].last_written, "-");
    assert_eq!(views[3].free, "7.50 GB");
}

#[test]
fn test_render_file_tree() {
    let file = response_file(
        r#"{"jsonrpc": "2.0", "id": null, "result": {
            "files": [
                {"name": "passwd", "type": "F",
                 "stat": {"mode": 33188, "uid": 0, "user": "root", "gid": 0,
                          "group": "root", "size": 2500, "mtime": 1704844800}}
            ],
            "directories": [
                {"name": "ssh/", "type": "D",
                 "stat": {"mode": 16877, "uid": 0, "user": "root", "gid": 0,
                          "group": "root", "size": 4096, "mtime": 1704931200}}
            ]
        }}"#,
    );

    let nodes = console::file_nodes(read_payload(&file)).expect("file nodes");
    let views = render_file_nodes(&nodes, &options());

    assert_eq!(views[0].node_type, NodeType::Directory);
    assert_eq!(views[0].permissions.as_deref(), Some("drwxr-xr-x"));

    assert_eq!(views[1].name, "passwd");
    assert_eq!(views[1].permissions.as_deref(), Some("-rw-r--r--"));
    assert_eq!(views[1].size, "2.50 KB");
    assert_eq!(views[1].user, "root");
}

#[test]
fn test_console_error_envelope() {
    let file = response_file(
        r#"{"jsonrpc": "2.0", "id": null, "error": {"code": 1, "message": "Pool not found"}}"#,
    );
    let text = std::fs::read_to_string(file.path()).expect("read response");

    match console::parse_payload(&text) {
        Err(ConsoleError::Remote { code, message }) => {
            assert_eq!(code, 1);
            assert_eq!(message, "Pool not found");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}
