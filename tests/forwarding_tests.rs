//! Worker-to-master forwarding tests
//!
//! A worker-role registry never opens shared files: these tests wire a
//! worker and a master registry over an in-process channel and verify
//! that forwarded records reach the master's appenders, that field-map
//! payloads render through the master's own pattern, and that unknown
//! destinations are dropped silently.

use cluster_logger::config::Config;
use cluster_logger::core::registry::LoggerRegistry;
use cluster_logger::forward::{channel, ForwardMessage};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn master_config(dir: &Path, pattern: &str) -> Config {
    Config::from_json(&format!(
        r#"{{
            "appenders": {{
                "shared": {{
                    "type": "rotate_file",
                    "directory": "{dir}",
                    "file_name": "shared.log",
                    "layout": {{ "pattern": "{pattern}" }}
                }}
            }},
            "loggers": {{ "default": {{ "level": "debug", "appenders": ["shared"] }} }}
        }}"#,
        dir = dir.display(),
    ))
    .expect("valid master config")
}

fn wait_for_content(registry: &LoggerRegistry, path: &Path, expected: &str) -> String {
    for _ in 0..200 {
        registry.flush();
        let content = fs::read_to_string(path).unwrap_or_default();
        if content == expected {
            return content;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    fs::read_to_string(path).unwrap_or_default()
}

#[test]
fn test_worker_file_appender_forwards_rendered_lines() {
    let dir = TempDir::new().expect("create temp dir");
    let (transport, rx) = channel();

    let master = LoggerRegistry::new();
    master
        .configure(&master_config(dir.path(), "%msg"))
        .unwrap();
    let _listener = master.listen(rx);

    let worker = LoggerRegistry::worker(Arc::new(transport));
    worker
        .configure(
            &Config::from_json(
                r#"{
                    "appenders": {
                        "shared": {
                            "type": "rotate_file",
                            "file_name": "shared.log",
                            "layout": { "pattern": "%level %msg" }
                        }
                    },
                    "loggers": { "default": { "level": "debug", "appenders": ["shared"] } }
                }"#,
            )
            .unwrap(),
        )
        .unwrap();

    // the worker renders with its own layout and ships the line; no
    // file named shared.log may appear in the worker's working directory
    worker.get("default").info("from worker");

    let content = wait_for_content(
        &master,
        &dir.path().join("shared.log"),
        "info from worker\n",
    );
    assert_eq!(content, "info from worker\n");
    assert!(!Path::new("shared.log").exists());
}

#[test]
fn test_worker_object_mode_renders_through_master_pattern() {
    let dir = TempDir::new().expect("create temp dir");
    let (transport, rx) = channel();

    let pattern = "%level %logger: %msg [%args]";
    let master = LoggerRegistry::new();
    master
        .configure(&master_config(dir.path(), pattern))
        .unwrap();
    let _listener = master.listen(rx);

    let worker = LoggerRegistry::worker(Arc::new(transport));
    worker
        .configure(
            &Config::from_json(&format!(
                r#"{{
                    "appenders": {{
                        "shared": {{ "type": "worker", "layout": {{ "pattern": "{pattern}" }} }}
                    }},
                    "loggers": {{ "jobs": {{ "level": "debug", "appenders": ["shared"] }} }}
                }}"#
            ))
            .unwrap(),
        )
        .unwrap();

    worker
        .get("jobs")
        .warn_with("done", vec![7.into(), "ok".into()]);

    let expected = "warn jobs: done [7 ok]\n";
    let content = wait_for_content(&master, &dir.path().join("shared.log"), expected);
    assert_eq!(content, expected);
}

#[test]
fn test_forwarded_and_local_lines_share_one_file() {
    let dir = TempDir::new().expect("create temp dir");
    let (transport, rx) = channel();

    let master = LoggerRegistry::new();
    master
        .configure(&master_config(dir.path(), "%msg"))
        .unwrap();
    let _listener = master.listen(rx);

    let worker = LoggerRegistry::worker(Arc::new(transport));
    worker
        .configure(
            &Config::from_json(
                r#"{
                    "appenders": {
                        "shared": {
                            "type": "file",
                            "file_name": "shared.log",
                            "layout": { "pattern": "%msg" }
                        }
                    },
                    "loggers": { "default": { "level": "debug", "appenders": ["shared"] } }
                }"#,
            )
            .unwrap(),
        )
        .unwrap();

    worker.get("default").info("remote");
    let expected_remote = "remote\n";
    wait_for_content(&master, &dir.path().join("shared.log"), expected_remote);

    master.get("default").info("local");
    let expected = "remote\nlocal\n";
    let content = wait_for_content(&master, &dir.path().join("shared.log"), expected);
    assert_eq!(content, expected);
}

#[test]
fn test_unknown_forwarded_appender_dropped_silently() {
    let dir = TempDir::new().expect("create temp dir");

    let master = LoggerRegistry::new();
    master
        .configure(&master_config(dir.path(), "%msg"))
        .unwrap();

    master.dispatch_forwarded(ForwardMessage::line("ghost", "nowhere"));
    master.get("default").info("still alive");
    master.flush();

    let content = fs::read_to_string(dir.path().join("shared.log")).unwrap();
    assert_eq!(content, "still alive\n");
}

#[test]
fn test_listener_ends_when_workers_disconnect() {
    let dir = TempDir::new().expect("create temp dir");
    let (transport, rx) = channel();

    let master = LoggerRegistry::new();
    master
        .configure(&master_config(dir.path(), "%msg"))
        .unwrap();
    let listener = master.listen(rx);

    let transport = Arc::new(transport);
    transport
        .send(&ForwardMessage::line("shared", "last words"))
        .unwrap();
    drop(transport);

    // with every transport gone the listener drains and returns
    listener.join();
    master.flush();

    let content = fs::read_to_string(dir.path().join("shared.log")).unwrap();
    assert_eq!(content, "last words\n");
}
