//! Worker-to-master forwarding over an in-process channel
//!
//! A worker-role registry never opens shared files: its `rotate_file`
//! declaration renders each line and ships it to the master, which funnels
//! it into the same write queue as locally-originated lines.
//!
//! Run with: cargo run --example cluster_forwarding

use cluster_logger::forward::channel;
use cluster_logger::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    let (transport, rx) = channel();

    let master = LoggerRegistry::new();
    master.configure(&Config::from_json(
        r#"{
            "appenders": {
                "shared": {
                    "type": "rotate_file",
                    "directory": "logs",
                    "file_name": "cluster.log",
                    "file_pattern": "cluster-%yyyy%MM%dd.log",
                    "layout": { "pattern": "%utctime %level %msg" }
                }
            },
            "loggers": { "default": { "level": "debug", "appenders": ["shared"] } }
        }"#,
    )?)?;
    let listener = master.listen(rx);

    let worker = LoggerRegistry::worker(Arc::new(transport));
    worker.configure(&Config::from_json(
        r#"{
            "appenders": {
                "shared": {
                    "type": "rotate_file",
                    "file_name": "cluster.log",
                    "layout": { "pattern": "%utctime %level %msg" }
                }
            },
            "loggers": { "default": { "level": "debug", "appenders": ["shared"] } }
        }"#,
    )?)?;

    master.get("default").info("master is up");
    worker.get("default").info("hello from a worker");

    // dropping the worker registry releases its transport; the listener
    // drains what is in flight and returns
    drop(worker);
    listener.join();

    master.flush();
    println!("check logs/cluster.log for both lines");
    Ok(())
}
