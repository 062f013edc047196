//! Basic usage: configure a registry and log through named loggers
//!
//! Run with: cargo run --example basic_usage

use cluster_logger::prelude::*;
use cluster_logger::{debug, info, warn};

fn main() -> Result<()> {
    let registry = LoggerRegistry::new();
    registry.configure(&Config::from_json(
        r#"{
            "appenders": {
                "out": {
                    "type": "console",
                    "layout": { "pattern": "%HH:%mm:%ss %levelc %loggerc %msg %argsc" }
                }
            },
            "loggers": {
                "default": { "level": "debug", "appenders": ["out"] },
                "web": { "level": "warn", "appenders": ["out"] },
                "jobs": { "refer": "default" }
            }
        }"#,
    )?)?;

    let app = registry.get("app");
    info!(app, "application started");
    debug!(app, "configuration loaded", "entries", 3);

    // "web" is configured at warn: the info call is filtered out
    let web = registry.get("web");
    web.info("request handled");
    warn!(web, "slow request", 1.53);

    // "jobs" refers to "default" and uses its threshold and appenders
    let jobs = registry.get("jobs");
    jobs.debug("queue drained");

    registry.flush();
    Ok(())
}
