//! Line parsing for `ss -tlnp` and `netstat -tlnp` output.

use regex::Regex;
use std::sync::LazyLock;

use super::naming::UNKNOWN_PROCESS;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+):(\d+)\s").expect("address pattern"));
// ss: users:(("node",pid=12345,fd=3))
static SS_USERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"users:\(\("([^"]+)",pid=(\d+)"#).expect("ss users pattern"));
// netstat: 12345/node
static NETSTAT_PID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)/(\S+)").expect("netstat pid pattern"));

/// One LISTEN line, before naming and dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenLine {
    pub host: String,
    pub port: u16,
    pub process: String,
    pub pid: u32,
}

/// Lines carrying the LISTEN marker; header and connection lines are dropped.
pub fn listen_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|l| l.contains("LISTEN"))
}

/// `None` when the line has no `host:port` or the port is 0 / out of range.
pub fn parse_listen_line(line: &str) -> Option<ListenLine> {
    let caps = ADDRESS_RE.captures(line)?;
    let host = caps.get(1)?.as_str().to_string();
    let port: u16 = caps.get(2)?.as_str().parse().ok()?;
    if port == 0 {
        return None;
    }

    let (process, pid) = parse_owner(line).unwrap_or_else(|| (UNKNOWN_PROCESS.to_string(), 0));
    Some(ListenLine { host, port, process, pid })
}

fn parse_owner(line: &str) -> Option<(String, u32)> {
    if let Some(caps) = SS_USERS_RE.captures(line) {
        let pid = caps[2].parse().ok()?;
        return Some((caps[1].to_string(), pid));
    }
    let caps = NETSTAT_PID_RE.captures(line)?;
    let pid = caps[1].parse().ok()?;
    Some((caps[2].to_string(), pid))
}

/// Wildcard listen addresses are reachable through localhost.
pub fn display_host(host: &str) -> &str {
    match host {
        "*" | "0.0.0.0" | "::" => "localhost",
        other => other,
    }
}
