/**
 * SERVICE DETECTOR - local listening services for the dashboard
 *
 * ROLE:
 * Builds the list shown on the dashboard's services screen from whatever
 * is listening on TCP on this machine.
 *
 * HOW IT WORKS:
 * - SocketSource gives the raw tool output (`ss`, then `netstat`)
 * - every LISTEN line becomes a DetectedService (malformed lines are skipped)
 * - NamingTables turn ports / command lines into friendly labels
 * - one entry per port, unidentified high ports dropped, sorted by port
 *
 * FAILURES:
 * A scan never errors out to the caller: no tool means an empty list.
 */

pub mod naming;
pub mod parse;
pub mod source;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::ScanConf;
use crate::models::{DetectedService, Protocol, ServiceStatus};
use naming::{fallback_name, NamingTables};
use parse::{display_host, listen_lines, parse_listen_line};
use source::SocketSource;

/// Which high ports survive the ephemeral-port filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortFilter {
    pub high_port_threshold: u16,
    pub known_high_ports: BTreeSet<u16>,
}

impl Default for PortFilter {
    fn default() -> Self {
        Self::from_config(&ScanConf::default())
    }
}

impl PortFilter {
    pub fn from_config(conf: &ScanConf) -> Self {
        Self {
            high_port_threshold: conf.high_port_threshold,
            known_high_ports: conf.known_high_ports.iter().copied().collect(),
        }
    }

    /// Anything below the threshold, allow-listed, or carrying a real name.
    pub fn keeps(&self, svc: &DetectedService) -> bool {
        svc.port < self.high_port_threshold
            || self.known_high_ports.contains(&svc.port)
            || svc.name != fallback_name(svc.port)
    }
}

pub struct ServiceDetector<S> {
    source: S,
    naming: NamingTables,
    filter: PortFilter,
}

impl<S: SocketSource> ServiceDetector<S> {
    pub fn new(source: S, naming: NamingTables, filter: PortFilter) -> Self {
        Self { source, naming, filter }
    }

    /// Scan, name, dedup, filter and sort. Never fails.
    pub async fn detect_listening_ports(&self) -> Vec<DetectedService> {
        let output = match self.source.list_sockets().await {
            Ok(output) => output,
            Err(e) => {
                warn!("service scan unavailable: {}", e);
                return Vec::new();
            }
        };
        debug!("scan output from {} ({} bytes)", output.tool, output.text.len());

        let mut services = Vec::new();
        for line in listen_lines(&output.text) {
            if let Some(svc) = self.to_service(line).await {
                services.push(svc);
            }
        }
        dedup_by_port(services)
            .into_values()
            .filter(|svc| self.filter.keeps(svc))
            .collect()
    }

    async fn to_service(&self, line: &str) -> Option<DetectedService> {
        let Some(parsed) = parse_listen_line(line) else {
            debug!("skipping unparseable line: {}", line.trim());
            return None;
        };

        let cmdline = match parsed.pid {
            0 => None,
            pid => self.source.command_line(pid).await,
        }
        .unwrap_or_else(|| parsed.process.clone());

        let name = self.naming.friendly_name(&parsed.process, &cmdline, parsed.port);
        let url = format!("http://{}:{}", display_host(&parsed.host), parsed.port);

        Some(DetectedService {
            name,
            pid: parsed.pid,
            port: parsed.port,
            protocol: Protocol::Tcp,
            address: format!("{}:{}", parsed.host, parsed.port),
            url,
            status: ServiceStatus::Up,
        })
    }
}

/// One entry per port, keyed in ascending port order.
/// A known pid beats an unknown one; otherwise IPv4-style beats bracketed IPv6.
pub fn dedup_by_port(
    services: impl IntoIterator<Item = DetectedService>,
) -> BTreeMap<u16, DetectedService> {
    let mut by_port: BTreeMap<u16, DetectedService> = BTreeMap::new();
    for svc in services {
        let Some(existing) = by_port.get(&svc.port) else {
            by_port.insert(svc.port, svc);
            continue;
        };

        let replace = if svc.pid > 0 && existing.pid == 0 {
            true
        } else {
            existing.is_bracketed_ipv6() && !svc.is_bracketed_ipv6()
        };
        if replace {
            by_port.insert(svc.port, svc);
        }
    }
    by_port
}

#[cfg(test)]
mod tests {
    use super::*;
    use source::{ScanError, ScanOutput};
    use std::collections::HashMap;
    use webclaw_devkit::fixtures;

    /// Canned tool output and command lines.
    struct FixtureSource {
        text: Option<String>,
        cmdlines: HashMap<u32, String>,
    }

    impl FixtureSource {
        fn new(text: &str) -> Self {
            Self { text: Some(text.to_string()), cmdlines: HashMap::new() }
        }

        fn failing() -> Self {
            Self { text: None, cmdlines: HashMap::new() }
        }

        fn with_cmdline(mut self, pid: u32, cmdline: &str) -> Self {
            self.cmdlines.insert(pid, cmdline.to_string());
            self
        }
    }

    impl SocketSource for FixtureSource {
        async fn list_sockets(&self) -> Result<ScanOutput, ScanError> {
            match &self.text {
                Some(text) => Ok(ScanOutput { tool: "fixture".into(), text: text.clone() }),
                None => Err(ScanError::NoTool),
            }
        }

        async fn command_line(&self, pid: u32) -> Option<String> {
            self.cmdlines.get(&pid).cloned()
        }
    }

    fn detector(source: FixtureSource) -> ServiceDetector<FixtureSource> {
        ServiceDetector::new(source, NamingTables::default(), PortFilter::default())
    }

    fn svc(port: u16, pid: u32, address: &str) -> DetectedService {
        DetectedService {
            name: format!("Port {port}"),
            pid,
            port,
            protocol: Protocol::Tcp,
            address: address.into(),
            url: format!("http://localhost:{port}"),
            status: ServiceStatus::Up,
        }
    }

    #[tokio::test]
    async fn test_single_ss_line() {
        let line = r#"tcp LISTEN 0 128 *:8080 users:(("node",pid=111,fd=3))"#;
        let services = detector(FixtureSource::new(line)).detect_listening_ports().await;

        assert_eq!(services.len(), 1);
        let svc = &services[0];
        assert_eq!(svc.port, 8080);
        assert_eq!(svc.pid, 111);
        assert!(svc.address.contains("8080"));
        assert_eq!(svc.url, "http://localhost:8080");
        assert_eq!(svc.status, ServiceStatus::Up);
    }

    #[tokio::test]
    async fn test_no_tool_gives_empty_list() {
        let services = detector(FixtureSource::failing()).detect_listening_ports().await;
        assert!(services.is_empty());
    }

    #[tokio::test]
    async fn test_ss_fixture_end_to_end() {
        let source = FixtureSource::new(fixtures::SS_OUTPUT)
            .with_cmdline(2201, "node /home/op/webclaw/node_modules/.bin/vite --port 5173")
            .with_cmdline(3100, "/usr/bin/python3 -m http.server 8765");
        let services = detector(source).detect_listening_ports().await;

        let ports: Vec<u16> = services.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![22, 631, 5173, 8765, 18789, 40000]);

        let by_port: HashMap<u16, &DetectedService> = services.iter().map(|s| (s.port, s)).collect();
        assert_eq!(by_port[&22].name, "SSH");
        assert_eq!(by_port[&22].address, "0.0.0.0:22");
        assert_eq!(by_port[&631].address, "127.0.0.1:631");
        assert_eq!(by_port[&5173].name, "Vite Dev Server");
        assert_eq!(by_port[&5173].url, "http://localhost:5173");
        assert_eq!(by_port[&8765].name, "Python App");
        assert_eq!(by_port[&18789].name, "OpenClaw Gateway");
        assert_eq!(by_port[&40000].name, "Port 40000");
    }

    #[tokio::test]
    async fn test_netstat_fixture_end_to_end() {
        let services = detector(FixtureSource::new(fixtures::NETSTAT_OUTPUT)).detect_listening_ports().await;

        let ports: Vec<u16> = services.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![22, 3000, 5432, 6379]);
        let postgres = services.iter().find(|s| s.port == 5432).unwrap();
        assert_eq!(postgres.pid, 0);
        assert_eq!(postgres.name, "PostgreSQL");
        // cmdline unreadable: falls back to the short name reported by netstat
        let webclaw = services.iter().find(|s| s.port == 3000).unwrap();
        assert_eq!((webclaw.pid, webclaw.name.as_str()), (1500, "WebClaw (Production)"));
    }

    #[test]
    fn test_dedup_prefers_known_pid() {
        let kept = dedup_by_port([svc(80, 0, "0.0.0.0:80"), svc(80, 42, "[::]:80")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[&80].pid, 42);
    }

    #[test]
    fn test_dedup_prefers_ipv4() {
        let kept = dedup_by_port([svc(22, 7, "0.0.0.0:22"), svc(22, 7, "[::]:22")]);
        assert_eq!(kept[&22].address, "0.0.0.0:22");

        let kept = dedup_by_port([svc(22, 7, "[::]:22"), svc(22, 7, "0.0.0.0:22")]);
        assert_eq!(kept[&22].address, "0.0.0.0:22");
    }

    #[test]
    fn test_dedup_keeps_first_on_tie() {
        let kept = dedup_by_port([svc(9000, 1, "127.0.0.1:9000"), svc(9000, 2, "0.0.0.0:9000")]);
        assert_eq!(kept[&9000].pid, 1);
    }

    #[test]
    fn test_high_port_filter() {
        let filter = PortFilter::default();
        assert!(filter.keeps(&svc(29999, 0, "*:29999")));
        assert!(!filter.keeps(&svc(30000, 0, "*:30000")));
        assert!(filter.keeps(&svc(40000, 0, "*:40000")));

        let mut named = svc(45000, 10, "*:45000");
        named.name = "node".into();
        assert!(filter.keeps(&named));
    }

    #[tokio::test]
    async fn test_ports_are_unique_and_sorted() {
        let text = [
            r#"LISTEN 0 511 [::]:3000 [::]:* users:(("node",pid=9,fd=20))"#,
            r#"LISTEN 0 511 0.0.0.0:3000 0.0.0.0:* users:(("node",pid=9,fd=19))"#,
            "LISTEN 0 511 127.0.0.1:25 0.0.0.0:*",
            "LISTEN 0 511 [::1]:25 [::]:*",
            "LISTEN 0 128 127.0.0.1:45123 0.0.0.0:*",
        ]
        .join("\n");
        let services = detector(FixtureSource::new(&text)).detect_listening_ports().await;

        let ports: Vec<u16> = services.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![25, 3000]);
        assert_eq!(services[1].address, "0.0.0.0:3000");
    }
}
