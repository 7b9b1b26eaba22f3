//! Friendly labels for detected services
//!
//! Resolution order:
//! - exact match in the `port -> label` table
//! - first command-line hint whose needle occurs in the lowercased command line
//! - raw process name when the scan tool reported one
//! - `"Port <N>"` otherwise

use std::collections::BTreeMap;

use crate::config::NamingConf;

pub const UNKNOWN_PROCESS: &str = "unknown";

const DEFAULT_PORT_LABELS: &[(u16, &str)] = &[
    (22, "SSH"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP Server"),
    (443, "HTTPS / Tailscale"),
    (631, "CUPS (Printing)"),
    (1883, "Mosquitto MQTT"),
    (3000, "WebClaw (Production)"),
    (3001, "WebClaw (Dev)"),
    (5000, "Flask App"),
    (5432, "PostgreSQL"),
    (5900, "VNC Server"),
    (6379, "Redis"),
    (8000, "Django"),
    (8080, "File Browser"),
    (8123, "Home Assistant"),
    (8443, "HTTPS Alt"),
    (8883, "MQTT TLS"),
    (8899, "Music Player"),
    (9090, "Prometheus"),
    (11984, "Frigate API"),
    (18554, "Frigate RTSP"),
    (18555, "Frigate WebRTC"),
    (18789, "OpenClaw Gateway"),
    (18792, "OpenClaw Internal"),
    (20241, "Frigate HTTP"),
    (27017, "MongoDB"),
];

// Checked in order: "python" must stay after "gunicorn"/"uvicorn", "node" after "vite"/"next".
const DEFAULT_HINTS: &[(&str, &str)] = &[
    ("vite", "Vite Dev Server"),
    ("next", "Next.js"),
    ("nginx", "Nginx"),
    ("gunicorn", "Gunicorn"),
    ("uvicorn", "Uvicorn"),
    ("frigate", "Frigate"),
    ("mosquitto", "Mosquitto MQTT"),
    ("tailscale", "Tailscale"),
    ("cups", "CUPS"),
    ("sshd", "SSH"),
    ("python", "Python App"),
    ("node", "Node.js App"),
    ("docker", "Docker"),
    ("redis", "Redis"),
    ("postgres", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mongo", "MongoDB"),
];

/// Immutable lookup tables handed to the detector at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTables {
    ports: BTreeMap<u16, String>,
    hints: Vec<(String, String)>,
}

impl Default for NamingTables {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORT_LABELS
                .iter()
                .map(|(port, label)| (*port, label.to_string()))
                .collect(),
            hints: DEFAULT_HINTS
                .iter()
                .map(|(needle, label)| (needle.to_string(), label.to_string()))
                .collect(),
        }
    }
}

impl NamingTables {
    /// Tables with nothing in them: every service falls back to its process name or port.
    #[cfg(test)]
    pub fn empty() -> Self {
        Self { ports: BTreeMap::new(), hints: Vec::new() }
    }

    #[cfg(test)]
    pub fn with_port(mut self, port: u16, label: impl Into<String>) -> Self {
        self.ports.insert(port, label.into());
        self
    }

    #[cfg(test)]
    pub fn with_hint(mut self, needle: impl Into<String>, label: impl Into<String>) -> Self {
        self.hints.push((needle.into().to_lowercase(), label.into()));
        self
    }

    /// Built-in tables with the configured overrides applied.
    /// Configured ports replace built-in labels; configured hints are tried before built-in ones.
    pub fn from_config(conf: &NamingConf) -> Self {
        let mut tables = Self::default();
        for (port, label) in &conf.ports {
            tables.ports.insert(*port, label.clone());
        }
        let mut hints: Vec<(String, String)> = conf
            .hints
            .iter()
            .map(|h| (h.needle.to_lowercase(), h.label.clone()))
            .collect();
        hints.append(&mut tables.hints);
        tables.hints = hints;
        tables
    }

    pub fn friendly_name(&self, process: &str, cmdline: &str, port: u16) -> String {
        if let Some(label) = self.ports.get(&port) {
            return label.clone();
        }

        let cmd = cmdline.to_lowercase();
        if let Some((_, label)) = self.hints.iter().find(|(needle, _)| cmd.contains(needle.as_str())) {
            return label.clone();
        }

        if process != UNKNOWN_PROCESS {
            return process.to_string();
        }
        fallback_name(port)
    }
}

/// Generic label for a port nobody could identify.
pub fn fallback_name(port: u16) -> String {
    format!("Port {port}")
}
