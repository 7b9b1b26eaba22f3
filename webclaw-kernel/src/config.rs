use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub listen: String,
    pub scan: ScanConf,
    pub naming: NamingConf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScanConf {
    pub commands: Vec<String>,   // ex: "ss -tlnp", tried in order
    pub timeout_ms: u64,
    pub high_port_threshold: u16,
    pub known_high_ports: Vec<u16>,
    pub proc_root: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct NamingConf {
    pub ports: BTreeMap<u16, String>,
    pub hints: Vec<HintConf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HintConf {
    pub needle: String,
    pub label: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3001".into(),
            scan: ScanConf::default(),
            naming: NamingConf::default(),
        }
    }
}

impl Default for ScanConf {
    fn default() -> Self {
        Self {
            commands: vec!["ss -tlnp".into(), "netstat -tlnp".into()],
            timeout_ms: 5_000,
            high_port_threshold: 30_000,
            known_high_ports: vec![40_000],
            proc_root: "/proc".into(),
        }
    }
}

pub async fn load_config() -> KernelConfig {
    let path = std::env::var("WEBCLAW_KERNEL_CONFIG").unwrap_or_else(|_| "kernel.yaml".into());
    load_config_from(&path).await
}

pub async fn load_config_from(path: impl AsRef<Path>) -> KernelConfig {
    let path = path.as_ref();
    if !path.exists() {
        info!("no {} found, using default config", path.display());
        return KernelConfig::default();
    }

    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return KernelConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!("invalid config {}: {e}", path.display());
        KernelConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(dir.path().join("absent.yaml")).await;
        assert_eq!(cfg, KernelConfig::default());
        assert_eq!(cfg.scan.commands, vec!["ss -tlnp", "netstat -tlnp"]);
        assert_eq!(cfg.scan.timeout_ms, 5000);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen: 127.0.0.1:4000\nscan:\n  known_high_ports: [40000, 41000]\nnaming:\n  ports:\n    8080: Dashboard\n  hints:\n    - needle: bun\n      label: Bun App"
        )
        .unwrap();

        let cfg = load_config_from(file.path()).await;
        assert_eq!(cfg.listen, "127.0.0.1:4000");
        assert_eq!(cfg.scan.known_high_ports, vec![40000, 41000]);
        assert_eq!(cfg.scan.high_port_threshold, 30000);
        assert_eq!(cfg.naming.ports.get(&8080).map(String::as_str), Some("Dashboard"));
        assert_eq!(cfg.naming.hints[0].label, "Bun App");
    }

    #[tokio::test]
    async fn test_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scan: [not, a, map").unwrap();
        let cfg = load_config_from(file.path()).await;
        assert_eq!(cfg, KernelConfig::default());
    }
}
