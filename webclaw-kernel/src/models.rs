use serde::Serialize;

/// One listening TCP endpoint, as returned by `GET /api/services`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct DetectedService {
    pub name: String,
    pub pid: u32,            // 0 = owner unknown
    pub port: u16,
    pub protocol: Protocol,
    pub address: String,     // "host:port" as printed by the scan tool
    pub url: String,
    pub status: ServiceStatus,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
}

/// A service absent from the scan is absent from the result, so there is no "down".
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Up,
}

impl DetectedService {
    /// Addresses printed as `[::1]:631` by `ss`.
    pub fn is_bracketed_ipv6(&self) -> bool {
        self.address.contains('[')
    }
}

#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    pub services: Vec<DetectedService>,
}

#[derive(Debug, Serialize)]
pub struct ServicesErrorResponse {
    pub error: String,
    pub services: Vec<DetectedService>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_serializes_with_lowercase_enums() {
        let svc = DetectedService {
            name: "SSH".into(),
            pid: 812,
            port: 22,
            protocol: Protocol::Tcp,
            address: "0.0.0.0:22".into(),
            url: "http://localhost:22".into(),
            status: ServiceStatus::Up,
        };
        let json = serde_json::to_value(&svc).unwrap();
        assert_eq!(json["protocol"], "tcp");
        assert_eq!(json["status"], "up");
        assert_eq!(json["pid"], 812);
        assert!(!svc.is_bracketed_ipv6());
    }
}
