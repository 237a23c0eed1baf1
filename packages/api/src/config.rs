//! Server configuration
//!
//! Built once at startup from environment variables. Unparseable values
//! fall back to their defaults with a warning.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const PORT_VAR: &str = "UNIONALL_PORT";
pub const BIND_VAR: &str = "UNIONALL_BIND";
pub const DB_PATH_VAR: &str = "UNIONALL_DB_PATH";

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Database file; created with its parent directories when missing
    pub db_path: PathBuf,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = parse_or_default(PORT_VAR, lookup(PORT_VAR), DEFAULT_PORT);
        let bind = parse_or_default(BIND_VAR, lookup(BIND_VAR), IpAddr::V4(Ipv4Addr::LOCALHOST));

        let db_path = match lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        Ok(Self {
            bind,
            port,
            db_path,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// `~/.unionall/database/unionall.db`
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;

    Ok(home_dir
        .join(".unionall")
        .join("database")
        .join("unionall.db"))
}

fn parse_or_default<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}='{}'", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_explicit_values() {
        let cfg = config(&[
            (PORT_VAR, "8080"),
            (BIND_VAR, "0.0.0.0"),
            (DB_PATH_VAR, "/tmp/unionall.db"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/unionall.db"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = config(&[
            (PORT_VAR, "not-a-port"),
            (BIND_VAR, "localhost:1"),
            (DB_PATH_VAR, "/tmp/x.db"),
        ]);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_default_db_path_shape() {
        if let Ok(path) = default_db_path() {
            assert!(path.ends_with(".unionall/database/unionall.db"));
        }
    }
}
