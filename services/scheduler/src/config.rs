//! Runtime configuration and data-directory bootstrap

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// (`0.0.0.0:8000`, `./data`).
    pub fn from_env() -> Self {
        let listen_addr = std::env::var("SCHEDULER_ADDR")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));
        let data_dir = std::env::var("SCHEDULER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Self {
            listen_addr,
            data_dir,
        }
    }

    /// Create the data directory layout if absent.
    pub fn ensure_layout(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.data_dir.join("logs"))?;
        Ok(())
    }

    pub fn providers_file(&self) -> PathBuf {
        self.data_dir.join("medicos.json")
    }

    pub fn appointments_file(&self) -> PathBuf {
        self.data_dir.join("consultas.json")
    }

    pub fn audit_file(&self) -> PathBuf {
        self.data_dir.join("logs").join("system_logs.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_layout_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            data_dir: tmp.path().join("data"),
        };
        config.ensure_layout().unwrap();
        assert!(config.data_dir.is_dir());
        assert!(config.data_dir.join("logs").is_dir());
    }
}
