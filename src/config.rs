use anyhow::{anyhow, Result};

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub license_source: String,
    pub license_env: String,
    pub license_path: String,
    pub license_pubkey: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("MEDIX_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let license_source = std::env::var("MEDIX_LICENSE_SOURCE").unwrap_or_else(|_| "auto".to_string());
        let license_env = std::env::var("MEDIX_LICENSE_ENV").unwrap_or_else(|_| "MEDIX_LICENSE".to_string());
        let license_path = std::env::var("MEDIX_LICENSE_PATH").unwrap_or_else(|_| "/run/secrets/medix_license".to_string());
        let license_pubkey = std::env::var("MEDIX_LICENSE_PUBKEY").ok();

        if license_source != "env" && license_source != "file" && license_source != "auto" {
            return Err(anyhow!("MEDIX_LICENSE_SOURCE must be 'env', 'file' or 'auto'"));
        }

        Ok(Self {
            bind_addr,
            license_source,
            license_env,
            license_path,
            license_pubkey,
        })
    }
}
