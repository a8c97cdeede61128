use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use ed25519_dalek::{Signature, VerifyingKey};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fs;

use super::resolver::LicenseDetails;
use crate::config::AppConfig;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub status: String,
    pub details: Option<LicenseDetails>,
}

impl ValidationOutcome {
    pub fn invalid(status: &str) -> Self {
        ValidationOutcome {
            valid: false,
            status: status.to_string(),
            details: None,
        }
    }
}

pub trait LicenseValidator: Send + Sync {
    fn validate(&self) -> BoxFuture<'_, Result<ValidationOutcome>>;
}

// Reads the license from an env var, then a secrets file. Accepts either a
// plain JSON validation payload or a signed `payload_b64.sig_b64` blob.
pub struct EnvLicenseValidator {
    source: LicenseSource,
    env_var: String,
    file_path: String,
    verifying_key: Option<VerifyingKey>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LicenseSource {
    Env,
    File,
    Auto,
}

impl EnvLicenseValidator {
    pub fn new(
        source: LicenseSource,
        env_var: impl Into<String>,
        file_path: impl Into<String>,
        verifying_key: Option<VerifyingKey>,
    ) -> Self {
        Self {
            source,
            env_var: env_var.into(),
            file_path: file_path.into(),
            verifying_key,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let source = match cfg.license_source.as_str() {
            "env" => LicenseSource::Env,
            "file" => LicenseSource::File,
            "auto" => LicenseSource::Auto,
            other => return Err(anyhow!("unsupported license source '{other}'")),
        };
        let verifying_key = match cfg.license_pubkey.as_deref() {
            Some(b64) => Some(parse_verifying_key(b64)?),
            None => None,
        };
        Ok(Self::new(
            source,
            cfg.license_env.clone(),
            cfg.license_path.clone(),
            verifying_key,
        ))
    }

    fn load(&self) -> ValidationOutcome {
        if self.source != LicenseSource::File {
            if let Ok(raw) = std::env::var(&self.env_var) {
                return self.parse(raw.trim());
            }
        }
        if self.source != LicenseSource::Env {
            if let Ok(raw) = fs::read_to_string(&self.file_path) {
                return self.parse(raw.trim());
            }
        }
        ValidationOutcome::invalid("missing")
    }

    fn parse(&self, raw: &str) -> ValidationOutcome {
        if raw.trim_start().starts_with('{') {
            return match serde_json::from_str::<ValidationOutcome>(raw) {
                Ok(outcome) => outcome,
                Err(_) => ValidationOutcome::invalid("malformed"),
            };
        }
        if raw.contains('.') {
            return self.verify_signed(raw);
        }
        ValidationOutcome::invalid("malformed")
    }

    fn verify_signed(&self, raw: &str) -> ValidationOutcome {
        let Some(vk) = self.verifying_key.as_ref() else {
            // No key configured; a signed blob we cannot check grants nothing.
            return ValidationOutcome::invalid("unverifiable");
        };
        let Some((payload_b64, sig_b64)) = raw.split_once('.') else {
            return ValidationOutcome::invalid("malformed");
        };
        let Ok(payload) = B64.decode(payload_b64) else {
            return ValidationOutcome::invalid("malformed");
        };
        let Ok(sig_bytes) = B64.decode(sig_b64) else {
            return ValidationOutcome::invalid("malformed");
        };
        let Ok(sig_arr) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
            return ValidationOutcome::invalid("malformed");
        };
        let sig = Signature::from_bytes(&sig_arr);
        if vk.verify_strict(&payload, &sig).is_err() {
            return ValidationOutcome::invalid("tampered");
        }
        match serde_json::from_slice::<LicenseDetails>(&payload) {
            Ok(details) => ValidationOutcome {
                valid: true,
                status: "signed".to_string(),
                details: Some(details),
            },
            Err(_) => ValidationOutcome::invalid("malformed"),
        }
    }
}

impl LicenseValidator for EnvLicenseValidator {
    fn validate(&self) -> BoxFuture<'_, Result<ValidationOutcome>> {
        Box::pin(async move { Ok(self.load()) })
    }
}

fn parse_verifying_key(b64: &str) -> Result<VerifyingKey> {
    let bytes = B64
        .decode(b64.trim())
        .context("license pubkey is not valid base64")?;
    let arr: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("license pubkey must be 32 bytes"))?;
    VerifyingKey::from_bytes(&arr).context("license pubkey is not a valid ed25519 key")
}
