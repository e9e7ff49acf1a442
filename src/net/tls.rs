//! TLS configuration and throwaway certificate bootstrap.
//!
//! In https mode the proxy never reads a certificate provisioned by someone
//! else. A fresh RSA key and a self-signed `localhost` certificate are minted
//! on every startup, written next to each other as PEM, and then loaded into
//! rustls through axum-server.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum_server::tls_rustls::RustlsConfig;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, Ia5String, IsCa, KeyPair,
    KeyUsagePurpose, RsaKeySize, SanType, SerialNumber,
};
use thiserror::Error;
use time::OffsetDateTime;

/// Failure of one certificate bootstrap stage.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("generating private key: {0}")]
    KeyGeneration(#[source] rcgen::Error),

    #[error("encoding certificate parameters: {0}")]
    Encoding(#[source] rcgen::Error),

    #[error("creating certificate: {0}")]
    Certificate(#[source] rcgen::Error),

    #[error("writing private key to {}: {source}", path.display())]
    WriteKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing certificate to {}: {source}", path.display())]
    WriteCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// RSA modulus size of the generated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrength {
    Rsa2048,
    Rsa3072,
    Rsa4096,
}

impl KeyStrength {
    fn rsa_key_size(self) -> RsaKeySize {
        match self {
            KeyStrength::Rsa2048 => RsaKeySize::_2048,
            KeyStrength::Rsa3072 => RsaKeySize::_3072,
            KeyStrength::Rsa4096 => RsaKeySize::_4096,
        }
    }
}

/// Shape of the generated certificate.
#[derive(Debug, Clone)]
pub struct SelfSignedSpec {
    pub common_name: String,
    pub dns_names: Vec<String>,
    pub validity: time::Duration,
    pub key_strength: KeyStrength,
}

impl Default for SelfSignedSpec {
    fn default() -> Self {
        Self {
            common_name: "localhost".to_string(),
            dns_names: vec!["localhost".to_string()],
            validity: time::Duration::days(1),
            key_strength: KeyStrength::Rsa2048,
        }
    }
}

/// Where the bootstrap writes its two PEM files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub key: PathBuf,
    pub cert: PathBuf,
}

/// Generate a key and self-signed certificate for `localhost` and write both.
pub fn bootstrap_self_signed(paths: &CertPaths) -> Result<(), BootstrapError> {
    bootstrap_with(paths, &SelfSignedSpec::default())
}

/// Generate a key and self-signed certificate described by `spec`.
///
/// The key is written before the certificate is created, so a failure in a
/// later stage can leave a fresh key file behind but never a certificate that
/// does not match it.
pub fn bootstrap_with(paths: &CertPaths, spec: &SelfSignedSpec) -> Result<(), BootstrapError> {
    let key_pair =
        KeyPair::generate_rsa_for(&rcgen::PKCS_RSA_SHA256, spec.key_strength.rsa_key_size())
            .map_err(BootstrapError::KeyGeneration)?;

    write_owner_only(&paths.key, key_pair.serialize_pem().as_bytes()).map_err(|source| {
        BootstrapError::WriteKey {
            path: paths.key.clone(),
            source,
        }
    })?;

    let params = certificate_params(spec, OffsetDateTime::now_utc(), SystemTime::now())?;
    let cert = params
        .self_signed(&key_pair)
        .map_err(BootstrapError::Certificate)?;

    write_owner_only(&paths.cert, cert.pem().as_bytes()).map_err(|source| {
        BootstrapError::WriteCertificate {
            path: paths.cert.clone(),
            source,
        }
    })?;

    tracing::info!(
        cert = %paths.cert.display(),
        key = %paths.key.display(),
        common_name = %spec.common_name,
        "Self-signed certificate generated"
    );
    Ok(())
}

fn certificate_params(
    spec: &SelfSignedSpec,
    now: OffsetDateTime,
    clock: SystemTime,
) -> Result<CertificateParams, BootstrapError> {
    let mut params = CertificateParams::default();

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(DnType::CommonName, spec.common_name.clone());
    params.distinguished_name = distinguished_name;

    for name in &spec.dns_names {
        let name: Ia5String = name.clone().try_into().map_err(BootstrapError::Encoding)?;
        params.subject_alt_names.push(SanType::DnsName(name));
    }

    // X.509 times carry whole seconds only.
    let not_before = now.replace_nanosecond(0).unwrap_or(now);
    params.not_before = not_before;
    params.not_after = not_before + spec.validity;

    params.serial_number = Some(time_serial(clock));
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

    Ok(params)
}

fn time_serial(clock: SystemTime) -> SerialNumber {
    let nanos = clock
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    SerialNumber::from_slice(&nanos.to_be_bytes())
}

#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies to newly created files.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(
    cert_path: &Path,
    key_path: &Path,
) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn params_describe_one_day_server_cert() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
            + time::Duration::milliseconds(750);
        let params = certificate_params(&SelfSignedSpec::default(), now, SystemTime::now()).unwrap();

        assert_eq!(params.not_before.unix_timestamp(), 1_700_000_000);
        assert_eq!(params.not_before.nanosecond(), 0);
        assert_eq!(params.not_after - params.not_before, time::Duration::days(1));
        assert!(matches!(params.is_ca, IsCa::ExplicitNoCa));
        assert_eq!(params.key_usages, vec![KeyUsagePurpose::DigitalSignature]);
        assert_eq!(params.extended_key_usages, vec![ExtendedKeyUsagePurpose::ServerAuth]);
        assert_eq!(params.subject_alt_names.len(), 1);
    }

    #[test]
    fn serial_tracks_clock() {
        let t0 = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let t1 = t0 + Duration::from_nanos(1);
        assert_ne!(time_serial(t0), time_serial(t1));
    }

    #[test]
    fn rejects_invalid_dns_name() {
        let spec = SelfSignedSpec {
            dns_names: vec!["b\u{e9}cher.local".to_string()],
            ..SelfSignedSpec::default()
        };
        let err = certificate_params(&spec, OffsetDateTime::now_utc(), SystemTime::now()).unwrap_err();
        assert!(matches!(err, BootstrapError::Encoding(_)));
    }
}
