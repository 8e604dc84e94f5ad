/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use rustls::client::Resumption;
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::CertificateDer;
use rustls_pki_types::pem::PemObject;

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub fn load_pem_certificates(pem: &[u8]) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let mut certs = Vec::new();
    for (i, r) in CertificateDer::pem_slice_iter(pem).enumerate() {
        let cert = r.map_err(|e| anyhow!("invalid certificate #{i}: {e}"))?;
        certs.push(cert);
    }
    if certs.is_empty() {
        return Err(anyhow!("no certificate found"));
    }
    Ok(certs)
}

#[cfg(feature = "rustls-aws-lc")]
fn builtin_crypto_provider() -> Option<CryptoProvider> {
    Some(rustls::crypto::aws_lc_rs::default_provider())
}

#[cfg(all(feature = "rustls-ring", not(feature = "rustls-aws-lc")))]
fn builtin_crypto_provider() -> Option<CryptoProvider> {
    Some(rustls::crypto::ring::default_provider())
}

#[cfg(not(any(feature = "rustls-ring", feature = "rustls-aws-lc")))]
fn builtin_crypto_provider() -> Option<CryptoProvider> {
    None
}

/// The process default provider wins over the one selected by crate features.
fn select_crypto_provider(
    installed: Option<&Arc<CryptoProvider>>,
    builtin: Option<CryptoProvider>,
) -> anyhow::Result<Arc<CryptoProvider>> {
    if let Some(provider) = installed {
        return Ok(provider.clone());
    }
    builtin
        .map(Arc::new)
        .ok_or_else(|| anyhow!("no rustls crypto provider installed or enabled by features"))
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RustlsClientConfigBuilder {
    ca_certs: Vec<CertificateDer<'static>>,
    no_default_ca_certs: bool,
    disable_sni: bool,
    no_session_cache: bool,
    handshake_timeout: Duration,
}

pub struct RustlsClientConfig {
    pub driver: Arc<ClientConfig>,
    pub handshake_timeout: Duration,
}

impl Default for RustlsClientConfigBuilder {
    fn default() -> Self {
        RustlsClientConfigBuilder {
            ca_certs: Vec::new(),
            no_default_ca_certs: false,
            disable_sni: false,
            no_session_cache: false,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl RustlsClientConfigBuilder {
    pub fn set_ca_certificates(&mut self, certs: Vec<CertificateDer<'static>>) {
        self.ca_certs = certs;
    }

    pub fn set_no_default_ca_certificates(&mut self) {
        self.no_default_ca_certs = true;
    }

    pub fn set_disable_sni(&mut self) {
        self.disable_sni = true;
    }

    pub fn set_no_session_cache(&mut self) {
        self.no_session_cache = true;
    }

    pub fn set_handshake_timeout(&mut self, timeout: Duration) {
        self.handshake_timeout = timeout;
    }

    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.no_default_ca_certs && self.ca_certs.is_empty() {
            return Err(anyhow!(
                "no ca certificate set while default ca certificates disabled"
            ));
        }
        Ok(())
    }

    pub fn build(&self) -> anyhow::Result<RustlsClientConfig> {
        self.check()?;

        let mut roots = RootCertStore::empty();
        if !self.no_default_ca_certs {
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }
        for (i, cert) in self.ca_certs.iter().enumerate() {
            roots
                .add(cert.clone())
                .map_err(|e| anyhow!("failed to add ca certificate #{i}: {e}"))?;
        }

        let provider =
            select_crypto_provider(CryptoProvider::get_default(), builtin_crypto_provider())?;
        let mut config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| anyhow!("unsupported tls protocol versions: {e}"))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        if self.disable_sni {
            config.enable_sni = false;
        }
        if self.no_session_cache {
            config.resumption = Resumption::disabled();
        }

        Ok(RustlsClientConfig {
            driver: Arc::new(config),
            handshake_timeout: self.handshake_timeout,
        })
    }
}
