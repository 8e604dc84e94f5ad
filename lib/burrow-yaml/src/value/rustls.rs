/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Read;
use std::path::Path;

use anyhow::{Context, anyhow};
use rustls_pki_types::{CertificateDer, ServerName};
use yaml_rust::Yaml;

use burrow_types::net::{RustlsClientConfigBuilder, load_pem_certificates};

pub fn as_rustls_server_name(v: &Yaml) -> anyhow::Result<ServerName<'static>> {
    if let Yaml::String(s) = v {
        ServerName::try_from(s.to_string()).map_err(|e| anyhow!("invalid tls server name {s}: {e}"))
    } else {
        Err(anyhow!(
            "yaml value type for 'tls server name' should be 'string'"
        ))
    }
}

fn as_certificates_from_single_element(
    v: &Yaml,
    lookup_dir: Option<&Path>,
) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    const MAX_FILE_SIZE: u64 = 4_000_000;

    if let Yaml::String(s) = v {
        if s.trim_start().starts_with("--") {
            return load_pem_certificates(s.as_bytes()).context("invalid certificate string");
        }
    }

    let (file, path) = super::fs::as_file(v, lookup_dir).context("invalid file")?;
    let mut contents = Vec::new();
    file.take(MAX_FILE_SIZE)
        .read_to_end(&mut contents)
        .map_err(|e| anyhow!("failed to read contents of file {}: {e}", path.display()))?;
    load_pem_certificates(&contents)
        .context(format!("invalid certificate file {}", path.display()))
}

/// Load certificates from inline PEM strings or PEM files.
pub fn as_rustls_certificates(
    v: &Yaml,
    lookup_dir: Option<&Path>,
) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    if let Yaml::Array(seq) = v {
        let mut certs = Vec::new();
        for (i, v) in seq.iter().enumerate() {
            let this_certs = as_certificates_from_single_element(v, lookup_dir)
                .context(format!("invalid certificates value for element #{i}"))?;
            certs.extend(this_certs);
        }
        Ok(certs)
    } else {
        as_certificates_from_single_element(v, lookup_dir)
    }
}

pub fn as_rustls_client_config_builder(
    v: &Yaml,
    lookup_dir: Option<&Path>,
) -> anyhow::Result<RustlsClientConfigBuilder> {
    let Yaml::Hash(map) = v else {
        return Err(anyhow!(
            "yaml value type for 'rustls client config' should be 'map'"
        ));
    };

    let mut builder = RustlsClientConfigBuilder::default();
    crate::foreach_kv(map, |k, v| match crate::key::normalize(k).as_str() {
        "ca_certificate" | "ca_cert" | "server_auth_certificate" => {
            let certs = as_rustls_certificates(v, lookup_dir)
                .context(format!("invalid certificates value for key {k}"))?;
            builder.set_ca_certificates(certs);
            Ok(())
        }
        "no_default_ca_certificate" | "no_default_ca_cert" => {
            if crate::value::as_bool(v)? {
                builder.set_no_default_ca_certificates();
            }
            Ok(())
        }
        "disable_sni" => {
            if crate::value::as_bool(v)? {
                builder.set_disable_sni();
            }
            Ok(())
        }
        "no_session_cache" => {
            if crate::value::as_bool(v)? {
                builder.set_no_session_cache();
            }
            Ok(())
        }
        "handshake_timeout" | "negotiation_timeout" => {
            let timeout = crate::humanize::as_duration(v)
                .context(format!("invalid humanize duration value for key {k}"))?;
            builder.set_handshake_timeout(timeout);
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    builder.check()?;
    Ok(builder)
}
