/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::Socks5DispatcherConfigBuilder;

impl Socks5DispatcherConfigBuilder {
    pub fn parse_yaml(v: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<Self> {
        match v {
            Yaml::Hash(map) => {
                let mut builder = Socks5DispatcherConfigBuilder::default();
                burrow_yaml::foreach_kv(map, |k, v| builder.set_by_yaml_kv(k, v, lookup_dir))?;
                Ok(builder)
            }
            Yaml::String(_) => {
                let proxy = burrow_yaml::value::as_socks5_proxy(v)?;
                Ok(Socks5DispatcherConfigBuilder::new(proxy))
            }
            _ => Err(anyhow!(
                "yaml value type for 'socks5 dispatcher config' should be 'map' or 'string'"
            )),
        }
    }

    pub fn set_by_yaml_kv(
        &mut self,
        k: &str,
        v: &Yaml,
        lookup_dir: Option<&Path>,
    ) -> anyhow::Result<()> {
        match burrow_yaml::key::normalize(k).as_str() {
            "proxy" | "proxy_url" => {
                let proxy = burrow_yaml::value::as_socks5_proxy(v)
                    .context(format!("invalid socks5 proxy url value for key {k}"))?;
                self.set_proxy(proxy);
                Ok(())
            }
            "tls" | "tls_client" => {
                let tls = burrow_yaml::value::as_rustls_client_config_builder(v, lookup_dir)
                    .context(format!("invalid rustls tls client config value for key {k}"))?;
                self.set_tls_client(tls);
                Ok(())
            }
            "tls_name" => {
                let name = burrow_yaml::value::as_rustls_server_name(v)
                    .context(format!("invalid rustls server name value for key {k}"))?;
                self.set_tls_name(name);
                Ok(())
            }
            "connect_timeout" => {
                let timeout = burrow_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.set_connect_timeout(timeout);
                Ok(())
            }
            "negotiation_timeout" | "handshake_timeout" => {
                let timeout = burrow_yaml::humanize::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                self.set_negotiation_timeout(timeout);
                Ok(())
            }
            "resolve_locally" | "local_resolve" => {
                let enable = burrow_yaml::value::as_bool(v)
                    .context(format!("invalid bool value for key {k}"))?;
                self.set_resolve_locally(enable);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}
