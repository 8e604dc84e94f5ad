/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use rustls_pki_types::ServerName;

use burrow_types::net::{
    Host, RustlsClientConfig, RustlsClientConfigBuilder, SOCKS5_DEFAULT_PORT, Socks5Proxy,
    UpstreamAddr,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Socks5DispatcherConfigBuilder {
    proxy: Socks5Proxy,
    tls_client: RustlsClientConfigBuilder,
    tls_name: Option<ServerName<'static>>,
    connect_timeout: Option<Duration>,
    negotiation_timeout: Option<Duration>,
    resolve_locally: bool,
}

pub struct Socks5DispatcherConfig {
    pub(crate) proxy: Socks5Proxy,
    pub(crate) tls_client: RustlsClientConfig,
    pub(crate) tls_name: Option<ServerName<'static>>,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) negotiation_timeout: Option<Duration>,
    pub(crate) resolve_locally: bool,
}

impl Default for Socks5DispatcherConfigBuilder {
    fn default() -> Self {
        Socks5DispatcherConfigBuilder::new(Socks5Proxy::new(
            UpstreamAddr::new(Host::Ip(IpAddr::V4(Ipv4Addr::LOCALHOST)), SOCKS5_DEFAULT_PORT),
            false,
        ))
    }
}

impl Socks5DispatcherConfigBuilder {
    pub fn new(proxy: Socks5Proxy) -> Self {
        Socks5DispatcherConfigBuilder {
            proxy,
            tls_client: RustlsClientConfigBuilder::default(),
            tls_name: None,
            connect_timeout: None,
            negotiation_timeout: None,
            resolve_locally: false,
        }
    }

    pub fn set_proxy(&mut self, proxy: Socks5Proxy) {
        self.proxy = proxy;
    }

    #[inline]
    pub fn proxy(&self) -> &Socks5Proxy {
        &self.proxy
    }

    pub fn set_tls_client(&mut self, tls: RustlsClientConfigBuilder) {
        self.tls_client = tls;
    }

    /// Default server name for https targets without an explicit one.
    pub fn set_tls_name(&mut self, name: ServerName<'static>) {
        self.tls_name = Some(name);
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = Some(timeout);
    }

    pub fn set_negotiation_timeout(&mut self, timeout: Duration) {
        self.negotiation_timeout = Some(timeout);
    }

    /// Resolve target domains before sending them to the proxy.
    pub fn set_resolve_locally(&mut self, enable: bool) {
        self.resolve_locally = enable;
    }

    pub fn build(&self) -> anyhow::Result<Socks5DispatcherConfig> {
        let tls_client = self.tls_client.build()?;
        Ok(Socks5DispatcherConfig {
            proxy: self.proxy.clone(),
            tls_client,
            tls_name: self.tls_name.clone(),
            connect_timeout: self.connect_timeout,
            negotiation_timeout: self.negotiation_timeout,
            resolve_locally: self.resolve_locally,
        })
    }
}

impl Socks5DispatcherConfig {
    #[inline]
    pub fn proxy(&self) -> &Socks5Proxy {
        &self.proxy
    }

    #[inline]
    pub fn resolve_locally(&self) -> bool {
        self.resolve_locally
    }

    #[inline]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    #[inline]
    pub fn negotiation_timeout(&self) -> Option<Duration> {
        self.negotiation_timeout
    }
}
