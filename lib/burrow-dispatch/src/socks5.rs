/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use burrow_io_ext::MaybeTlsStream;
use burrow_socks::v5;
use burrow_types::net::{
    ConnectOptions, ConnectTarget, Host, Socks5Proxy, TargetProtocol, UpstreamAddr,
};

use crate::{Dispatch, DispatchError, Socks5DispatcherConfig, Transport};

async fn lookup_first(host: &Host, port: u16) -> Result<SocketAddr, DispatchError> {
    match host {
        Host::Ip(ip) => Ok(SocketAddr::new(*ip, port)),
        Host::Domain(domain) => {
            let mut addrs = tokio::net::lookup_host((domain.as_ref(), port))
                .await
                .map_err(|e| DispatchError::ResolveFailed(host.clone(), e))?;
            addrs.next().ok_or_else(|| {
                DispatchError::ResolveFailed(
                    host.clone(),
                    io::Error::new(io::ErrorKind::NotFound, "no address resolved"),
                )
            })
        }
    }
}

async fn maybe_timeout<F: Future>(timeout: Option<Duration>, f: F) -> Option<F::Output> {
    match timeout {
        Some(t) => tokio::time::timeout(t, f).await.ok(),
        None => Some(f.await),
    }
}

/// Opens tunnels to targets through one socks5 proxy.
///
/// The config is fixed for the dispatcher lifetime, so concurrent connect
/// attempts share nothing mutable.
pub struct Socks5Dispatcher {
    config: Socks5DispatcherConfig,
}

impl Socks5Dispatcher {
    pub fn new(config: Socks5DispatcherConfig) -> Self {
        Socks5Dispatcher { config }
    }

    #[inline]
    pub fn proxy(&self) -> &Socks5Proxy {
        self.config.proxy()
    }

    #[inline]
    pub fn config(&self) -> &Socks5DispatcherConfig {
        &self.config
    }

    async fn resolve_target(&self, target: &ConnectTarget) -> Result<UpstreamAddr, DispatchError> {
        if self.config.resolve_locally && target.host().is_domain() {
            let addr = lookup_first(target.host(), target.port()).await?;
            Ok(UpstreamAddr::from_ip_and_port(addr.ip(), addr.port()))
        } else {
            Ok(target.upstream().clone())
        }
    }

    async fn tcp_connect_to_proxy(&self) -> Result<TcpStream, DispatchError> {
        let proxy = self.config.proxy.peer();
        let peer = lookup_first(proxy.host(), proxy.port()).await?;
        match maybe_timeout(self.config.connect_timeout, TcpStream::connect(peer)).await {
            Some(Ok(stream)) => Ok(stream),
            Some(Err(e)) => Err(DispatchError::TcpConnectFailed(proxy.clone(), e)),
            None => Err(DispatchError::TcpConnectTimeout(proxy.clone())),
        }
    }

    async fn timed_socks5_connect_to(
        &self,
        stream: &mut TcpStream,
        upstream: &UpstreamAddr,
    ) -> Result<(), DispatchError> {
        match maybe_timeout(
            self.config.negotiation_timeout,
            v5::client::socks5_connect_to(stream, upstream),
        )
        .await
        {
            Some(r) => r.map_err(DispatchError::SocksNegotiationFailed),
            None => Err(DispatchError::SocksNegotiationTimeout),
        }
    }

    /// Pick the tls server name: explicit override, then configured default,
    /// then the target host.
    fn tls_name(&self, target: &ConnectTarget) -> Result<ServerName<'static>, DispatchError> {
        if let Some(name) = target.tls_name() {
            return ServerName::try_from(name)
                .map(|n| n.to_owned())
                .map_err(|_| DispatchError::InvalidTlsName(name.to_string()));
        }
        if let Some(name) = &self.config.tls_name {
            return Ok(name.clone());
        }
        match target.host() {
            Host::Ip(ip) => Ok(ServerName::IpAddress((*ip).into())),
            Host::Domain(domain) => ServerName::try_from(domain.as_ref())
                .map(|n| n.to_owned())
                .map_err(|_| DispatchError::InvalidTlsName(domain.to_string())),
        }
    }

    async fn tls_handshake(
        &self,
        stream: TcpStream,
        tls_name: ServerName<'static>,
    ) -> Result<MaybeTlsStream<TcpStream>, DispatchError> {
        let tls_client = &self.config.tls_client;
        let connector = TlsConnector::from(tls_client.driver.clone());
        match tokio::time::timeout(
            tls_client.handshake_timeout,
            connector.connect(tls_name, stream),
        )
        .await
        {
            Ok(Ok(tls_stream)) => Ok(MaybeTlsStream::Tls(Box::new(tls_stream))),
            Ok(Err(e)) => Err(DispatchError::TlsHandshakeFailed(e)),
            Err(_) => Err(DispatchError::TlsHandshakeTimeout),
        }
    }

    /// Tunnel to `target`, with a tls session on top for https.
    ///
    /// The proxy connection is dropped, and so closed, on every failure
    /// after it has been opened.
    pub async fn connect_to(
        &self,
        target: &ConnectTarget,
    ) -> Result<MaybeTlsStream<TcpStream>, DispatchError> {
        let tls_name = match target.protocol() {
            TargetProtocol::Https => Some(self.tls_name(target)?),
            TargetProtocol::Http => None,
        };
        let upstream = self.resolve_target(target).await?;

        let mut stream = self.tcp_connect_to_proxy().await?;
        self.timed_socks5_connect_to(&mut stream, &upstream).await?;
        debug!(
            "socks5 tunnel to {upstream} established via {}",
            self.config.proxy.peer()
        );

        match tls_name {
            Some(name) => {
                let stream = self.tls_handshake(stream, name).await?;
                debug!("tls handshake with {upstream} done");
                Ok(stream)
            }
            None => Ok(MaybeTlsStream::Plain(stream)),
        }
    }
}

#[async_trait]
impl Dispatch for Socks5Dispatcher {
    async fn connect(&self, options: &ConnectOptions) -> Result<Transport, DispatchError> {
        let target = ConnectTarget::try_from(options)?;
        match self.connect_to(&target).await {
            Ok(stream) => Ok(Box::new(stream)),
            Err(e) => {
                debug!(
                    "connect to {}://{} via socks5 proxy {} failed: {e}",
                    target.protocol(),
                    target.upstream(),
                    self.config.proxy.peer()
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Socks5DispatcherConfigBuilder;

    fn dispatcher(builder: Socks5DispatcherConfigBuilder) -> Socks5Dispatcher {
        Socks5Dispatcher::new(builder.build().unwrap())
    }

    fn https_target(host: &str) -> ConnectTarget {
        let opts = ConnectOptions {
            hostname: Some(host.to_string()),
            protocol: Some("https:".to_string()),
            ..Default::default()
        };
        ConnectTarget::try_from(&opts).unwrap()
    }

    #[test]
    fn tls_name_from_host() {
        let d = dispatcher(Socks5DispatcherConfigBuilder::default());
        let name = d.tls_name(&https_target("target.example")).unwrap();
        assert_eq!(name, ServerName::try_from("target.example").unwrap());

        let name = d.tls_name(&https_target("10.0.0.1")).unwrap();
        assert!(matches!(name, ServerName::IpAddress(_)));
    }

    #[test]
    fn tls_name_priority() {
        let mut builder = Socks5DispatcherConfigBuilder::default();
        builder.set_tls_name(ServerName::try_from("default.example").unwrap());
        let d = dispatcher(builder);

        let name = d.tls_name(&https_target("target.example")).unwrap();
        assert_eq!(name, ServerName::try_from("default.example").unwrap());

        let mut target = https_target("target.example");
        target.set_tls_name("override.example".to_string());
        let name = d.tls_name(&target).unwrap();
        assert_eq!(name, ServerName::try_from("override.example").unwrap());
    }

    #[test]
    fn tls_name_invalid() {
        let d = dispatcher(Socks5DispatcherConfigBuilder::default());
        let e = d.tls_name(&https_target("bad name")).unwrap_err();
        assert!(matches!(e, DispatchError::InvalidTlsName(_)));
    }

    #[tokio::test]
    async fn resolve_target_kept() {
        let d = dispatcher(Socks5DispatcherConfigBuilder::default());
        let target = https_target("target.example");
        let upstream = d.resolve_target(&target).await.unwrap();
        assert_eq!(&upstream, target.upstream());
    }

    #[tokio::test]
    async fn resolve_target_locally() {
        let mut builder = Socks5DispatcherConfigBuilder::default();
        builder.set_resolve_locally(true);
        let d = dispatcher(builder);

        let target = https_target("127.0.0.1");
        let upstream = d.resolve_target(&target).await.unwrap();
        assert_eq!(upstream.to_string(), "127.0.0.1:443");

        let target = https_target("localhost");
        let upstream = d.resolve_target(&target).await.unwrap();
        assert!(!upstream.host().is_domain());
        assert_eq!(upstream.port(), 443);
    }

    #[tokio::test]
    async fn proxy_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let proxy = Socks5Proxy::new(UpstreamAddr::from_ip_and_port(addr.ip(), addr.port()), false);
        let d = dispatcher(Socks5DispatcherConfigBuilder::new(proxy));
        let e = d.connect_to(&https_target("target.example")).await.err().unwrap();
        assert!(matches!(e, DispatchError::TcpConnectFailed(_, _)));
    }

    #[tokio::test]
    async fn invalid_target() {
        let d = dispatcher(Socks5DispatcherConfigBuilder::default());
        let e = d.connect(&ConnectOptions::default()).await.err().unwrap();
        assert!(matches!(e, DispatchError::InvalidTarget(_)));
    }
}
