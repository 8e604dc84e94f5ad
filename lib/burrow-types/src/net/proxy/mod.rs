/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::net::{Host, UpstreamAddr};

mod http;
pub use self::http::HttpProxy;

mod socks5;
pub use socks5::{SOCKS5_DEFAULT_PORT, Socks5Proxy};

#[derive(Debug, Error)]
pub enum ProxyParseError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no host found")]
    NoHostFound,
    #[error("invalid port")]
    InvalidPort,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProxyKind {
    Socks5,
    Http,
}

/// A proxy endpoint, resolved once from a proxy url.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Proxy {
    Http(HttpProxy),
    Socks5(Socks5Proxy),
}

impl Proxy {
    pub fn kind(&self) -> ProxyKind {
        match self {
            Proxy::Http(_) => ProxyKind::Http,
            Proxy::Socks5(_) => ProxyKind::Socks5,
        }
    }

    pub fn peer(&self) -> &UpstreamAddr {
        match self {
            Proxy::Http(p) => p.peer(),
            Proxy::Socks5(p) => p.peer(),
        }
    }
}

fn peer_from_url(url: &Url, default_port: u16) -> Result<UpstreamAddr, ProxyParseError> {
    let host = url.host().ok_or(ProxyParseError::NoHostFound)?;
    let host = Host::from(host);
    if host.is_empty() {
        return Err(ProxyParseError::NoHostFound);
    }
    let port = url.port().unwrap_or(default_port);
    if port == 0 {
        return Err(ProxyParseError::InvalidPort);
    }
    Ok(UpstreamAddr::new(host, port))
}

impl TryFrom<&Url> for Proxy {
    type Error = ProxyParseError;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        match value.scheme().to_ascii_lowercase().as_str() {
            "socks5" | "socks5h" => {
                let p = Socks5Proxy::from_url_authority(value)?;
                Ok(Proxy::Socks5(p))
            }
            _ => {
                let p = HttpProxy::from_url(value)?;
                Ok(Proxy::Http(p))
            }
        }
    }
}

impl FromStr for Proxy {
    type Err = ProxyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s.trim())?;
        Proxy::try_from(&url)
    }
}
