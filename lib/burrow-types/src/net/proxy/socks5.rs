/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use url::Url;

use super::ProxyParseError;
use crate::net::UpstreamAddr;

pub const SOCKS5_DEFAULT_PORT: u16 = 1080;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Socks5Proxy {
    peer: UpstreamAddr,
    proxy_side_dns: bool,
}

impl Socks5Proxy {
    pub fn new(peer: UpstreamAddr, proxy_side_dns: bool) -> Self {
        Socks5Proxy {
            peer,
            proxy_side_dns,
        }
    }

    pub fn peer(&self) -> &UpstreamAddr {
        &self.peer
    }

    /// Whether the url asked the proxy to do name resolution (`socks5h`).
    ///
    /// This is only a hint, the dispatcher config decides who resolves.
    pub fn proxy_side_dns(&self) -> bool {
        self.proxy_side_dns
    }

    pub(super) fn from_url_authority(url: &Url) -> Result<Self, ProxyParseError> {
        let peer = super::peer_from_url(url, SOCKS5_DEFAULT_PORT)?;
        let proxy_side_dns = url.scheme().eq_ignore_ascii_case("socks5h");
        Ok(Socks5Proxy::new(peer, proxy_side_dns))
    }
}
