/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use url::Url;

use super::ProxyParseError;
use crate::net::UpstreamAddr;

/// Any non-socks proxy url, handed as-is to an external http proxy dispatcher.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpProxy {
    url: Url,
    peer: UpstreamAddr,
}

impl HttpProxy {
    pub fn peer(&self) -> &UpstreamAddr {
        &self.peer
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(super) fn from_url(url: &Url) -> Result<Self, ProxyParseError> {
        let default_port = url.port_or_known_default().unwrap_or(80);
        let peer = super::peer_from_url(url, default_port)?;
        Ok(HttpProxy {
            url: url.clone(),
            peer,
        })
    }
}
