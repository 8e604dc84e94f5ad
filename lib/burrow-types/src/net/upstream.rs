/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::IpAddr;

use super::Host;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct UpstreamAddr {
    host: Host,
    port: u16,
}

impl UpstreamAddr {
    pub fn new(host: Host, port: u16) -> Self {
        UpstreamAddr { host, port }
    }

    pub fn from_ip_and_port(ip: IpAddr, port: u16) -> Self {
        UpstreamAddr::new(Host::Ip(ip), port)
    }

    pub fn from_host_str_and_port(host: &str, port: u16) -> anyhow::Result<Self> {
        let host = host.parse()?;
        Ok(UpstreamAddr::new(host, port))
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Host::Ip(IpAddr::V6(ip6)) => write!(f, "[{ip6}]:{}", self.port),
            host => write!(f, "{host}:{}", self.port),
        }
    }
}
