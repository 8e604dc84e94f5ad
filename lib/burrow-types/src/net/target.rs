/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{Host, UpstreamAddr};

#[derive(Debug, Error)]
pub enum TargetParseError {
    #[error("no target host found in connect options {0}")]
    NoHostFound(String),
}

/// Connection options as passed in by the http engine.
///
/// All fields are optional and loosely typed, the way an engine hands them
/// over. Use [`ConnectTarget::try_from`] to get a validated target.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectOptions {
    pub hostname: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub protocol: Option<String>,
    pub servername: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetProtocol {
    Http,
    Https,
}

impl TargetProtocol {
    pub const fn default_port(&self) -> u16 {
        match self {
            TargetProtocol::Http => 80,
            TargetProtocol::Https => 443,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TargetProtocol::Http => "http",
            TargetProtocol::Https => "https",
        }
    }

    /// Anything that is not recognizably https is treated as plain http.
    fn from_option(v: Option<&str>) -> Self {
        match v.map(|s| s.trim_end_matches(':')) {
            Some(s) if s.eq_ignore_ascii_case("https") => TargetProtocol::Https,
            _ => TargetProtocol::Http,
        }
    }
}

impl fmt::Display for TargetProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The real destination to tunnel to, derived once per connect attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectTarget {
    upstream: UpstreamAddr,
    protocol: TargetProtocol,
    tls_name: Option<String>,
}

impl ConnectTarget {
    pub fn new(upstream: UpstreamAddr, protocol: TargetProtocol) -> Self {
        ConnectTarget {
            upstream,
            protocol,
            tls_name: None,
        }
    }

    pub fn set_tls_name(&mut self, name: String) {
        self.tls_name = Some(name);
    }

    #[inline]
    pub fn upstream(&self) -> &UpstreamAddr {
        &self.upstream
    }

    #[inline]
    pub fn host(&self) -> &Host {
        self.upstream.host()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.upstream.port()
    }

    #[inline]
    pub fn protocol(&self) -> TargetProtocol {
        self.protocol
    }

    /// The server name override given by the caller, if any.
    pub fn tls_name(&self) -> Option<&str> {
        self.tls_name.as_deref()
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

impl TryFrom<&ConnectOptions> for ConnectTarget {
    type Error = TargetParseError;

    fn try_from(opts: &ConnectOptions) -> Result<Self, Self::Error> {
        // the tls server name is accepted as a last resort
        let host = non_empty(&opts.hostname)
            .or_else(|| non_empty(&opts.host))
            .or_else(|| non_empty(&opts.servername))
            .ok_or_else(|| TargetParseError::NoHostFound(format!("{opts:?}")))?;

        let protocol = TargetProtocol::from_option(opts.protocol.as_deref());
        let port = opts
            .port
            .as_deref()
            .and_then(|s| u16::from_str(s.trim()).ok())
            .filter(|p| *p != 0)
            .unwrap_or_else(|| protocol.default_port());

        let mut target = ConnectTarget::new(UpstreamAddr::new(Host::classify(host), port), protocol);
        if let Some(name) = non_empty(&opts.servername) {
            target.set_tls_name(name.to_string());
        }
        Ok(target)
    }
}
