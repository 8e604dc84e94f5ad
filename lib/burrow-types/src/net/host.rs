/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;

/// A destination host as written by the caller.
///
/// Classification is purely syntactic: dotted-quad and colon-hex strings
/// become [`Host::Ip`], everything else is kept verbatim as a domain.
/// No name resolution ever happens here.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Host {
    Ip(IpAddr),
    Domain(Arc<str>),
}

impl Host {
    pub fn classify(s: &str) -> Self {
        if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Ok(ip6) = Ipv6Addr::from_str(inner) {
                return Host::Ip(IpAddr::V6(ip6));
            }
        } else if let Ok(ip) = IpAddr::from_str(s) {
            return Host::Ip(ip);
        }
        Host::Domain(Arc::from(s))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Host::Ip(_) => false,
            Host::Domain(domain) => domain.is_empty(),
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Host::Domain(_))
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Ip(ip) => write!(f, "{ip}"),
            Host::Domain(domain) => f.write_str(domain),
        }
    }
}

impl From<url::Host<&str>> for Host {
    fn from(v: url::Host<&str>) -> Self {
        match v {
            url::Host::Ipv4(ip4) => Host::Ip(IpAddr::V4(ip4)),
            url::Host::Ipv6(ip6) => Host::Ip(IpAddr::V6(ip6)),
            // non-special schemes keep ip literals as opaque hosts
            url::Host::Domain(domain) => Host::classify(domain),
        }
    }
}

impl FromStr for Host {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(anyhow!("empty host string"));
        }
        Ok(Host::classify(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn classify_ip() {
        assert_eq!(
            Host::classify("192.168.1.1"),
            Host::Ip(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)))
        );
        assert_eq!(Host::classify("::1"), Host::Ip(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(
            Host::classify("[::1]"),
            Host::Ip(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );

        // mapped addresses stay in the colon-hex family
        let host = Host::classify("::ffff:10.0.0.1");
        assert!(matches!(host, Host::Ip(IpAddr::V6(_))));
    }

    #[test]
    fn classify_domain() {
        assert_eq!(
            Host::classify("example.com"),
            Host::Domain(Arc::from("example.com"))
        );
        assert_eq!(
            Host::classify("1.2.3.4.example"),
            Host::Domain(Arc::from("1.2.3.4.example"))
        );
        assert_eq!(Host::classify("[abc]"), Host::Domain(Arc::from("[abc]")));
        assert_eq!(Host::classify("bücher.de").to_string(), "bücher.de");
    }

    #[test]
    fn parse() {
        assert!(Host::from_str("").is_err());
        let host = Host::from_str("example.net").unwrap();
        assert!(host.is_domain());
        assert!(!host.is_empty());
    }

    #[test]
    fn from_url_host() {
        let url = url::Url::parse("socks5://127.0.0.1:1080").unwrap();
        let host = Host::from(url.host().unwrap());
        assert_eq!(host, Host::Ip(IpAddr::V4(Ipv4Addr::LOCALHOST)));

        let url = url::Url::parse("socks5://[::1]:1080").unwrap();
        let host = Host::from(url.host().unwrap());
        assert_eq!(host, Host::Ip(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }
}
