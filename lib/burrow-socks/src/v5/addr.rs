/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, Bytes, BytesMut};

use burrow_types::net::Host;

use super::{ATYP_DOMAIN, ATYP_IPV4, ATYP_IPV6, SocksConnectError};

const DOMAIN_MAX_LEN: usize = u8::MAX as usize;

/// Wire form of a destination address, ATYP excluded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Socks5Addr<'a> {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Domain(&'a str),
}

impl<'a> Socks5Addr<'a> {
    pub fn from_host(host: &'a Host) -> Result<Self, SocksConnectError> {
        match host {
            Host::Ip(IpAddr::V4(ip4)) => Ok(Socks5Addr::Ipv4(*ip4)),
            Host::Ip(IpAddr::V6(ip6)) => Ok(Socks5Addr::Ipv6(*ip6)),
            Host::Domain(domain) => {
                if domain.len() > DOMAIN_MAX_LEN {
                    return Err(SocksConnectError::HostnameTooLong(domain.len()));
                }
                Ok(Socks5Addr::Domain(domain))
            }
        }
    }

    pub const fn atyp(&self) -> u8 {
        match self {
            Socks5Addr::Ipv4(_) => ATYP_IPV4,
            Socks5Addr::Ipv6(_) => ATYP_IPV6,
            Socks5Addr::Domain(_) => ATYP_DOMAIN,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Socks5Addr::Ipv4(_) => 4,
            Socks5Addr::Ipv6(_) => 16,
            Socks5Addr::Domain(domain) => 1 + domain.len(),
        }
    }

    /// Append the address bytes, with the length prefix for domains.
    pub fn put_to<B: BufMut>(&self, buf: &mut B) {
        match self {
            Socks5Addr::Ipv4(ip4) => buf.put_slice(&ip4.octets()),
            Socks5Addr::Ipv6(ip6) => buf.put_slice(&ip6.octets()),
            Socks5Addr::Domain(domain) => {
                // length checked at construction
                buf.put_u8(domain.len() as u8);
                buf.put_slice(domain.as_bytes());
            }
        }
    }
}

/// Classify `hostname` and return its ATYP and address bytes.
pub fn encode_hostname(hostname: &str) -> Result<(u8, Bytes), SocksConnectError> {
    let host = Host::classify(hostname);
    let addr = Socks5Addr::from_host(&host)?;
    let mut buf = BytesMut::with_capacity(addr.encoded_len());
    addr.put_to(&mut buf);
    Ok((addr.atyp(), buf.freeze()))
}
