/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use burrow_socks::SocksConnectError;
use burrow_types::net::{Host, ProxyParseError, TargetParseError, UpstreamAddr};

/// Why a connect attempt failed, one variant per phase.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetParseError),
    #[error("invalid proxy url: {0}")]
    InvalidProxyUrl(#[from] ProxyParseError),
    #[error("invalid config: {0:?}")]
    InvalidConfig(anyhow::Error),
    #[error("failed to resolve {0}: {1:?}")]
    ResolveFailed(Host, io::Error),
    #[error("tcp connect to proxy {0} failed: {1:?}")]
    TcpConnectFailed(UpstreamAddr, io::Error),
    #[error("tcp connect to proxy {0} timed out")]
    TcpConnectTimeout(UpstreamAddr),
    #[error("socks5 negotiation failed: {0}")]
    SocksNegotiationFailed(#[from] SocksConnectError),
    #[error("socks5 negotiation timed out")]
    SocksNegotiationTimeout,
    #[error("invalid tls server name {0}")]
    InvalidTlsName(String),
    #[error("tls handshake failed: {0:?}")]
    TlsHandshakeFailed(io::Error),
    #[error("tls handshake timed out")]
    TlsHandshakeTimeout,
    #[error("cancelled")]
    Cancelled,
    #[error("upstream dispatcher error: {0:?}")]
    Upstream(anyhow::Error),
}

impl DispatchError {
    /// The reply code sent by the socks5 proxy, if it rejected the connect request.
    pub fn socks5_reply_code(&self) -> Option<u8> {
        match self {
            DispatchError::SocksNegotiationFailed(e) => e.reply_code(),
            _ => None,
        }
    }
}
