/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::v5::{Socks5HandshakeState, Socks5ReplyCode};

#[derive(Error, Debug)]
pub enum SocksConnectError {
    #[error("read failed while waiting for {0}: {1:?}")]
    ReadFailed(Socks5HandshakeState, io::Error),
    #[error("write failed while sending {0}: {1:?}")]
    WriteFailed(Socks5HandshakeState, io::Error),
    #[error("auth negotiation failed: version {version:#04x}, method {method:#04x}")]
    AuthNegotiationFailed { version: u8, method: u8 },
    #[error("hostname too long: {0} bytes")]
    HostnameTooLong(usize),
    #[error("invalid response version {0:#04x}")]
    InvalidResponse(u8),
    #[error("connect failed: {0}")]
    ConnectFailed(Socks5ReplyCode),
    #[error("invalid bind address type {0:#04x}")]
    InvalidBindAddressType(u8),
    #[error("handshake step not allowed in state {0}")]
    InvalidState(Socks5HandshakeState),
}

impl SocksConnectError {
    /// The reply code reported by the proxy, if it rejected the request.
    pub fn reply_code(&self) -> Option<u8> {
        match self {
            SocksConnectError::ConnectFailed(code) => Some(code.code()),
            _ => None,
        }
    }
}
