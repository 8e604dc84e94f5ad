/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::SocksConnectError;

pub(crate) const SOCKS5_VERSION: u8 = 0x05;
pub(crate) const METHOD_NO_AUTH: u8 = 0x00;
pub(crate) const CMD_TCP_CONNECT: u8 = 0x01;

pub(crate) const ATYP_IPV4: u8 = 0x01;
pub(crate) const ATYP_DOMAIN: u8 = 0x03;
pub(crate) const ATYP_IPV6: u8 = 0x04;

mod addr;
pub use addr::{Socks5Addr, encode_hostname};

mod reply;
pub use reply::Socks5ReplyCode;

mod handshake;
pub use handshake::{Socks5Handshake, Socks5HandshakeState};

pub mod client;
