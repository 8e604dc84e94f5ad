/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod host;
mod proxy;
mod target;
mod upstream;

#[cfg(feature = "rustls")]
mod rustls;

pub use host::Host;
pub use proxy::{
    HttpProxy, Proxy, ProxyKind, ProxyParseError, SOCKS5_DEFAULT_PORT, Socks5Proxy,
};
pub use target::{ConnectOptions, ConnectTarget, TargetParseError, TargetProtocol};
pub use upstream::UpstreamAddr;

#[cfg(feature = "rustls")]
pub use self::rustls::{RustlsClientConfig, RustlsClientConfigBuilder, load_pem_certificates};
