/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[cfg(feature = "rustls")]
mod fs;
mod net;
mod primary;

pub use net::as_socks5_proxy;
pub use primary::as_bool;

#[cfg(feature = "rustls")]
mod rustls;

#[cfg(feature = "rustls")]
pub use self::rustls::{
    as_rustls_certificates, as_rustls_client_config_builder, as_rustls_server_name,
};
