/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
mod dispatch;
mod error;
mod factory;
mod fetch;
mod socks5;

#[cfg(feature = "yaml")]
mod yaml;

pub use config::{Socks5DispatcherConfig, Socks5DispatcherConfigBuilder};
pub use dispatch::{Dispatch, Dispatcher, Transport};
pub use error::DispatchError;
pub use factory::{DispatcherFactory, make_dispatcher};
pub use fetch::{HttpEngine, ProxiedFetch, connect_options_for};
pub use socks5::Socks5Dispatcher;
