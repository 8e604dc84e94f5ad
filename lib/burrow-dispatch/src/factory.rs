/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use burrow_types::net::{HttpProxy, Proxy};

use crate::{
    Dispatch, DispatchError, Dispatcher, Socks5Dispatcher, Socks5DispatcherConfigBuilder,
};

/// Selects a dispatcher by proxy url scheme.
///
/// socks5 dispatchers are built from a template config, with the proxy
/// taken from the url.
#[derive(Clone, Debug, Default)]
pub struct DispatcherFactory {
    socks5_template: Socks5DispatcherConfigBuilder,
}

impl DispatcherFactory {
    pub fn new(socks5_template: Socks5DispatcherConfigBuilder) -> Self {
        DispatcherFactory { socks5_template }
    }

    /// `http_dispatcher` is only called for urls that are not socks5 / socks5h.
    pub fn make_dispatcher<F>(
        &self,
        proxy_url: &str,
        http_dispatcher: F,
    ) -> Result<Dispatcher, DispatchError>
    where
        F: FnOnce(HttpProxy) -> anyhow::Result<Arc<dyn Dispatch>>,
    {
        match Proxy::from_str(proxy_url)? {
            Proxy::Socks5(proxy) => {
                debug!("using socks5 proxy {}", proxy.peer());
                let mut builder = self.socks5_template.clone();
                builder.set_proxy(proxy);
                let config = builder.build().map_err(DispatchError::InvalidConfig)?;
                Ok(Dispatcher::Socks5(Arc::new(Socks5Dispatcher::new(config))))
            }
            Proxy::Http(proxy) => {
                debug!("using http proxy {}", proxy.peer());
                let d = http_dispatcher(proxy).map_err(DispatchError::Upstream)?;
                Ok(Dispatcher::Http(d))
            }
        }
    }
}

/// Same as [`DispatcherFactory::make_dispatcher`] with the default socks5 config.
pub fn make_dispatcher<F>(proxy_url: &str, http_dispatcher: F) -> Result<Dispatcher, DispatchError>
where
    F: FnOnce(HttpProxy) -> anyhow::Result<Arc<dyn Dispatch>>,
{
    DispatcherFactory::default().make_dispatcher(proxy_url, http_dispatcher)
}
