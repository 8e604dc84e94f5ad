/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response, Uri};

use burrow_types::net::ConnectOptions;

use crate::Dispatcher;

/// The http request engine, which asks the dispatcher for its connections.
#[async_trait]
pub trait HttpEngine: Send + Sync {
    async fn send(
        &self,
        request: Request<Bytes>,
        dispatcher: &Dispatcher,
    ) -> anyhow::Result<Response<Bytes>>;
}

/// A fetch entry point that routes every request through one dispatcher.
pub struct ProxiedFetch<E> {
    engine: E,
    dispatcher: Arc<Dispatcher>,
}

impl<E: HttpEngine> ProxiedFetch<E> {
    pub fn new(engine: E, dispatcher: Arc<Dispatcher>) -> Self {
        ProxiedFetch { engine, dispatcher }
    }

    #[inline]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub async fn fetch(&self, request: Request<Bytes>) -> anyhow::Result<Response<Bytes>> {
        self.engine.send(request, &self.dispatcher).await
    }
}

/// Connect options for the origin of `uri`, as an engine would pass them.
pub fn connect_options_for(uri: &Uri) -> ConnectOptions {
    ConnectOptions {
        hostname: uri.host().map(|s| s.to_string()),
        host: None,
        port: uri.port_u16().map(|p| p.to_string()),
        protocol: uri.scheme_str().map(|s| format!("{s}:")),
        servername: None,
    }
}
