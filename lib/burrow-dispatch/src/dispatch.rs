/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use burrow_io_ext::AsyncStream;
use burrow_types::net::{ConnectOptions, ProxyKind};

use crate::{DispatchError, Socks5Dispatcher};

/// A connected stream, owned by the caller once handed over.
pub type Transport = Box<dyn AsyncStream>;

/// Something that opens a transport for the given connect options.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn connect(&self, options: &ConnectOptions) -> Result<Transport, DispatchError>;
}

/// The dispatcher selected for one proxy url.
///
/// It is created once and then shared by every request.
#[derive(Clone)]
pub enum Dispatcher {
    Socks5(Arc<Socks5Dispatcher>),
    /// Anything that is not socks5, provided by the http engine.
    Http(Arc<dyn Dispatch>),
}

impl Dispatcher {
    pub fn kind(&self) -> ProxyKind {
        match self {
            Dispatcher::Socks5(_) => ProxyKind::Socks5,
            Dispatcher::Http(_) => ProxyKind::Http,
        }
    }

    pub async fn connect(&self, options: &ConnectOptions) -> Result<Transport, DispatchError> {
        match self {
            Dispatcher::Socks5(d) => d.connect(options).await,
            Dispatcher::Http(d) => d.connect(options).await,
        }
    }

    /// Connect, or give up as soon as `cancel` fires.
    ///
    /// The in-flight attempt is dropped on cancellation, which closes any
    /// socket it has opened.
    pub async fn connect_cancellable(
        &self,
        options: &ConnectOptions,
        cancel: &CancellationToken,
    ) -> Result<Transport, DispatchError> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(DispatchError::Cancelled),
            r = self.connect(options) => r,
        }
    }

    /// Run the connect in a new task and report the outcome to `callback`.
    ///
    /// The callback is called exactly once, with whichever of completion or
    /// cancellation happened first. Aborting the returned handle counts as
    /// cancellation.
    pub fn connect_with_callback<F>(
        self: &Arc<Self>,
        options: ConnectOptions,
        cancel: CancellationToken,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Transport, DispatchError>) + Send + 'static,
    {
        let dispatcher = Arc::clone(self);
        let settle = SettleOnce::new(callback);
        tokio::spawn(async move {
            let r = dispatcher.connect_cancellable(&options, &cancel).await;
            settle.settle(r);
        })
    }
}

/// Holds the completion callback until the outcome is known.
///
/// Dropped unsettled, it reports [`DispatchError::Cancelled`].
struct SettleOnce<F>
where
    F: FnOnce(Result<Transport, DispatchError>),
{
    callback: Option<F>,
}

impl<F> SettleOnce<F>
where
    F: FnOnce(Result<Transport, DispatchError>),
{
    fn new(callback: F) -> Self {
        SettleOnce {
            callback: Some(callback),
        }
    }

    fn settle(mut self, r: Result<Transport, DispatchError>) {
        if let Some(callback) = self.callback.take() {
            callback(r);
        }
    }
}

impl<F> Drop for SettleOnce<F>
where
    F: FnOnce(Result<Transport, DispatchError>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(Err(DispatchError::Cancelled));
        }
    }
}

#[async_trait]
impl Dispatch for Dispatcher {
    async fn connect(&self, options: &ConnectOptions) -> Result<Transport, DispatchError> {
        Dispatcher::connect(self, options).await
    }
}
