/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tokio::io::{AsyncRead, AsyncWrite};

#[cfg(feature = "rustls")]
mod maybe_tls;
#[cfg(feature = "rustls")]
pub use maybe_tls::MaybeTlsStream;

/// A duplex byte stream that can be handed over to another task.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> AsyncStream for T where T: AsyncRead + AsyncWrite + Send + Unpin {}
