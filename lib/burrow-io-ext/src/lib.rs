/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod io;
mod stream;

pub use io::{ReadExactly, ReadExactlyExt, WriteAllFlush, WriteAllFlushExt};
pub use stream::AsyncStream;

#[cfg(feature = "rustls")]
pub use stream::MaybeTlsStream;
