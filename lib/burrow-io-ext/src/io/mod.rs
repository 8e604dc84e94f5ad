/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tokio::io::{AsyncRead, AsyncWrite};

mod read_exactly;
pub use read_exactly::ReadExactly;

mod write_all_flush;
pub use write_all_flush::WriteAllFlush;

pub trait ReadExactlyExt: AsyncRead {
    /// Read exactly `len` bytes, waiting for as many chunks as needed.
    ///
    /// Nothing beyond `len` is taken from the reader.
    fn read_exactly(&mut self, len: usize) -> ReadExactly<'_, Self>
    where
        Self: Unpin,
    {
        ReadExactly::new(self, len)
    }
}

impl<R: AsyncRead + ?Sized> ReadExactlyExt for R {}

pub trait WriteAllFlushExt: AsyncWrite {
    fn write_all_flush<'a>(&'a mut self, buf: &'a [u8]) -> WriteAllFlush<'a, Self>
    where
        Self: Unpin,
    {
        WriteAllFlush::new(self, buf)
    }
}

impl<W: AsyncWrite + ?Sized> WriteAllFlushExt for W {}
