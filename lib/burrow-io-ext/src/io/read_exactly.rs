/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};

/// Future returned by [`ReadExactlyExt::read_exactly`](super::ReadExactlyExt::read_exactly).
///
/// Each poll drains what the reader has available, never more than the
/// bytes still missing. When the reader is not ready, its waker is the only
/// thing registered until the next poll, so repeated waits never pile up.
/// Closing or failing before `len` bytes arrived resolves to an error and
/// the partial data is dropped with the future.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ReadExactly<'a, R: ?Sized> {
    reader: &'a mut R,
    buf: Vec<u8>,
    filled: usize,
}

impl<'a, R> ReadExactly<'a, R>
where
    R: AsyncRead + ?Sized + Unpin,
{
    pub(super) fn new(reader: &'a mut R, len: usize) -> Self {
        ReadExactly {
            reader,
            buf: vec![0u8; len],
            filled: 0,
        }
    }
}

impl<R> Future for ReadExactly<'_, R>
where
    R: AsyncRead + ?Sized + Unpin,
{
    type Output = io::Result<Bytes>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let ReadExactly {
            reader,
            buf,
            filled,
        } = &mut *self;

        while *filled < buf.len() {
            let mut read_buf = ReadBuf::new(&mut buf[*filled..]);
            ready!(Pin::new(&mut **reader).poll_read(cx, &mut read_buf))?;
            let nr = read_buf.filled().len();
            if nr == 0 {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("stream closed after {filled} of {} bytes", buf.len()),
                )));
            }
            *filled += nr;
        }

        Poll::Ready(Ok(Bytes::from(mem::take(buf))))
    }
}
