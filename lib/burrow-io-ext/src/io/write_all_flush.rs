/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use tokio::io::AsyncWrite;

pin_project! {
    /// Write the whole buffer and then flush, as one future.
    #[derive(Debug)]
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct WriteAllFlush<'a, W: ?Sized> {
        writer: &'a mut W,
        buf: &'a [u8],
        written: usize,
        flushed: bool,
    }
}

impl<'a, W> WriteAllFlush<'a, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    pub(super) fn new(writer: &'a mut W, buf: &'a [u8]) -> Self {
        WriteAllFlush {
            writer,
            buf,
            written: 0,
            flushed: false,
        }
    }
}

impl<W> Future for WriteAllFlush<'_, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    type Output = io::Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.project();

        while *me.written < me.buf.len() {
            let nw = ready!(Pin::new(&mut **me.writer).poll_write(cx, &me.buf[*me.written..]))?;
            if nw == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            *me.written += nw;
        }

        if !*me.flushed {
            ready!(Pin::new(&mut **me.writer).poll_flush(cx))?;
            *me.flushed = true;
        }
        Poll::Ready(Ok(()))
    }
}
