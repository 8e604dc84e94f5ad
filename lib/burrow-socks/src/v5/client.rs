/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use bytes::BytesMut;
use log::trace;
use tokio::io::{AsyncRead, AsyncWrite};

use burrow_io_ext::{ReadExactlyExt, WriteAllFlushExt};
use burrow_types::net::UpstreamAddr;

use super::{Socks5Handshake, Socks5HandshakeState, SocksConnectError};

/// tcp connect to `addr` through a socks5 proxy
///
/// When this returns successfully the stream is positioned at the first
/// byte of tunneled data. On error the stream is in an unknown state and
/// should be closed.
pub async fn socks5_connect_to<S>(
    stream: &mut S,
    addr: &UpstreamAddr,
) -> Result<(), SocksConnectError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut hs = Socks5Handshake::new(addr.host(), addr.port());
    let mut buf = BytesMut::with_capacity(32);

    loop {
        let state = hs.state();
        trace!("socks5 handshake to {addr}: {state}");
        match state {
            Socks5HandshakeState::Start => {
                let req = hs.start()?;
                stream
                    .write_all_flush(req)
                    .await
                    .map_err(|e| SocksConnectError::WriteFailed(state, e))?;
            }
            Socks5HandshakeState::MethodAcked => {
                buf.clear();
                hs.send_connect_request(&mut buf)?;
                stream
                    .write_all_flush(&buf)
                    .await
                    .map_err(|e| SocksConnectError::WriteFailed(state, e))?;
            }
            Socks5HandshakeState::Established => return Ok(()),
            Socks5HandshakeState::Failed => return Err(SocksConnectError::InvalidState(state)),
            _ => {
                let len = hs
                    .pending_read()
                    .ok_or(SocksConnectError::InvalidState(state))?;
                let data = stream
                    .read_exactly(len)
                    .await
                    .map_err(|e| SocksConnectError::ReadFailed(state, e))?;
                hs.recv(&data)?;
            }
        }
    }
}
