/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use bytes::{BufMut, BytesMut};

use burrow_types::net::Host;

use super::{
    ATYP_DOMAIN, ATYP_IPV4, ATYP_IPV6, CMD_TCP_CONNECT, METHOD_NO_AUTH, SOCKS5_VERSION, Socks5Addr,
    Socks5ReplyCode, SocksConnectError,
};

const METHOD_REQUEST: [u8; 3] = [SOCKS5_VERSION, 0x01, METHOD_NO_AUTH];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Socks5HandshakeState {
    Start,
    MethodSent,
    MethodAcked,
    ConnectSent,
    /// Reply header accepted, with the bind address type it announced.
    ///
    /// A domain bind address has its length byte read in this state, the
    /// fixed size ones pass through with an empty read.
    ConnectReplyHeaderRead(u8),
    /// The given number of bind address and port bytes are still to be read.
    AddressConsuming(usize),
    Established,
    Failed,
}

impl Socks5HandshakeState {
    /// How many bytes must be read from the peer before the next transition.
    ///
    /// `None` if the next step is a write, or if the handshake is over.
    pub fn pending_read(&self) -> Option<usize> {
        match self {
            Socks5HandshakeState::MethodSent => Some(2),
            Socks5HandshakeState::ConnectSent => Some(4),
            Socks5HandshakeState::ConnectReplyHeaderRead(ATYP_DOMAIN) => Some(1),
            Socks5HandshakeState::ConnectReplyHeaderRead(_) => Some(0),
            Socks5HandshakeState::AddressConsuming(n) => Some(*n),
            _ => None,
        }
    }

    fn phase(&self) -> &'static str {
        match self {
            Socks5HandshakeState::Start => "method request",
            Socks5HandshakeState::MethodSent => "method reply",
            Socks5HandshakeState::MethodAcked => "connect request",
            Socks5HandshakeState::ConnectSent => "connect reply",
            Socks5HandshakeState::ConnectReplyHeaderRead(_) => "bind address length",
            Socks5HandshakeState::AddressConsuming(_) => "bind address",
            Socks5HandshakeState::Established => "established",
            Socks5HandshakeState::Failed => "failed",
        }
    }
}

impl fmt::Display for Socks5HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phase())
    }
}

/// The client side of a SOCKS5 no-auth TCP connect exchange.
///
/// This type does no I/O. Each transition checks the current state, consumes
/// or produces the bytes of one protocol step and moves to the next state.
/// Any error moves the handshake to [`Socks5HandshakeState::Failed`], which
/// accepts no further transition.
#[derive(Debug)]
pub struct Socks5Handshake<'a> {
    host: &'a Host,
    port: u16,
    state: Socks5HandshakeState,
}

impl<'a> Socks5Handshake<'a> {
    pub fn new(host: &'a Host, port: u16) -> Self {
        Socks5Handshake {
            host,
            port,
            state: Socks5HandshakeState::Start,
        }
    }

    #[inline]
    pub fn state(&self) -> Socks5HandshakeState {
        self.state
    }

    #[inline]
    pub fn pending_read(&self) -> Option<usize> {
        self.state.pending_read()
    }

    #[inline]
    pub fn is_established(&self) -> bool {
        self.state == Socks5HandshakeState::Established
    }

    fn fail(&mut self, e: SocksConnectError) -> SocksConnectError {
        self.state = Socks5HandshakeState::Failed;
        e
    }

    fn expect_state(&mut self, expected: Socks5HandshakeState) -> Result<(), SocksConnectError> {
        if self.state == expected {
            Ok(())
        } else {
            let e = SocksConnectError::InvalidState(self.state);
            Err(self.fail(e))
        }
    }

    /// Get the method request, which offers "no authentication" only.
    pub fn start(&mut self) -> Result<&'static [u8], SocksConnectError> {
        self.expect_state(Socks5HandshakeState::Start)?;
        self.state = Socks5HandshakeState::MethodSent;
        Ok(&METHOD_REQUEST)
    }

    pub fn recv_method_reply(&mut self, reply: [u8; 2]) -> Result<(), SocksConnectError> {
        self.expect_state(Socks5HandshakeState::MethodSent)?;
        let [version, method] = reply;
        if version != SOCKS5_VERSION || method != METHOD_NO_AUTH {
            let e = SocksConnectError::AuthNegotiationFailed { version, method };
            return Err(self.fail(e));
        }
        self.state = Socks5HandshakeState::MethodAcked;
        Ok(())
    }

    /// Append the connect request for the target to `buf`.
    ///
    /// The target host is encoded here, so a hostname that does not fit is
    /// only reported after the method negotiation.
    pub fn send_connect_request(&mut self, buf: &mut BytesMut) -> Result<(), SocksConnectError> {
        self.expect_state(Socks5HandshakeState::MethodAcked)?;
        let addr = match Socks5Addr::from_host(self.host) {
            Ok(addr) => addr,
            Err(e) => return Err(self.fail(e)),
        };

        buf.reserve(6 + addr.encoded_len());
        buf.put_slice(&[SOCKS5_VERSION, CMD_TCP_CONNECT, 0x00, addr.atyp()]);
        addr.put_to(buf);
        buf.put_u16(self.port);

        self.state = Socks5HandshakeState::ConnectSent;
        Ok(())
    }

    pub fn recv_reply_header(&mut self, header: [u8; 4]) -> Result<(), SocksConnectError> {
        self.expect_state(Socks5HandshakeState::ConnectSent)?;
        let [version, rep, _rsv, atyp] = header;
        if version != SOCKS5_VERSION {
            return Err(self.fail(SocksConnectError::InvalidResponse(version)));
        }
        if rep != 0x00 {
            let code = Socks5ReplyCode::from(rep);
            return Err(self.fail(SocksConnectError::ConnectFailed(code)));
        }
        match atyp {
            ATYP_IPV4 | ATYP_IPV6 | ATYP_DOMAIN => {
                self.state = Socks5HandshakeState::ConnectReplyHeaderRead(atyp);
                Ok(())
            }
            _ => Err(self.fail(SocksConnectError::InvalidBindAddressType(atyp))),
        }
    }

    /// Get the bind address size, `data` is the domain length byte or empty.
    pub fn recv_bind_addr_len(&mut self, data: &[u8]) -> Result<(), SocksConnectError> {
        let Socks5HandshakeState::ConnectReplyHeaderRead(atyp) = self.state else {
            return Err(self.fail(SocksConnectError::InvalidState(self.state)));
        };
        let addr_len = match (atyp, data) {
            (ATYP_IPV4, []) => 4,
            (ATYP_IPV6, []) => 16,
            (ATYP_DOMAIN, [len]) => *len as usize,
            _ => return Err(self.fail(SocksConnectError::InvalidState(self.state))),
        };
        self.state = Socks5HandshakeState::AddressConsuming(addr_len + 2);
        Ok(())
    }

    /// Skip the bind address and port, the values are not used.
    pub fn recv_bind_addr(&mut self, data: &[u8]) -> Result<(), SocksConnectError> {
        match self.state {
            Socks5HandshakeState::AddressConsuming(n) if n == data.len() => {
                self.state = Socks5HandshakeState::Established;
                Ok(())
            }
            state => Err(self.fail(SocksConnectError::InvalidState(state))),
        }
    }

    /// Feed exactly [`pending_read`](Self::pending_read) bytes to the current state.
    pub fn recv(&mut self, data: &[u8]) -> Result<(), SocksConnectError> {
        match self.state {
            Socks5HandshakeState::MethodSent => match <[u8; 2]>::try_from(data) {
                Ok(reply) => self.recv_method_reply(reply),
                Err(_) => Err(self.fail(SocksConnectError::InvalidState(self.state))),
            },
            Socks5HandshakeState::ConnectSent => match <[u8; 4]>::try_from(data) {
                Ok(header) => self.recv_reply_header(header),
                Err(_) => Err(self.fail(SocksConnectError::InvalidState(self.state))),
            },
            Socks5HandshakeState::ConnectReplyHeaderRead(_) => self.recv_bind_addr_len(data),
            Socks5HandshakeState::AddressConsuming(_) => self.recv_bind_addr(data),
            state => Err(self.fail(SocksConnectError::InvalidState(state))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acked(host: &Host, port: u16) -> Socks5Handshake<'_> {
        let mut hs = Socks5Handshake::new(host, port);
        hs.start().unwrap();
        hs.recv_method_reply([0x05, 0x00]).unwrap();
        hs
    }

    fn connect_sent(host: &Host, port: u16) -> Socks5Handshake<'_> {
        let mut hs = acked(host, port);
        let mut buf = BytesMut::new();
        hs.send_connect_request(&mut buf).unwrap();
        hs
    }

    #[test]
    fn method_request() {
        let host = Host::classify("example.com");
        let mut hs = Socks5Handshake::new(&host, 80);
        assert_eq!(hs.state(), Socks5HandshakeState::Start);
        assert_eq!(hs.pending_read(), None);
        assert_eq!(hs.start().unwrap(), &[0x05, 0x01, 0x00]);
        assert_eq!(hs.state(), Socks5HandshakeState::MethodSent);
        assert_eq!(hs.pending_read(), Some(2));
    }

    #[test]
    fn method_reply_no_auth() {
        let host = Host::classify("example.com");
        let hs = acked(&host, 80);
        assert_eq!(hs.state(), Socks5HandshakeState::MethodAcked);
        assert_eq!(hs.pending_read(), None);
    }

    #[test]
    fn method_reply_rejected() {
        let host = Host::classify("example.com");
        let mut hs = Socks5Handshake::new(&host, 80);
        hs.start().unwrap();
        let e = hs.recv_method_reply([0x05, 0x01]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::AuthNegotiationFailed {
                version: 0x05,
                method: 0x01
            }
        ));
        assert_eq!(hs.state(), Socks5HandshakeState::Failed);

        let mut hs = Socks5Handshake::new(&host, 80);
        hs.start().unwrap();
        let e = hs.recv(&[0x05, 0xff]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::AuthNegotiationFailed { method: 0xff, .. }
        ));

        let mut hs = Socks5Handshake::new(&host, 80);
        hs.start().unwrap();
        let e = hs.recv_method_reply([0x04, 0x00]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::AuthNegotiationFailed { version: 0x04, .. }
        ));
    }

    #[test]
    fn connect_request_ipv4() {
        let host = Host::classify("192.168.1.1");
        let mut hs = acked(&host, 8080);
        let mut buf = BytesMut::new();
        hs.send_connect_request(&mut buf).unwrap();
        assert_eq!(
            buf.as_ref(),
            &[0x05, 0x01, 0x00, 0x01, 192, 168, 1, 1, 0x1f, 0x90]
        );
        assert_eq!(hs.state(), Socks5HandshakeState::ConnectSent);
        assert_eq!(hs.pending_read(), Some(4));
    }

    #[test]
    fn connect_request_ipv6() {
        let host = Host::classify("[::1]");
        let mut hs = acked(&host, 443);
        let mut buf = BytesMut::new();
        hs.send_connect_request(&mut buf).unwrap();
        let mut expected = vec![0x05, 0x01, 0x00, 0x04];
        expected.extend_from_slice(&[0u8; 15]);
        expected.extend_from_slice(&[0x01, 0x01, 0xbb]);
        assert_eq!(buf.as_ref(), expected.as_slice());
    }

    #[test]
    fn connect_request_domain() {
        let host = Host::classify("example.com");
        let mut hs = acked(&host, 443);
        let mut buf = BytesMut::new();
        hs.send_connect_request(&mut buf).unwrap();
        let mut expected = vec![0x05, 0x01, 0x00, 0x03, 11];
        expected.extend_from_slice(b"example.com");
        expected.extend_from_slice(&[0x01, 0xbb]);
        assert_eq!(buf.as_ref(), expected.as_slice());
    }

    #[test]
    fn connect_request_hostname_too_long() {
        let host = Host::classify(&"h".repeat(300));
        let mut hs = acked(&host, 443);
        let mut buf = BytesMut::new();
        let e = hs.send_connect_request(&mut buf).unwrap_err();
        assert!(matches!(e, SocksConnectError::HostnameTooLong(300)));
        assert_eq!(hs.state(), Socks5HandshakeState::Failed);
        assert!(buf.is_empty());
    }

    #[test]
    fn reply_ipv4() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        hs.recv(&[0x05, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(
            hs.state(),
            Socks5HandshakeState::ConnectReplyHeaderRead(0x01)
        );
        assert_eq!(hs.pending_read(), Some(0));
        hs.recv(&[]).unwrap();
        assert_eq!(hs.state(), Socks5HandshakeState::AddressConsuming(6));
        hs.recv(&[127, 0, 0, 1, 0x04, 0x38]).unwrap();
        assert!(hs.is_established());
        assert_eq!(hs.pending_read(), None);
    }

    #[test]
    fn reply_ipv6() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        hs.recv_reply_header([0x05, 0x00, 0x00, 0x04]).unwrap();
        assert_eq!(hs.pending_read(), Some(0));
        hs.recv_bind_addr_len(&[]).unwrap();
        assert_eq!(hs.pending_read(), Some(18));
        hs.recv(&[0u8; 18]).unwrap();
        assert!(hs.is_established());
    }

    #[test]
    fn reply_domain() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        hs.recv_reply_header([0x05, 0x00, 0x00, 0x03]).unwrap();
        assert_eq!(
            hs.state(),
            Socks5HandshakeState::ConnectReplyHeaderRead(0x03)
        );
        assert_eq!(hs.pending_read(), Some(1));
        hs.recv(&[9]).unwrap();
        assert_eq!(hs.pending_read(), Some(11));
        hs.recv(b"localhost\x00\x50").unwrap();
        assert!(hs.is_established());
    }

    #[test]
    fn reply_domain_empty() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        hs.recv_reply_header([0x05, 0x00, 0x00, 0x03]).unwrap();
        hs.recv_bind_addr_len(&[0]).unwrap();
        assert_eq!(hs.pending_read(), Some(2));
        hs.recv_bind_addr(&[0x00, 0x00]).unwrap();
        assert!(hs.is_established());
    }

    #[test]
    fn reply_failed() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        let e = hs.recv_reply_header([0x05, 0x01, 0x00, 0x01]).unwrap_err();
        assert_eq!(e.reply_code(), Some(1));
        assert!(matches!(
            e,
            SocksConnectError::ConnectFailed(Socks5ReplyCode::GeneralServerFailure)
        ));
        assert_eq!(hs.state(), Socks5HandshakeState::Failed);
    }

    #[test]
    fn reply_invalid_version() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        let e = hs.recv_reply_header([0x04, 0x00, 0x00, 0x01]).unwrap_err();
        assert!(matches!(e, SocksConnectError::InvalidResponse(0x04)));
        assert_eq!(e.reply_code(), None);
    }

    #[test]
    fn reply_invalid_version_first() {
        // the version is checked before the reply code
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        let e = hs.recv_reply_header([0x00, 0x5b, 0x00, 0x01]).unwrap_err();
        assert!(matches!(e, SocksConnectError::InvalidResponse(0x00)));
    }

    #[test]
    fn reply_invalid_atyp() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        let e = hs.recv(&[0x05, 0x00, 0x00, 0x02]).unwrap_err();
        assert!(matches!(e, SocksConnectError::InvalidBindAddressType(0x02)));
        assert_eq!(hs.state(), Socks5HandshakeState::Failed);
    }

    #[test]
    fn out_of_order() {
        let host = Host::classify("example.com");
        let mut hs = Socks5Handshake::new(&host, 80);
        let e = hs.recv_method_reply([0x05, 0x00]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::InvalidState(Socks5HandshakeState::Start)
        ));
        assert_eq!(hs.state(), Socks5HandshakeState::Failed);
        let e = hs.start().unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::InvalidState(Socks5HandshakeState::Failed)
        ));

        let mut hs = acked(&host, 80);
        let e = hs.recv(&[0x05, 0x00, 0x00, 0x01]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::InvalidState(Socks5HandshakeState::MethodAcked)
        ));
    }

    #[test]
    fn wrong_read_size() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        hs.recv_reply_header([0x05, 0x00, 0x00, 0x01]).unwrap();
        hs.recv(&[]).unwrap();
        let e = hs.recv(&[127, 0, 0, 1]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::InvalidState(Socks5HandshakeState::AddressConsuming(6))
        ));
    }

    #[test]
    fn bind_addr_len_mismatch() {
        let host = Host::classify("example.com");
        let mut hs = connect_sent(&host, 80);
        hs.recv_reply_header([0x05, 0x00, 0x00, 0x01]).unwrap();
        let e = hs.recv(&[4]).unwrap_err();
        assert!(matches!(
            e,
            SocksConnectError::InvalidState(Socks5HandshakeState::ConnectReplyHeaderRead(0x01))
        ));
        assert_eq!(hs.state(), Socks5HandshakeState::Failed);

        let mut hs = connect_sent(&host, 80);
        hs.recv_reply_header([0x05, 0x00, 0x00, 0x03]).unwrap();
        assert!(hs.recv_bind_addr_len(&[]).is_err());
    }

    #[test]
    fn phase_display() {
        assert_eq!(Socks5HandshakeState::MethodSent.to_string(), "method reply");
        assert_eq!(
            Socks5HandshakeState::AddressConsuming(6).to_string(),
            "bind address"
        );
    }
}
