/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#![allow(dead_code)]

use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_rustls::TlsAcceptor;

use burrow_dispatch::{Dispatch, Socks5DispatcherConfigBuilder};
use burrow_types::net::{HttpProxy, RustlsClientConfigBuilder};

/// The destination a client asked the mock proxy for.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestedTarget {
    pub atyp: u8,
    pub addr: Vec<u8>,
    pub port: u16,
}

/// Serve the proxy side of a no-auth connect, replying with `rep`.
///
/// A failure reply is sent without bind address, so the client has nothing
/// left unread when it closes.
pub async fn serve_socks5_connect<S>(stream: &mut S, rep: u8) -> RequestedTarget
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    serve_socks5_connect_with(stream, |_| rep).await
}

/// Same as [`serve_socks5_connect`], with the reply code picked by target.
pub async fn serve_socks5_connect_with<S, F>(stream: &mut S, reply_for: F) -> RequestedTarget
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnOnce(&RequestedTarget) -> u8,
{
    let mut method_req = [0u8; 3];
    stream.read_exact(&mut method_req).await.unwrap();
    assert_eq!(method_req, [0x05, 0x01, 0x00]);
    stream.write_all(&[0x05, 0x00]).await.unwrap();

    let mut hdr = [0u8; 4];
    stream.read_exact(&mut hdr).await.unwrap();
    assert_eq!(&hdr[..3], &[0x05, 0x01, 0x00]);
    let addr_len = match hdr[3] {
        0x01 => 4,
        0x04 => 16,
        0x03 => stream.read_u8().await.unwrap() as usize,
        atyp => panic!("unexpected atyp {atyp}"),
    };
    let mut addr = vec![0u8; addr_len];
    stream.read_exact(&mut addr).await.unwrap();
    let port = stream.read_u16().await.unwrap();
    let target = RequestedTarget {
        atyp: hdr[3],
        addr,
        port,
    };

    let rep = reply_for(&target);
    if rep == 0x00 {
        stream
            .write_all(&[0x05, 0x00, 0x00, 0x01, 127, 0, 0, 1, 0x1f, 0x90])
            .await
            .unwrap();
    } else {
        stream.write_all(&[0x05, rep, 0x00, 0x01]).await.unwrap();
    }
    target
}

pub fn tls_acceptor(name: &str) -> (TlsAcceptor, CertificateDer<'static>) {
    let cert = rcgen::generate_simple_self_signed(vec![name.to_string()]).unwrap();
    let cert_der = cert.cert.der().clone();
    let key = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der.clone()], key.into())
        .unwrap();
    (TlsAcceptor::from(Arc::new(config)), cert_der)
}

/// A dispatcher template that trusts only `ca`.
pub fn socks5_template(ca: CertificateDer<'static>) -> Socks5DispatcherConfigBuilder {
    let mut tls = RustlsClientConfigBuilder::default();
    tls.set_ca_certificates(vec![ca]);
    tls.set_no_default_ca_certificates();
    let mut builder = Socks5DispatcherConfigBuilder::default();
    builder.set_tls_client(tls);
    builder
}

pub fn no_http(_proxy: HttpProxy) -> anyhow::Result<Arc<dyn Dispatch>> {
    Err(anyhow::anyhow!("http proxy not expected"))
}
