/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use url::Url;
use yaml_rust::Yaml;

use burrow_types::net::{Proxy, Socks5Proxy};

fn as_url(v: &Yaml) -> anyhow::Result<Url> {
    if let Yaml::String(s) = v {
        Url::parse(s.trim()).map_err(|e| anyhow!("invalid url string {s}: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'url' should be 'string'"))
    }
}

/// Parse a proxy url, any scheme other than socks5 / socks5h is an http proxy.
fn as_proxy(v: &Yaml) -> anyhow::Result<Proxy> {
    let url = as_url(v)?;
    Proxy::try_from(&url).context(format!("invalid proxy url {url}"))
}

pub fn as_socks5_proxy(v: &Yaml) -> anyhow::Result<Socks5Proxy> {
    match as_proxy(v)? {
        Proxy::Socks5(p) => Ok(p),
        Proxy::Http(p) => Err(anyhow!("{} is not a socks5 proxy url", p.url())),
    }
}
