/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::anyhow;
use humanize_rs::ParseError;
use yaml_rust::Yaml;

fn secs_from_f64(s: &str) -> anyhow::Result<Duration> {
    let f = s
        .parse::<f64>()
        .map_err(|e| anyhow!("invalid float seconds {s}: {e}"))?;
    Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
}

/// Parse a duration like `10s`, `1m30s`, or plain seconds.
pub fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(s) => match humanize_rs::duration::parse(s) {
            Ok(d) => Ok(d),
            Err(ParseError::MissingUnit) => match s.parse::<u64>() {
                Ok(secs) => Ok(Duration::from_secs(secs)),
                Err(_) => Err(anyhow!("invalid duration string {s}")),
            },
            Err(e) => Err(anyhow!("invalid humanize duration string {s}: {e}")),
        },
        Yaml::Integer(i) => {
            let secs = u64::try_from(*i).map_err(|_| anyhow!("negative duration {i}"))?;
            Ok(Duration::from_secs(secs))
        }
        Yaml::Real(s) => secs_from_f64(s),
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' / 'integer' / 'real'"
        )),
    }
}
