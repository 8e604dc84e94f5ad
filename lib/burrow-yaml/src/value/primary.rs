/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use yaml_rust::Yaml;

pub fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::Integer(i) => Ok(*i != 0),
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_value() {
        assert!(as_bool(&Yaml::Boolean(true)).unwrap());
        assert!(as_bool(&yaml_str!("On")).unwrap());
        assert!(!as_bool(&yaml_str!("no")).unwrap());
        assert!(!as_bool(&Yaml::Integer(0)).unwrap());
        assert!(as_bool(&yaml_str!("maybe")).is_err());
        assert!(as_bool(&Yaml::Null).is_err());
    }
}
