/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Load the first document of a yaml string, for use in tests.
#[macro_export]
macro_rules! yaml_doc {
    ($s:expr) => {
        $crate::yaml_rust::YamlLoader::load_from_str($s)
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
    };
}

/// Build a yaml string value, for use in tests.
#[macro_export]
macro_rules! yaml_str {
    ($s:expr) => {
        $crate::yaml_rust::Yaml::String($s.to_string())
    };
}
