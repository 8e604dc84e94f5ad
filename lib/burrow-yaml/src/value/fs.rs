/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use yaml_rust::Yaml;

/// Get an existing regular file path, relative paths are joined to `lookup_dir`.
fn as_file_path(v: &Yaml, lookup_dir: &Path) -> anyhow::Result<PathBuf> {
    let Yaml::String(s) = v else {
        return Err(anyhow!("yaml value type for path should be string"));
    };
    let path = PathBuf::from(s);
    let path = if path.is_absolute() {
        path
    } else {
        lookup_dir.join(path)
    };
    if !path.is_file() {
        return Err(anyhow!("path {} is not a regular file", path.display()));
    }
    path.canonicalize()
        .map_err(|e| anyhow!("invalid path {}: {e:?}", path.display()))
}

fn as_absolute_path(v: &Yaml) -> anyhow::Result<PathBuf> {
    let Yaml::String(s) = v else {
        return Err(anyhow!(
            "yaml value type for absolute path should be string"
        ));
    };
    let path = PathBuf::from(s);
    if path.is_relative() {
        return Err(anyhow!(
            "invalid value: {} is not an absolute path",
            path.display()
        ));
    }
    Ok(path)
}

pub(super) fn as_file(v: &Yaml, lookup_dir: Option<&Path>) -> anyhow::Result<(File, PathBuf)> {
    let path = match lookup_dir {
        Some(dir) => as_file_path(v, dir)?,
        None => as_absolute_path(v)?,
    };
    let file =
        File::open(&path).map_err(|e| anyhow!("failed to open file({}): {e:?}", path.display()))?;
    Ok((file, path))
}
