/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[doc(hidden)]
pub use yaml_rust;

#[macro_use]
mod macros;

mod hash;

pub mod humanize;
pub mod key;
pub mod value;

pub use hash::foreach_kv;
