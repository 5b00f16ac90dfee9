/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod worker;

mod thread;
pub use thread::spawn_named;

#[cfg(test)]
mod testing;
