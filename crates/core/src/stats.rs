// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bandwidth sample read back from an appliance.

use serde::{Deserialize, Serialize};

/// One traffic sample, opaque to the automaton.
///
/// `ReadStats` passes it unmodified to the bandwidth callback; only the
/// reporting layer interprets the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthSample {
    pub bytes_in: u64,
    pub bytes_out: u64,
}
