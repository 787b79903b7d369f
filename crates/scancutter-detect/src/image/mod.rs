// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — loading and encoding, photo extraction, overlay rendering.

pub mod extract;
pub mod overlay;
pub mod processor;
