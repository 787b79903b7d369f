// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the command line to the detection crate.
//
// `files` owns the scan folder conventions, `cutter` runs detection and the
// concurrent extraction of each scan.

pub mod cutter;
pub mod files;
