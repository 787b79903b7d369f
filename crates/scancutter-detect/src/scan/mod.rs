// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline — edge and line detection, cardinal filtering, band
// flocking, pixel-presence filtering and rectangle assembly, driven per
// image by `ImageContext`.

pub mod assembler;
pub mod cardinal;
pub mod context;
pub mod detector;
pub mod flock;
pub mod hough;
pub mod presence;

pub use assembler::RectangleAssembler;
pub use cardinal::{CardinalLines, filter_cardinal};
pub use context::{ImageContext, Outline};
pub use detector::{EdgeMap, HoughDetector, LineDetector, RawLine};
pub use flock::{Flock, flock_lines};
pub use hough::HoughAccumulator;
pub use presence::{Axis, PresenceFilter};
