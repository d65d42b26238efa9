//! "Has the target stopped?" over a sliding window of ground positions.
//!
//! Each new position goes into a fixed-size ring buffer. Once the buffer is
//! full, the minimum enclosing circle of its contents is compared against a
//! radius threshold.

mod circle;
mod detector;
mod history;

pub use circle::{min_enclosing_circle, EnclosingCircle};
pub use detector::{StabilityDecision, StabilityDetector, StabilityParams, StabilityParamsError};
pub use history::PositionHistory;
