pub mod describe;
pub mod mannwhitney;

use crate::event::{OriginTag, SessionInterval};

/// Splits matched durations by origin tag. Intervals without an origin carry
/// no tag to compare and are left out of both groups.
pub fn durations_by_origin(intervals: &[SessionInterval]) -> (Vec<f64>, Vec<f64>) {
    let mut manual: Vec<f64> = Vec::new();
    let mut auto: Vec<f64> = Vec::new();
    for interval in intervals {
        match interval.origin {
            Some(OriginTag::Manual) => manual.push(interval.duration_seconds),
            Some(OriginTag::Auto) => auto.push(interval.duration_seconds),
            None => {}
        }
    }
    (manual, auto)
}
