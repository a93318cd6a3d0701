//! Spans of gb-io feature locations and the reverse conversion.

use crate::sequence_record::Direction;
use gb_io::seq::Location;
use itertools::Itertools;

/// One contiguous piece of a location, 0-based half-open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub reverse: bool,
}

/// The single span a feature is drawn over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocationSpan {
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
}

/// Collects the segments of `location` in the order they are transcribed.
///
/// A complement reverses the order of its parts and flips their strand.
pub fn collect_location_segments(location: &Location, segments: &mut Vec<Segment>) {
    match location {
        Location::Range((from, _), (to, _)) | Location::Between(from, to) => {
            if *from < 0 || *to < 0 {
                return;
            }
            let (from, to) = (*from as usize, *to as usize);
            segments.push(Segment {
                start: from.min(to),
                end: from.max(to),
                reverse: false,
            });
        }
        Location::Complement(inner) => {
            let mut inner_segments = vec![];
            collect_location_segments(inner, &mut inner_segments);
            segments.extend(inner_segments.into_iter().rev().map(|segment| Segment {
                reverse: !segment.reverse,
                ..segment
            }));
        }
        Location::Join(parts)
        | Location::Order(parts)
        | Location::Bond(parts)
        | Location::OneOf(parts) => {
            for part in parts {
                collect_location_segments(part, segments);
            }
        }
        Location::External(_, maybe_loc) => {
            if let Some(loc) = maybe_loc {
                collect_location_segments(loc, segments);
            }
        }
        Location::Gap(_) => {}
    }
}

/// True if consecutive segments run off the end of the sequence and continue at 0.
fn crosses_origin(segments: &[Segment], seq_len: usize) -> bool {
    seq_len > 0
        && segments.iter().tuple_windows().any(|(prev, next)| {
            prev.reverse == next.reverse
                && if prev.reverse {
                    prev.start == 0 && next.end == seq_len
                } else {
                    prev.end == seq_len && next.start == 0
                }
        })
}

/// Reduces a location to one span on a sequence of `seq_len` bases.
///
/// Most segments decide the direction. A location that crosses the origin
/// spans the complement of its widest gap, giving `start > end`; any other
/// location spans from its lowest to its highest coordinate.
pub fn location_span(location: &Location, seq_len: usize) -> Option<LocationSpan> {
    let mut segments = vec![];
    collect_location_segments(location, &mut segments);
    if segments.is_empty() {
        return None;
    }
    let reverse = segments.iter().filter(|segment| segment.reverse).count();
    let direction = if reverse * 2 > segments.len() {
        Direction::Reverse
    } else {
        Direction::Forward
    };

    if crosses_origin(&segments, seq_len) {
        let (end, start) = segments
            .iter()
            .sorted_by_key(|segment| (segment.start, segment.end))
            .tuple_windows()
            .max_by_key(|(before, after)| after.start.saturating_sub(before.end))
            .map(|(before, after)| (before.end, after.start))?;
        return Some(LocationSpan {
            start,
            end,
            direction,
        });
    }

    Some(LocationSpan {
        start: segments.iter().map(|segment| segment.start).min()?,
        end: segments.iter().map(|segment| segment.end).max()?,
        direction,
    })
}

/// Builds the gb-io location of a half-open span, splitting ranges that wrap the origin.
pub fn to_gb_location(start: usize, end: usize, direction: Direction, seq_len: usize) -> Location {
    let (start, end, seq_len) = (start as i64, end as i64, seq_len as i64);
    let location = if start < end {
        Location::simple_range(start, end)
    } else if end == 0 || seq_len == 0 {
        Location::simple_range(start, seq_len.max(start + 1))
    } else {
        Location::Join(vec![
            Location::simple_range(start, seq_len),
            Location::simple_range(0, end),
        ])
    };
    match direction {
        Direction::Reverse => Location::Complement(Box::new(location)),
        _ => location,
    }
}
