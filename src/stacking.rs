//! Packs ranged elements into display rows without overlaps.

use crate::{
    restriction_enzyme::CutSite,
    search::SearchResult,
    sequence_record::{Annotation, Direction},
};

/// Anything that occupies `start..end` on a sequence.
///
/// `start > end` means the element wraps through the origin.
pub trait Ranged {
    fn start(&self) -> usize;
    fn end(&self) -> usize;
    fn direction(&self) -> Direction;
    fn id(&self) -> &str;
}

impl Ranged for Annotation {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Ranged for CutSite {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Ranged for SearchResult {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn id(&self) -> &str {
        ""
    }
}

/// Half-open, non-wrapping pieces covered by an element.
fn segments(start: usize, end: usize, seq_len: usize) -> Vec<(usize, usize)> {
    let (start, end) = if seq_len > 0 {
        (start % seq_len, end % seq_len)
    } else {
        (start, end)
    };
    if start == end {
        return vec![(start, start + 1)];
    }
    if start < end {
        return vec![(start, end)];
    }
    let mut ret = vec![(start, seq_len.max(start + 1))];
    if end > 0 {
        ret.push((0, end));
    }
    ret
}

fn overlaps(a: &[(usize, usize)], b: &[(usize, usize)]) -> bool {
    a.iter()
        .any(|&(a_start, a_end)| b.iter().any(|&(b_start, b_end)| a_start < b_end && b_start < a_end))
}

/// Stacks `elements` into rows so that no two elements in a row overlap.
///
/// Elements are ordered by `(start, end, direction, id)` and placed first-fit,
/// so the rows only depend on the set of elements given.
pub fn stack_elements<T: Ranged + Clone>(elements: &[T], seq_len: usize) -> Vec<Vec<T>> {
    let mut sorted: Vec<&T> = elements.iter().collect();
    sorted.sort_by(|a, b| {
        a.start()
            .cmp(&b.start())
            .then(a.end().cmp(&b.end()))
            .then(a.direction().cmp(&b.direction()))
            .then(a.id().cmp(b.id()))
    });

    let mut rows: Vec<Vec<T>> = vec![];
    let mut occupied: Vec<Vec<(usize, usize)>> = vec![];
    for element in sorted {
        let pieces = segments(element.start(), element.end(), seq_len);
        match occupied.iter().position(|row| !overlaps(row, &pieces)) {
            Some(idx) => {
                occupied[idx].extend(pieces);
                rows[idx].push(element.clone());
            }
            None => {
                occupied.push(pieces);
                rows.push(vec![element.clone()]);
            }
        }
    }
    rows
}
