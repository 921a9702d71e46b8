/// A half-open range `[start, end)` of metadata indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

/// Ordered, disjoint, non-touching intervals over the circular index space `[0, size)`.
///
/// Used to track which metadata indices were already claimed by revealed batches, without
/// ever storing the per-item assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntervalSet {
    size: u64,
    ranges: Vec<Interval>,
}

impl IntervalSet {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            ranges: vec![],
        }
    }

    /// Number of positions covered by the set.
    pub fn covered(&self) -> u64 {
        self.ranges.iter().map(|r| r.end - r.start).sum()
    }

    pub fn contains(&self, position: u64) -> bool {
        self.ranges
            .iter()
            .any(|r| r.start <= position && position < r.end)
    }

    /// Inserts `[start, end)`, merging it with every interval it overlaps or touches.
    /// Any part that extends past the end of the index space is wrapped around and inserted
    /// as `[0, end - size)`. Returns the number of live intervals afterwards.
    pub fn insert_merge(&mut self, start: u64, end: u64) -> usize {
        let mut pending = vec![(start, end)];

        while let Some((mut start, mut end)) = pending.pop() {
            if end > self.size {
                pending.push((0, end - self.size));
                end = self.size;
            }
            if start >= end {
                continue;
            }

            // first interval that ends at or after the new start can touch it
            let first = self.ranges.partition_point(|r| r.end < start);
            let mut last = first;
            while last < self.ranges.len() && self.ranges[last].start <= end {
                start = start.min(self.ranges[last].start);
                end = end.max(self.ranges[last].end);
                last += 1;
            }

            self.ranges
                .splice(first..last, std::iter::once(Interval { start, end }));
        }

        self.ranges.len()
    }

    /// Returns the `offset`-th position (0-based) not covered by the set, counting from 0 and
    /// wrapping around once past the end of the index space.
    ///
    /// The walk visits the intervals twice, so any `offset` smaller than twice the number of
    /// free positions resolves to a free position.
    pub fn locate_free(&self, offset: u64) -> u64 {
        let mut remaining = offset;
        let mut id = 0u64;

        for _round in 0..2 {
            for range in &self.ranges {
                if id < range.start {
                    if id + remaining < range.start {
                        return id + remaining;
                    }
                    remaining -= range.start - id;
                    id = range.end;
                } else if id < range.end {
                    id = range.end;
                }
            }

            if id + remaining >= self.size {
                remaining -= self.size - id;
                id = 0;
            }
        }

        id + remaining
    }

    /// End of the free gap that starts at the free position `position`: the start of the next
    /// interval, or the end of the index space.
    pub fn gap_end(&self, position: u64) -> u64 {
        self.ranges
            .iter()
            .find(|r| r.start > position)
            .map(|r| r.start)
            .unwrap_or(self.size)
    }

    /// First free position at or after `position`, wrapping around past the end of the
    /// index space. Returns `None` when the whole space is covered.
    pub fn next_free_from(&self, position: u64) -> Option<u64> {
        if self.covered() >= self.size {
            return None;
        }

        let mut position = if position >= self.size { 0 } else { position };
        // intervals are merged, so at most one hop before and one after the wrap
        for _ in 0..2 {
            match self
                .ranges
                .iter()
                .find(|r| r.start <= position && position < r.end)
            {
                None => return Some(position),
                Some(range) => {
                    position = range.end;
                    if position >= self.size {
                        position = 0;
                    }
                }
            }
        }

        (!self.contains(position)).then_some(position)
    }

    /// Reserves `count` consecutive free positions starting with the `offset`-th free one,
    /// following the same cyclic order as [`IntervalSet::locate_free`]. Each contiguous run of
    /// free positions is inserted as one interval, so when no existing interval interrupts
    /// the span this is a single `[start, start + count)` insertion.
    pub fn claim(&mut self, offset: u64, count: u64) {
        if count == 0 {
            return;
        }

        let mut position = self.locate_free(offset);
        let mut remaining = count;

        while remaining > 0 {
            let run = (self.gap_end(position) - position).min(remaining);
            self.insert_merge(position, position + run);
            remaining -= run;

            if remaining > 0 {
                match self.next_free_from(position + run) {
                    Some(next) => position = next,
                    None => return,
                }
            }
        }
    }
}
