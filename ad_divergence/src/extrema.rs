//! Swing-low detection under a symmetric bar-count neighbourhood.

use serde::Serialize;

/// A detected local minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pivot {
    /// Position in the series.
    pub index: usize,
    pub value: f64,
}

/// Lazy iterator over the swing lows of a sequence, oldest first.
///
/// Cloning it restarts the scan from wherever the clone was taken; a fresh call
/// to [`swing_lows`] rescans from the start.
#[derive(Debug, Clone)]
pub struct SwingLows<'a> {
    values: &'a [f64],
    order: usize,
    next: usize,
}

/// Indices `i` whose value is strictly below every other value in
/// `[i - order, i + order]`.
///
/// Only indices with a complete neighbourhood are considered, so nothing within
/// `order` bars of either end is ever reported. Ties never qualify, and `NaN`
/// neither qualifies nor lets a neighbour qualify.
pub fn swing_lows(values: &[f64], order: usize) -> SwingLows<'_> {
    SwingLows {
        values,
        order,
        next: order,
    }
}

impl Iterator for SwingLows<'_> {
    type Item = Pivot;

    fn next(&mut self) -> Option<Pivot> {
        let end = self.values.len().saturating_sub(self.order);
        while self.next < end {
            let index = self.next;
            self.next += 1;
            if is_swing_low(self.values, index, self.order) {
                return Some(Pivot {
                    index,
                    value: self.values[index],
                });
            }
        }
        None
    }
}

fn is_swing_low(values: &[f64], index: usize, order: usize) -> bool {
    let value = values[index];
    values[index - order..=index + order]
        .iter()
        .enumerate()
        .all(|(offset, &other)| offset == order || value < other)
}
