// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reading-order reconstruction.
//
// Boxes are bucketed into horizontal rows by their vertical centre, using a
// row height proportional to the batch's mean box height, then sorted
// row-major and left-to-right.
//
// Known limitation: a box whose centre sits just across a row boundary from
// the rest of its line lands in the neighbouring row. This is an accepted
// approximation of natural reading order.

use lingolens_core::BoundingBox;
use lingolens_core::config::OrderingConfig;

/// Row-major, left-to-right sorter.
#[derive(Debug, Clone)]
pub struct ReadingOrderSorter {
    row_height_factor: f32,
}

impl ReadingOrderSorter {
    pub fn new(config: &OrderingConfig) -> Self {
        Self {
            row_height_factor: config.row_height_factor,
        }
    }

    /// Mean `|y2 - y0|` over `boxes`, or 1.0 for an empty batch.
    pub fn average_height<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> f32 {
        let (sum, count) = boxes
            .into_iter()
            .fold((0.0f64, 0usize), |(sum, n), b| (sum + f64::from(b.height().abs()), n + 1));
        if count == 0 {
            1.0
        } else {
            (sum / count as f64) as f32
        }
    }

    /// Row bucket of `bbox` for a batch with mean box height `avg_height`.
    pub fn row_index(&self, bbox: &BoundingBox, avg_height: f32) -> i64 {
        let row_height = avg_height * self.row_height_factor;
        if row_height > 0.0 {
            (bbox.center_y() / row_height).floor() as i64
        } else {
            0
        }
    }

    /// Sort `items` into reading order. `bbox` projects each item's box.
    ///
    /// The sort is stable: items with equal `(row, x0)` keep their relative
    /// order.
    pub fn sort_by_box<T, F>(&self, items: &mut [T], bbox: F)
    where
        F: Fn(&T) -> &BoundingBox,
    {
        let avg_height = Self::average_height(items.iter().map(&bbox));
        let mut keyed: Vec<(i64, f32, usize)> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let b = bbox(item);
                (self.row_index(b, avg_height), b.x0, i)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)).then(a.2.cmp(&b.2)));

        let order: Vec<usize> = keyed.into_iter().map(|(_, _, i)| i).collect();
        apply_permutation(items, order);
    }
}

/// Reorder `items` so that position `k` holds the element formerly at `order[k]`.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..order.len() {
        let mut current = start;
        while order[current] != start {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}
