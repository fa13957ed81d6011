//! Reorder detected marker ids into keyboard-strip order.
//!
//! Markers are printed in pairs (top and bottom edge) at every octave
//! boundary, numbered left to right. Sorting the detections by id therefore
//! recovers their physical layout regardless of detection order.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Default number of id slots (ids `0..25`).
pub const DEFAULT_ID_CAPACITY: usize = 25;

/// Largest id table the sorter allocates (the biggest standard ArUco
/// dictionaries hold 1000 ids).
pub const MAX_ID_CAPACITY: usize = 1000;

/// One sorted marker: its id and its index in the detector output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedEntry {
    pub id: u32,
    pub detection_index: usize,
}

/// Detected ids in ascending id order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedIds {
    entries: Vec<SortedEntry>,
    min_id: Option<u32>,
    dropped: Vec<u32>,
    capacity: usize,
}

impl SortedIds {
    /// Sort `ids` (given in detection order) through a `capacity`-slot table.
    ///
    /// Ids `>= capacity` are dropped. When an id is detected twice the later
    /// detection wins its slot. `capacity` is clamped to [`MAX_ID_CAPACITY`].
    pub fn sort(ids: &[u32], capacity: usize) -> Self {
        let capacity = capacity.min(MAX_ID_CAPACITY);
        let mut slots: Vec<Option<usize>> = vec![None; capacity];
        let mut dropped = Vec::new();
        let mut min_id: Option<u32> = None;

        for (detection_index, &id) in ids.iter().enumerate() {
            let Some(slot) = slots.get_mut(id as usize) else {
                warn!("dropping marker id {id}: outside the {capacity}-slot id table");
                dropped.push(id);
                continue;
            };
            if let Some(previous) = slot.replace(detection_index) {
                debug!("marker id {id} detected twice (indices {previous} and {detection_index})");
            }
            min_id = Some(min_id.map_or(id, |m| m.min(id)));
        }

        let entries = slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| {
                slot.map(|detection_index| SortedEntry {
                    id: id as u32,
                    detection_index,
                })
            })
            .collect();

        Self {
            entries,
            min_id,
            dropped,
            capacity,
        }
    }

    #[inline]
    pub fn entries(&self) -> &[SortedEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest valid id seen, which selects the starting octave.
    #[inline]
    pub fn min_id(&self) -> Option<u32> {
        self.min_id
    }

    /// Ids rejected by the bounds check, in detection order.
    #[inline]
    pub fn dropped_ids(&self) -> &[u32] {
        &self.dropped
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Flat layout: detection indices in id order, followed by the minimum id
    /// (or `capacity` when nothing valid was seen).
    pub fn to_layout(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.entries.iter().map(|e| e.detection_index).collect();
        out.push(self.min_id.map_or(self.capacity, |m| m as usize));
        out
    }

    /// Quartets of consecutive entries, stepping by two: one per octave
    /// segment between two marker-pair boundaries.
    pub fn segments(&self) -> impl Iterator<Item = [SortedEntry; 4]> + '_ {
        let e = &self.entries;
        (0..e.len().saturating_sub(3))
            .step_by(2)
            .map(move |i| [e[i], e[i + 1], e[i + 2], e[i + 3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_record_detection_order() {
        let sorted = SortedIds::sort(&[4, 0, 3, 1], DEFAULT_ID_CAPACITY);
        let ids: Vec<u32> = sorted.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 3, 4]);
        assert_eq!(sorted.to_layout(), vec![1, 3, 2, 0, 0]);
        assert_eq!(sorted.min_id(), Some(0));
    }

    #[test]
    fn layout_length_is_valid_ids_plus_one() {
        let cases: [&[u32]; 4] = [&[], &[7], &[2, 9, 5, 3, 8], &[24, 0, 12]];
        for ids in cases {
            let sorted = SortedIds::sort(ids, DEFAULT_ID_CAPACITY);
            assert_eq!(sorted.to_layout().len(), ids.len() + 1, "ids {ids:?}");
        }
    }

    #[test]
    fn out_of_range_ids_are_dropped() {
        let sorted = SortedIds::sort(&[3, 25, 2, 100], DEFAULT_ID_CAPACITY);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted.dropped_ids(), &[25, 100]);
        assert_eq!(sorted.min_id(), Some(2));
        assert_eq!(sorted.to_layout(), vec![2, 0, 2]);
    }

    #[test]
    fn empty_input_uses_capacity_sentinel() {
        let sorted = SortedIds::sort(&[40], 10);
        assert!(sorted.is_empty());
        assert_eq!(sorted.min_id(), None);
        assert_eq!(sorted.to_layout(), vec![10]);
    }

    #[test]
    fn oversized_capacity_is_clamped() {
        let sorted = SortedIds::sort(&[3, 999, 1000, 5000], usize::MAX);
        assert_eq!(sorted.capacity(), MAX_ID_CAPACITY);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted.dropped_ids(), &[1000, 5000]);
    }

    #[test]
    fn duplicate_id_keeps_latest_detection() {
        let sorted = SortedIds::sort(&[5, 6, 5], DEFAULT_ID_CAPACITY);
        assert_eq!(
            sorted.entries(),
            &[
                SortedEntry {
                    id: 5,
                    detection_index: 2
                },
                SortedEntry {
                    id: 6,
                    detection_index: 1
                },
            ]
        );
    }

    #[test]
    fn segments_step_by_marker_pairs() {
        let sorted = SortedIds::sort(&[0, 1, 2, 3, 4, 5, 6], DEFAULT_ID_CAPACITY);
        let firsts: Vec<u32> = sorted.segments().map(|s| s[0].id).collect();
        assert_eq!(firsts, vec![0, 2]);

        let three = SortedIds::sort(&[0, 1, 2], DEFAULT_ID_CAPACITY);
        assert_eq!(three.segments().count(), 0);
    }
}
