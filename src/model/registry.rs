use tracing::debug;

use crate::common::collections::HashMap;
use crate::controller::SwitcherState;
use crate::error::SwitcherError;
use crate::model::card::{AppInfo, AppOrigin, CardRecord, ThumbnailRef};

/// Ordered list of card records backing the visible strip.
///
/// Invariant: `order_index` values are the contiguous permutation `[0, N)`
/// in visual order. Every mutation restores it before returning; layout
/// reads that follow a mutation always observe a consistent ordering.
#[derive(Debug, Default)]
pub struct CardRegistry {
    records: Vec<CardRecord>,
    positions: HashMap<AppOrigin, usize>,
    /// Set while a reorder gesture holds a card; guards `reset`.
    sorting: Option<AppOrigin>,
}

impl CardRegistry {
    pub fn new() -> Self { Self::default() }

    /// Rebuild all records from scratch in the given order. Rejected while
    /// a reorder gesture is in flight.
    pub fn reset(
        &mut self,
        apps: impl IntoIterator<Item = (AppOrigin, AppInfo)>,
    ) -> Result<(), SwitcherError> {
        if self.sorting.is_some() {
            return Err(SwitcherError::InvalidState(SwitcherState::Sorting));
        }
        self.records = apps
            .into_iter()
            .enumerate()
            .map(|(idx, (origin, info))| CardRecord::new(origin, info, idx))
            .collect();
        self.reindex();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.positions.clear();
        self.sorting = None;
    }

    pub fn count(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn at(&self, index: usize) -> Option<&CardRecord> { self.records.get(index) }

    pub fn position_of(&self, origin: &AppOrigin) -> Option<usize> {
        self.positions.get(origin).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardRecord> { self.records.iter() }

    pub fn origins(&self) -> Vec<AppOrigin> {
        self.records.iter().map(|r| r.origin.clone()).collect()
    }

    /// Remove the record at `index`, shifting later indices down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<CardRecord, SwitcherError> {
        if index >= self.records.len() {
            return Err(SwitcherError::NotFound);
        }
        let removed = self.records.remove(index);
        if self.sorting.as_ref() == Some(&removed.origin) {
            self.sorting = None;
        }
        self.reindex();
        debug!(origin = %removed.origin, index, "removed card");
        Ok(removed)
    }

    /// Relocate a record so it ends up before the record currently at
    /// `target_index`; `target_index == count` appends. The target is
    /// resolved on the list as it stands, dragged record included, matching
    /// how the strip's visual order moves an element. Moving a record
    /// before itself is a no-op.
    pub fn move_before(
        &mut self,
        origin: &AppOrigin,
        target_index: usize,
    ) -> Result<(), SwitcherError> {
        let from = self.position_of(origin).ok_or(SwitcherError::NotFound)?;
        if target_index > self.records.len() {
            return Err(SwitcherError::OutOfBounds {
                index: target_index,
                count: self.records.len(),
            });
        }
        if target_index == from || target_index == from + 1 {
            return Ok(());
        }
        let record = self.records.remove(from);
        let insert_at = if target_index > from { target_index - 1 } else { target_index };
        self.records.insert(insert_at, record);
        self.reindex();
        debug!(%origin, target_index, "reordered card");
        Ok(())
    }

    pub fn set_thumbnail(
        &mut self,
        origin: &AppOrigin,
        thumbnail: ThumbnailRef,
    ) -> Result<(), SwitcherError> {
        let index = self.position_of(origin).ok_or(SwitcherError::NotFound)?;
        self.records[index].thumbnail = Some(thumbnail);
        Ok(())
    }

    /// Mark `origin` as held by a reorder gesture.
    pub fn begin_sort(&mut self, origin: &AppOrigin) -> Result<(), SwitcherError> {
        if self.position_of(origin).is_none() {
            return Err(SwitcherError::NotFound);
        }
        self.sorting = Some(origin.clone());
        Ok(())
    }

    pub fn end_sort(&mut self) { self.sorting = None; }

    pub fn sorting(&self) -> Option<&AppOrigin> { self.sorting.as_ref() }

    fn reindex(&mut self) {
        self.positions.clear();
        for (idx, record) in self.records.iter_mut().enumerate() {
            record.order_index = idx;
            self.positions.insert(record.origin.clone(), idx);
        }
        debug_assert!(self.records.iter().enumerate().all(|(i, r)| r.order_index == i));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn app(name: &str) -> (AppOrigin, AppInfo) {
        (
            AppOrigin::from(name),
            AppInfo {
                name: name.to_string(),
                icons: Vec::new(),
                launch_time_ms: 0,
            },
        )
    }

    fn registry(names: &[&str]) -> CardRegistry {
        let mut reg = CardRegistry::new();
        reg.reset(names.iter().map(|n| app(n))).unwrap();
        reg
    }

    fn order(reg: &CardRegistry) -> Vec<&str> {
        reg.iter().map(|r| r.origin.as_str()).collect()
    }

    #[test]
    fn reset_builds_contiguous_order() {
        let reg = registry(&["a", "b", "c"]);
        assert_eq!(reg.count(), 3);
        let indices: Vec<usize> = reg.iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(reg.position_of(&AppOrigin::from("b")), Some(1));
    }

    #[test]
    fn reset_of_zero_apps_is_fine() {
        let reg = registry(&[]);
        assert_eq!(reg.count(), 0);
        assert!(reg.at(0).is_none());
    }

    #[test]
    fn remove_shifts_later_indices_down() {
        let mut reg = registry(&["a", "b", "c", "d"]);
        let removed = reg.remove_at(1).unwrap();
        assert_eq!(removed.origin.as_str(), "b");
        assert_eq!(order(&reg), vec!["a", "c", "d"]);
        let indices: Vec<usize> = reg.iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn remove_out_of_range_is_not_found() {
        let mut reg = registry(&["a"]);
        assert_eq!(reg.remove_at(1), Err(SwitcherError::NotFound));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn move_before_reorders_and_renumbers() {
        let mut reg = registry(&["a", "b", "c", "d"]);
        // Drag "a" so it lands before the record currently at index 3.
        reg.move_before(&AppOrigin::from("a"), 3).unwrap();
        assert_eq!(order(&reg), vec!["b", "c", "a", "d"]);
        let indices: Vec<usize> = reg.iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn move_before_end_appends() {
        let mut reg = registry(&["a", "b", "c"]);
        reg.move_before(&AppOrigin::from("a"), 3).unwrap();
        assert_eq!(order(&reg), vec!["b", "c", "a"]);
    }

    #[test]
    fn move_before_self_is_noop() {
        let mut reg = registry(&["a", "b", "c"]);
        reg.move_before(&AppOrigin::from("b"), 1).unwrap();
        assert_eq!(order(&reg), vec!["a", "b", "c"]);
        // Inserting before one's own successor is equally a no-op.
        reg.move_before(&AppOrigin::from("b"), 2).unwrap();
        assert_eq!(order(&reg), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_before_unknown_origin_is_not_found() {
        let mut reg = registry(&["a"]);
        assert_eq!(
            reg.move_before(&AppOrigin::from("zzz"), 0),
            Err(SwitcherError::NotFound)
        );
    }

    #[test]
    fn move_before_past_end_is_out_of_bounds() {
        let mut reg = registry(&["a", "b"]);
        assert_eq!(
            reg.move_before(&AppOrigin::from("a"), 5),
            Err(SwitcherError::OutOfBounds { index: 5, count: 2 })
        );
    }

    #[test]
    fn reset_rejected_while_sorting() {
        let mut reg = registry(&["a", "b"]);
        reg.begin_sort(&AppOrigin::from("a")).unwrap();
        assert_eq!(
            reg.reset([app("x")]),
            Err(SwitcherError::InvalidState(SwitcherState::Sorting))
        );
        reg.end_sort();
        reg.reset([app("x")]).unwrap();
        assert_eq!(order(&reg), vec!["x"]);
    }

    #[test]
    fn removing_sorted_card_clears_marker() {
        let mut reg = registry(&["a", "b"]);
        reg.begin_sort(&AppOrigin::from("b")).unwrap();
        reg.remove_at(1).unwrap();
        assert!(reg.sorting().is_none());
    }

    #[test]
    fn set_thumbnail_targets_one_card() {
        let mut reg = registry(&["a", "b"]);
        reg.set_thumbnail(&AppOrigin::from("b"), ThumbnailRef("data:...".into())).unwrap();
        assert!(reg.at(0).unwrap().thumbnail.is_none());
        assert_eq!(
            reg.at(1).unwrap().thumbnail,
            Some(ThumbnailRef("data:...".into()))
        );
        assert_eq!(
            reg.set_thumbnail(&AppOrigin::from("gone"), ThumbnailRef(String::new())),
            Err(SwitcherError::NotFound)
        );
    }
}
