// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::VehicleId;

/// Rows marked for bulk delete. Independent of the editing session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    ids: BTreeSet<VehicleId>,
}

impl SelectionSet {
    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: VehicleId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Selects every visible id, or clears the set when all of them are
    /// already selected.
    pub fn toggle_all(&mut self, visible: &[VehicleId]) {
        let all_selected = !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id));
        if all_selected {
            self.ids.clear();
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }

    pub fn deselect(&mut self, id: VehicleId) -> bool {
        self.ids.remove(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn retain(&mut self, mut keep: impl FnMut(VehicleId) -> bool) {
        self.ids.retain(|id| keep(*id));
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<VehicleId> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionSet;
    use crate::VehicleId;

    fn ids(values: &[i64]) -> Vec<VehicleId> {
        values.iter().copied().map(VehicleId::new).collect()
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = SelectionSet::default();
        assert!(selection.toggle(VehicleId::new(3)));
        assert!(selection.contains(VehicleId::new(3)));
        assert!(!selection.toggle(VehicleId::new(3)));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_all_selects_visible_then_clears() {
        let mut selection = SelectionSet::default();
        selection.toggle(VehicleId::new(2));

        selection.toggle_all(&ids(&[1, 2, 5]));
        assert_eq!(selection.ids(), ids(&[1, 2, 5]));

        selection.toggle_all(&ids(&[1, 2, 5]));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_all_with_no_visible_rows_keeps_selection() {
        let mut selection = SelectionSet::default();
        selection.toggle(VehicleId::new(4));
        selection.toggle_all(&[]);
        assert_eq!(selection.ids(), ids(&[4]));
    }

    #[test]
    fn retain_drops_unknown_ids() {
        let mut selection = SelectionSet::default();
        selection.toggle_all(&ids(&[1, 2, 3]));
        selection.retain(|id| id.get() != 2);
        assert_eq!(selection.ids(), ids(&[1, 3]));
    }
}
