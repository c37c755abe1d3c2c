//! The assignment manager: who takes how many units of which item.
//!
//! [`AssignmentManager`] binds one [`Group`] to one [`Receipt`] and owns the
//! many-to-many mapping between them as a list of [`AssignedItem`] records
//! per participant. Records for the same participant and item are never
//! merged, each "add" creates an independently editable line.
//!
//! Nothing forces the assigned units of an item to match the purchased
//! count. Over- and under-assignment are legal states, reported through
//! [`AssignmentStatus`] and never rejected.

use std::{collections::HashMap, sync::Arc};

use crate::{
    AssignmentId, EngineError, Group, IdAllocator, Item, ItemId, Participant, ParticipantId,
    Receipt, ResultEngine,
};

/// "This participant has `assigned_count` units of `item_id`".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignedItem {
    pub id: AssignmentId,
    pub item_id: ItemId,
    pub assigned_count: u32,
}

/// How the assigned units of an item compare with the purchased ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentStatus {
    Balanced,
    /// Units bought but not yet given to anyone.
    Unassigned(u64),
    /// Units given out beyond what was bought.
    Exceeding(u64),
}

impl AssignmentStatus {
    fn compare(purchased: u64, assigned: u64) -> Self {
        match purchased.cmp(&assigned) {
            std::cmp::Ordering::Equal => Self::Balanced,
            std::cmp::Ordering::Greater => Self::Unassigned(purchased - assigned),
            std::cmp::Ordering::Less => Self::Exceeding(assigned - purchased),
        }
    }

    #[must_use]
    pub fn is_balanced(self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Assignment summary of a single item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemAssignment {
    pub item_id: ItemId,
    pub purchased: u64,
    pub assigned: u64,
    pub status: AssignmentStatus,
}

/// Binds a group to a receipt and tracks item assignments.
///
/// The receipt is shared and immutable for the whole life of the manager:
/// editing the receipt goes through [`rebind`] or [`replace_receipt`], which
/// build a new manager. The group is owned, so participants can only be
/// removed through [`remove_participant`], which also drops their
/// assignments.
///
/// [`rebind`]: AssignmentManager::rebind
/// [`replace_receipt`]: AssignmentManager::replace_receipt
/// [`remove_participant`]: AssignmentManager::remove_participant
#[derive(Clone, Debug)]
pub struct AssignmentManager {
    group: Group,
    receipt: Arc<Receipt>,
    assignments: HashMap<ParticipantId, Vec<AssignedItem>>,
}

impl AssignmentManager {
    pub fn new(group: Group, receipt: Arc<Receipt>) -> Self {
        Self {
            group,
            receipt,
            assignments: HashMap::new(),
        }
    }

    /// Swaps `self` for a brand-new manager bound to the same group and to
    /// `receipt`. The old assignments are dropped, not copied, since they
    /// refer to the old items.
    pub fn rebind(&mut self, receipt: Arc<Receipt>) {
        tracing::debug!(
            items = receipt.len(),
            dropped = self.assignments.values().map(Vec::len).sum::<usize>(),
            "receipt replaced, assignments dropped"
        );
        let group = std::mem::take(&mut self.group);
        *self = Self::new(group, receipt);
    }

    /// Consuming form of [`rebind`](Self::rebind).
    #[must_use]
    pub fn replace_receipt(mut self, receipt: Arc<Receipt>) -> Self {
        self.rebind(receipt);
        self
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// All items of the bound receipt, receipt order.
    pub fn all_items(&self) -> Vec<&Item> {
        self.receipt.items().collect()
    }

    pub fn item(&self, item_id: ItemId) -> ResultEngine<&Item> {
        self.receipt.item(item_id)
    }

    /// Current roster, insertion order.
    pub fn all_participants(&self) -> Vec<&Participant> {
        self.group.participants().collect()
    }

    pub fn add_participant(&mut self, ids: &IdAllocator, name: &str) -> ResultEngine<&Participant> {
        self.group.add(ids, name)
    }

    /// Removes a participant and every one of its assignment records.
    /// Removing an absent participant is a no-op.
    pub fn remove_participant(&mut self, participant_id: ParticipantId) -> Option<Participant> {
        let dropped = self
            .assignments
            .remove(&participant_id)
            .map_or(0, |records| records.len());
        let removed = self.group.remove(participant_id);
        if removed.is_some() {
            tracing::debug!(%participant_id, dropped, "participant removed");
        }
        removed
    }

    /// Assignment records of a participant. Unknown participants have none.
    pub fn assignments(&self, participant_id: ParticipantId) -> &[AssignedItem] {
        self.assignments
            .get(&participant_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Like [`assignments`](Self::assignments) but registers an empty list
    /// for a participant seen for the first time. Never fails.
    pub fn get_or_create_assignments(&mut self, participant_id: ParticipantId) -> &[AssignedItem] {
        self.assignments.entry(participant_id).or_default()
    }

    /// Units of an item assigned across all participants.
    pub fn total_assigned(&self, item_id: ItemId) -> u64 {
        self.assignments
            .values()
            .flatten()
            .filter(|record| record.item_id == item_id)
            .map(|record| u64::from(record.assigned_count))
            .sum()
    }

    /// Appends a new record with one unit of the item. Never merges with an
    /// existing record for the same item.
    pub fn add_assignment(
        &mut self,
        ids: &IdAllocator,
        participant_id: ParticipantId,
        item_id: ItemId,
    ) -> ResultEngine<AssignmentId> {
        self.receipt.item(item_id)?;
        self.group.get(participant_id)?;

        let id = ids.next_assignment_id();
        self.assignments
            .entry(participant_id)
            .or_default()
            .push(AssignedItem {
                id,
                item_id,
                assigned_count: 1,
            });
        tracing::debug!(%participant_id, %item_id, assignment_id = %id, "assignment added");
        Ok(id)
    }

    /// Changes the unit count of one record in place.
    pub fn set_assigned_count(
        &mut self,
        participant_id: ParticipantId,
        assignment_id: AssignmentId,
        count: u32,
    ) -> ResultEngine<()> {
        let record = self
            .assignments
            .get_mut(&participant_id)
            .and_then(|records| records.iter_mut().find(|r| r.id == assignment_id))
            .ok_or_else(|| not_found_assignment(participant_id, assignment_id))?;
        record.assigned_count = count;
        tracing::debug!(%participant_id, %assignment_id, count, "assignment count set");
        Ok(())
    }

    /// Removes records by id. Every id is checked first: if one does not
    /// belong to the participant nothing is removed.
    pub fn remove_assignments(
        &mut self,
        participant_id: ParticipantId,
        assignment_ids: &[AssignmentId],
    ) -> ResultEngine<Vec<AssignedItem>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self
            .assignments
            .get_mut(&participant_id)
            .ok_or_else(|| not_found_assignment(participant_id, assignment_ids[0]))?;
        if let Some(missing) = assignment_ids
            .iter()
            .find(|id| !records.iter().any(|r| r.id == **id))
        {
            return Err(not_found_assignment(participant_id, *missing));
        }

        let (removed, kept): (Vec<_>, Vec<_>) = records
            .drain(..)
            .partition(|r| assignment_ids.contains(&r.id));
        *records = kept;
        tracing::debug!(%participant_id, removed = removed.len(), "assignments removed");
        Ok(removed)
    }

    /// Removes records by position in the participant's list, as the list is
    /// before the call. Duplicated positions count once. If any position is
    /// out of range, or the participant has no records, nothing is removed.
    pub fn remove_assignments_at(
        &mut self,
        participant_id: ParticipantId,
        positions: &[usize],
    ) -> ResultEngine<Vec<AssignedItem>> {
        let mut positions = positions.to_vec();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();

        let Some(&highest) = positions.first() else {
            return Ok(Vec::new());
        };
        let not_found = || {
            EngineError::KeyNotFound(format!(
                "assignment position {highest} for participant {participant_id}"
            ))
        };
        let records = self
            .assignments
            .get_mut(&participant_id)
            .ok_or_else(not_found)?;
        if highest >= records.len() {
            return Err(not_found());
        }

        // Descending order keeps the remaining positions valid.
        let mut removed: Vec<_> = positions.iter().map(|&pos| records.remove(pos)).collect();
        removed.reverse();
        tracing::debug!(%participant_id, removed = removed.len(), "assignments removed");
        Ok(removed)
    }

    pub fn item_status(&self, item_id: ItemId) -> ResultEngine<ItemAssignment> {
        let item = self.receipt.item(item_id)?;
        Ok(self.summarize(item))
    }

    /// Assignment summary of every item, receipt order.
    pub fn item_statuses(&self) -> Vec<ItemAssignment> {
        self.receipt.items().map(|item| self.summarize(item)).collect()
    }

    /// `true` when every purchased unit is assigned exactly once.
    pub fn is_fully_assigned(&self) -> bool {
        self.receipt
            .items()
            .all(|item| self.summarize(item).status.is_balanced())
    }

    fn summarize(&self, item: &Item) -> ItemAssignment {
        let purchased = u64::from(item.purchased_count);
        let assigned = self.total_assigned(item.id);
        ItemAssignment {
            item_id: item.id,
            purchased,
            assigned,
            status: AssignmentStatus::compare(purchased, assigned),
        }
    }
}

fn not_found_assignment(participant_id: ParticipantId, assignment_id: AssignmentId) -> EngineError {
    EngineError::KeyNotFound(format!(
        "assignment {assignment_id} for participant {participant_id}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoneyCents, ReceiptRow};

    struct Fixture {
        ids: IdAllocator,
        manager: AssignmentManager,
        coffee: ItemId,
        bagel: ItemId,
    }

    fn fixture() -> Fixture {
        let ids = IdAllocator::new();
        let receipt = Receipt::from_rows(
            &ids,
            vec![
                ReceiptRow::new("Coffee", 2, MoneyCents::new(1000)),
                ReceiptRow::new("Bagel", 3, MoneyCents::new(900)),
            ],
            MoneyCents::new(2090),
        )
        .unwrap();
        let item_ids = receipt.item_ids();
        let manager = AssignmentManager::new(Group::new(), Arc::new(receipt));
        Fixture {
            ids,
            manager,
            coffee: item_ids[0],
            bagel: item_ids[1],
        }
    }

    fn add(f: &mut Fixture, name: &str) -> ParticipantId {
        f.manager.add_participant(&f.ids, name).unwrap().id
    }

    #[test]
    fn each_add_creates_a_new_record() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let first = f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();
        let second = f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();

        assert_ne!(first, second);
        let records = f.manager.assignments(alice);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.assigned_count == 1));
        assert_eq!(f.manager.total_assigned(f.coffee), 2);
    }

    #[test]
    fn add_assignment_checks_item_and_participant() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let err = f
            .manager
            .add_assignment(&f.ids, alice, ItemId::new(999))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = f
            .manager
            .add_assignment(&f.ids, ParticipantId::new(999), f.coffee)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(f.manager.total_assigned(f.coffee), 0);
    }

    #[test]
    fn get_or_create_is_stable_for_unknown_participant() {
        let mut f = fixture();
        let ghost = ParticipantId::new(42);
        assert!(f.manager.get_or_create_assignments(ghost).is_empty());
        assert!(f.manager.get_or_create_assignments(ghost).is_empty());
        assert_eq!(f.manager.assignments.len(), 1);
        assert!(f.manager.assignments(ParticipantId::new(43)).is_empty());
    }

    #[test]
    fn remove_participant_purges_records_and_is_idempotent() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let bob = add(&mut f, "Bob");
        f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();
        f.manager.add_assignment(&f.ids, bob, f.coffee).unwrap();

        assert!(f.manager.remove_participant(alice).is_some());
        assert!(f.manager.assignments(alice).is_empty());
        assert_eq!(f.manager.total_assigned(f.coffee), 1);

        let before = f.manager.clone();
        assert!(f.manager.remove_participant(alice).is_none());
        assert_eq!(f.manager.group(), before.group());
        assert_eq!(f.manager.assignments, before.assignments);
    }

    #[test]
    fn set_count_updates_in_place() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let id = f.manager.add_assignment(&f.ids, alice, f.bagel).unwrap();
        f.manager.set_assigned_count(alice, id, 3).unwrap();

        assert_eq!(f.manager.total_assigned(f.bagel), 3);
        assert!(
            f.manager
                .set_assigned_count(alice, AssignmentId::new(77), 1)
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn remove_by_id_is_all_or_nothing() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let a = f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();
        let b = f.manager.add_assignment(&f.ids, alice, f.bagel).unwrap();
        let c = f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();

        let err = f
            .manager
            .remove_assignments(alice, &[a, AssignmentId::new(500)])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(f.manager.assignments(alice).len(), 3);

        let removed = f.manager.remove_assignments(alice, &[c, a]).unwrap();
        assert_eq!(removed.len(), 2);
        let left: Vec<_> = f.manager.assignments(alice).iter().map(|r| r.id).collect();
        assert_eq!(left, vec![b]);
    }

    #[test]
    fn remove_by_position_is_immune_to_index_shift() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let ids: Vec<_> = (0..4)
            .map(|_| f.manager.add_assignment(&f.ids, alice, f.bagel).unwrap())
            .collect();

        // Ascending positions would hit the wrong records if removed one by
        // one against the shrinking list.
        let removed = f.manager.remove_assignments_at(alice, &[0, 2, 2]).unwrap();
        let removed: Vec<_> = removed.iter().map(|r| r.id).collect();
        assert_eq!(removed, vec![ids[0], ids[2]]);

        let left: Vec<_> = f.manager.assignments(alice).iter().map(|r| r.id).collect();
        assert_eq!(left, vec![ids[1], ids[3]]);

        assert!(
            f.manager
                .remove_assignments_at(alice, &[0, 2])
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(f.manager.assignments(alice).len(), 2);
    }

    #[test]
    fn remove_by_position_leaves_unknown_participants_alone() {
        let mut f = fixture();
        let ghost = ParticipantId::new(42);

        let err = f.manager.remove_assignments_at(ghost, &[0]).unwrap_err();
        assert!(err.is_not_found());
        assert!(!f.manager.assignments.contains_key(&ghost));

        assert!(f.manager.remove_assignments_at(ghost, &[]).unwrap().is_empty());
        assert!(f.manager.assignments.is_empty());
    }

    #[test]
    fn statuses_flag_under_and_over_assignment() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let id = f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();
        f.manager.set_assigned_count(alice, id, 3).unwrap();

        let coffee = f.manager.item_status(f.coffee).unwrap();
        assert_eq!(coffee.status, AssignmentStatus::Exceeding(1));
        let bagel = f.manager.item_status(f.bagel).unwrap();
        assert_eq!(bagel.status, AssignmentStatus::Unassigned(3));
        assert!(!f.manager.is_fully_assigned());

        f.manager.set_assigned_count(alice, id, 2).unwrap();
        let bagel_line = f.manager.add_assignment(&f.ids, alice, f.bagel).unwrap();
        f.manager.set_assigned_count(alice, bagel_line, 3).unwrap();
        assert!(f.manager.is_fully_assigned());
    }

    #[test]
    fn replace_receipt_keeps_group_and_drops_assignments() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();

        let receipt = Receipt::from_rows(
            &f.ids,
            vec![ReceiptRow::new("Tea", 1, MoneyCents::new(300))],
            MoneyCents::new(300),
        )
        .unwrap();
        let manager = f.manager.replace_receipt(Arc::new(receipt));

        assert_eq!(manager.all_participants().len(), 1);
        assert!(manager.assignments(alice).is_empty());
        assert!(manager.item(f.coffee).unwrap_err().is_not_found());
    }

    #[test]
    fn rebind_swaps_the_receipt_in_place() {
        let mut f = fixture();
        let alice = add(&mut f, "Alice");
        let bob = add(&mut f, "Bob");
        f.manager.add_assignment(&f.ids, alice, f.coffee).unwrap();
        f.manager.add_assignment(&f.ids, bob, f.bagel).unwrap();

        let receipt = Receipt::from_rows(
            &f.ids,
            vec![ReceiptRow::new("Tea", 1, MoneyCents::new(300))],
            MoneyCents::new(330),
        )
        .unwrap();
        f.manager.rebind(Arc::new(receipt));

        assert_eq!(f.manager.all_participants().len(), 2);
        assert!(f.manager.assignments.is_empty());
        assert_eq!(f.manager.receipt().grand_total(), MoneyCents::new(330));
        assert_eq!(f.manager.all_items()[0].name, "Tea");
        assert!(f.manager.item(f.bagel).unwrap_err().is_not_found());
    }
}
