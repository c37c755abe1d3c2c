use std::sync::Arc;

use engine::{
    AssignmentManager, AssignmentStatus, EngineError, Group, IdAllocator, ItemId, MoneyCents,
    ParticipantId, Receipt, ReceiptRow, generate_report,
};

fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}

fn manager_with(ids: &IdAllocator, rows: Vec<ReceiptRow>, grand_total: i64) -> AssignmentManager {
    let receipt = Receipt::from_rows(ids, rows, cents(grand_total)).unwrap();
    AssignmentManager::new(Group::new(), Arc::new(receipt))
}

fn coffee_receipt(ids: &IdAllocator) -> (AssignmentManager, ItemId) {
    let manager = manager_with(ids, vec![ReceiptRow::new("Coffee", 2, cents(10_00))], 11_00);
    let coffee = manager.all_items()[0].id;
    (manager, coffee)
}

fn assign(
    manager: &mut AssignmentManager,
    ids: &IdAllocator,
    participant: ParticipantId,
    item: ItemId,
    count: u32,
) {
    let line = manager.add_assignment(ids, participant, item).unwrap();
    manager.set_assigned_count(participant, line, count).unwrap();
}

#[test]
fn single_participant_pays_service_charge() {
    let ids = IdAllocator::new();
    let (mut manager, coffee) = coffee_receipt(&ids);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    assign(&mut manager, &ids, alice, coffee, 2);

    let report = generate_report(&manager).unwrap();
    let alice = report.participant(alice).unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.subtotal, cents(10_00));
    assert_eq!(alice.grand_total, cents(11_00));
    assert_eq!(alice.others, cents(1_00));
    assert_eq!(alice.lines.len(), 1);
    assert_eq!(alice.lines[0].unit_price, cents(5_00));
    assert_eq!(alice.lines[0].line_total, cents(10_00));
    assert!(report.is_balanced());
}

#[test]
fn two_participants_split_evenly() {
    let ids = IdAllocator::new();
    let (mut manager, coffee) = coffee_receipt(&ids);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let bob = manager.add_participant(&ids, "Bob").unwrap().id;
    manager.add_assignment(&ids, alice, coffee).unwrap();
    manager.add_assignment(&ids, bob, coffee).unwrap();

    let report = generate_report(&manager).unwrap();
    for participant in &report.participants {
        assert_eq!(participant.subtotal, cents(5_00));
        assert_eq!(participant.grand_total, cents(5_50));
        assert_eq!(participant.others, cents(50));
    }
    assert_eq!(report.total_grand_total(), cents(11_00));
    assert_eq!(report.total_subtotal(), report.receipt_subtotal);
}

#[test]
fn over_assignment_is_flagged_but_reported() {
    let ids = IdAllocator::new();
    let (mut manager, coffee) = coffee_receipt(&ids);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    assign(&mut manager, &ids, alice, coffee, 3);

    assert_eq!(manager.total_assigned(coffee), 3);
    assert_eq!(
        manager.item_status(coffee).unwrap().status,
        AssignmentStatus::Exceeding(1)
    );

    let report = generate_report(&manager).unwrap();
    let alice = report.participant(alice).unwrap();
    assert_eq!(alice.subtotal, cents(15_00));
    assert_eq!(alice.grand_total, cents(16_50));
    assert_eq!(report.unassigned.len(), 1);
    assert!(!report.is_balanced());
}

#[test]
fn zero_subtotal_cannot_be_apportioned() {
    let ids = IdAllocator::new();
    let mut manager = manager_with(&ids, vec![ReceiptRow::new("Water", 1, cents(0))], 0);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let water = manager.all_items()[0].id;
    manager.add_assignment(&ids, alice, water).unwrap();

    let err = generate_report(&manager).unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("cannot apportion totals: receipt subtotal is zero".to_string())
    );

    let empty = manager_with(&ids, Vec::new(), 0);
    assert!(generate_report(&empty).unwrap_err().is_validation());
}

#[test]
fn discount_gives_negative_others() {
    let ids = IdAllocator::new();
    let mut manager = manager_with(
        &ids,
        vec![
            ReceiptRow::new("Pizza", 2, cents(24_00)),
            ReceiptRow::new("Beer", 4, cents(16_00)),
        ],
        36_00,
    );
    let items: Vec<_> = manager.all_items().iter().map(|i| i.id).collect();
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let bob = manager.add_participant(&ids, "Bob").unwrap().id;
    assign(&mut manager, &ids, alice, items[0], 1);
    assign(&mut manager, &ids, alice, items[1], 1);
    assign(&mut manager, &ids, bob, items[0], 1);
    assign(&mut manager, &ids, bob, items[1], 3);

    let report = generate_report(&manager).unwrap();
    let alice = report.participant(alice).unwrap();
    let bob = report.participant(bob).unwrap();
    // Alice: 12 + 4 = 16 of 40 -> 14.40; Bob: 12 + 12 = 24 of 40 -> 21.60.
    assert_eq!(alice.subtotal, cents(16_00));
    assert_eq!(alice.grand_total, cents(14_40));
    assert_eq!(alice.others, cents(-1_60));
    assert_eq!(bob.grand_total, cents(21_60));
    assert_eq!(report.total_grand_total(), cents(36_00));
}

#[test]
fn balanced_assignment_conserves_totals_to_the_cent() {
    let ids = IdAllocator::new();
    let rows = vec![
        ReceiptRow::new("Fries", 3, cents(10_00)),
        ReceiptRow::new("Soda", 7, cents(13_93)),
        ReceiptRow::new("Burger", 1, cents(8_99)),
        ReceiptRow::new("Salad", 2, cents(11_11)),
    ];

    for grand_total in [0, 33_33, 44_03, 48_47, 51_00, 100_01] {
        let mut manager = manager_with(&ids, rows.clone(), grand_total);
        let people: Vec<_> = ["Ann", "Ben", "Cat"]
            .iter()
            .map(|name| manager.add_participant(&ids, name).unwrap().id)
            .collect();
        let items: Vec<_> = manager
            .all_items()
            .iter()
            .map(|i| (i.id, i.purchased_count))
            .collect();

        // Deal units round-robin so each participant gets an uneven mix.
        let mut turn = 0;
        for (item, purchased) in items {
            for _ in 0..purchased {
                manager.add_assignment(&ids, people[turn % people.len()], item).unwrap();
                turn += 1;
            }
        }
        assert!(manager.is_fully_assigned());

        let report = generate_report(&manager).unwrap();
        assert_eq!(report.total_subtotal(), report.receipt_subtotal);
        assert_eq!(report.total_grand_total(), cents(grand_total));
        for participant in &report.participants {
            assert_eq!(
                participant.others,
                participant.grand_total - participant.subtotal
            );
        }
    }
}

/// Three items with large, pairwise coprime unit counts.
fn bulk_rows() -> Vec<ReceiptRow> {
    vec![
        ReceiptRow::new("Bolts", 4_294_967_291, cents(500_00)),
        ReceiptRow::new("Nuts", 4_294_967_279, cents(300_00)),
        ReceiptRow::new("Washers", 4_294_967_231, cents(200_00)),
    ]
}

#[test]
fn large_coprime_counts_still_apportion() {
    let ids = IdAllocator::new();
    let mut manager = manager_with(&ids, bulk_rows(), 1100_00);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let items = manager.receipt().item_ids();
    for item in items {
        let purchased = manager.item(item).unwrap().purchased_count;
        assign(&mut manager, &ids, alice, item, purchased);
    }
    assert!(manager.is_fully_assigned());

    let report = generate_report(&manager).unwrap();
    let alice = report.participant(alice).unwrap();
    assert_eq!(alice.subtotal, cents(1000_00));
    assert_eq!(alice.grand_total, cents(1100_00));
    assert_eq!(alice.lines[0].line_total, cents(500_00));
    assert_eq!(alice.lines[0].unit_price, MoneyCents::ZERO);
}

#[test]
fn large_coprime_counts_split_between_participants() {
    let ids = IdAllocator::new();
    let mut manager = manager_with(&ids, bulk_rows(), 1100_00);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let bob = manager.add_participant(&ids, "Bob").unwrap().id;
    let items = manager.receipt().item_ids();
    for item in items {
        let purchased = manager.item(item).unwrap().purchased_count;
        assign(&mut manager, &ids, alice, item, 1);
        assign(&mut manager, &ids, bob, item, purchased - 1);
    }
    assert!(manager.is_fully_assigned());

    let report = generate_report(&manager).unwrap();
    assert_eq!(report.total_subtotal(), cents(1000_00));
    assert_eq!(report.total_grand_total(), cents(1100_00));
    // One unit of each is worth a fraction of a cent.
    let alice = report.participant(alice).unwrap();
    assert_eq!(alice.subtotal, MoneyCents::ZERO);
    assert_eq!(alice.grand_total, MoneyCents::ZERO);
    let bob = report.participant(bob).unwrap();
    assert_eq!(bob.subtotal, cents(1000_00));
    assert_eq!(bob.grand_total, cents(1100_00));
}

#[test]
fn removed_participant_disappears_from_report() {
    let ids = IdAllocator::new();
    let (mut manager, coffee) = coffee_receipt(&ids);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let bob = manager.add_participant(&ids, "Bob").unwrap().id;
    manager.add_assignment(&ids, alice, coffee).unwrap();
    manager.add_assignment(&ids, bob, coffee).unwrap();

    manager.remove_participant(alice);
    manager.remove_participant(alice);

    let report = generate_report(&manager).unwrap();
    assert_eq!(report.participants.len(), 1);
    assert_eq!(report.participants[0].participant_id, bob);
    assert_eq!(manager.total_assigned(coffee), 1);
    assert_eq!(
        report.unassigned[0].status,
        AssignmentStatus::Unassigned(1)
    );
}

#[test]
fn participant_without_assignments_owes_nothing() {
    let ids = IdAllocator::new();
    let (mut manager, coffee) = coffee_receipt(&ids);
    let alice = manager.add_participant(&ids, "Alice").unwrap().id;
    let bob = manager.add_participant(&ids, "Bob").unwrap().id;
    assign(&mut manager, &ids, alice, coffee, 2);

    assert!(manager.get_or_create_assignments(bob).is_empty());
    assert!(manager.get_or_create_assignments(bob).is_empty());

    let report = generate_report(&manager).unwrap();
    let bob = report.participant(bob).unwrap();
    assert!(bob.lines.is_empty());
    assert_eq!(bob.subtotal, MoneyCents::ZERO);
    assert_eq!(bob.grand_total, MoneyCents::ZERO);
}
