//! Conversions from engine state to response bodies.

use api_types::{
    assignment::AssignmentView,
    participant::ParticipantView,
    report::{ParticipantReportView, ReportLineView, ReportView},
    session::{AssignmentState, ItemStatusView, ItemView, SessionView},
};
use engine::{
    AssignedItem, AssignmentManager, AssignmentStatus, ItemAssignment, ParticipantReport, Report,
    ResultEngine,
};
use uuid::Uuid;

pub(crate) fn item_status(summary: &ItemAssignment) -> ItemStatusView {
    ItemStatusView {
        item_id: summary.item_id.get(),
        purchased: summary.purchased,
        assigned: summary.assigned,
        state: match summary.status {
            AssignmentStatus::Balanced => AssignmentState::Balanced,
            AssignmentStatus::Unassigned(units) => AssignmentState::Unassigned { units },
            AssignmentStatus::Exceeding(units) => AssignmentState::Exceeding { units },
        },
    }
}

pub(crate) fn assignment(record: &AssignedItem) -> AssignmentView {
    AssignmentView {
        id: record.id.get(),
        item_id: record.item_id.get(),
        assigned_count: record.assigned_count,
    }
}

pub(crate) fn assignments(records: &[AssignedItem]) -> Vec<AssignmentView> {
    records.iter().map(assignment).collect()
}

pub(crate) fn session(id: Uuid, manager: &AssignmentManager) -> ResultEngine<SessionView> {
    let receipt = manager.receipt();
    let items = manager
        .all_items()
        .into_iter()
        .zip(manager.item_statuses())
        .map(|(item, summary)| {
            Ok(ItemView {
                id: item.id.get(),
                name: item.name.clone(),
                purchased_count: item.purchased_count,
                total_price_minor: item.total_price.cents(),
                unit_price_minor: item.unit_price_cents()?.cents(),
                assignment: item_status(&summary),
            })
        })
        .collect::<ResultEngine<Vec<_>>>()?;

    let participants = manager
        .all_participants()
        .into_iter()
        .map(|participant| ParticipantView {
            id: participant.id.get(),
            name: participant.name.clone(),
            assignments: assignments(manager.assignments(participant.id)),
        })
        .collect();

    Ok(SessionView {
        id,
        subtotal_minor: receipt.subtotal().cents(),
        grand_total_minor: receipt.grand_total().cents(),
        adjustment_minor: receipt.adjustment().cents(),
        items,
        participants,
        fully_assigned: manager.is_fully_assigned(),
    })
}

fn participant_report(report: ParticipantReport) -> ParticipantReportView {
    ParticipantReportView {
        id: report.participant_id.get(),
        name: report.name,
        lines: report
            .lines
            .into_iter()
            .map(|line| ReportLineView {
                item_id: line.item_id.get(),
                name: line.name,
                count: line.count,
                unit_price_minor: line.unit_price.cents(),
                line_total_minor: line.line_total.cents(),
            })
            .collect(),
        subtotal_minor: report.subtotal.cents(),
        grand_total_minor: report.grand_total.cents(),
        others_minor: report.others.cents(),
    }
}

pub(crate) fn report(report: Report) -> ReportView {
    ReportView {
        balanced: report.is_balanced(),
        receipt_subtotal_minor: report.receipt_subtotal.cents(),
        receipt_grand_total_minor: report.receipt_grand_total.cents(),
        unassigned: report.unassigned.iter().map(item_status).collect(),
        participants: report
            .participants
            .into_iter()
            .map(participant_report)
            .collect(),
    }
}
