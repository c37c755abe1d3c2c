use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod receipt {
    use super::*;

    /// One receipt line as typed by the user or read by the recognizer.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ReceiptRowNew {
        pub name: String,
        /// Must be > 0.
        pub count: i64,
        /// Price of the whole line, in cents.
        pub total_price_minor: i64,
    }

    /// Request body for creating a session or replacing its receipt.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ReceiptNew {
        pub rows: Vec<ReceiptRowNew>,
        /// Amount actually paid, including tax, service and discounts.
        pub grand_total_minor: i64,
    }
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub id: Uuid,
    }

    /// How the assigned units of an item compare with the purchased ones.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    pub enum AssignmentState {
        Balanced,
        Unassigned { units: u64 },
        Exceeding { units: u64 },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemStatusView {
        pub item_id: u64,
        pub purchased: u64,
        pub assigned: u64,
        #[serde(flatten)]
        pub state: AssignmentState,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: u64,
        pub name: String,
        pub purchased_count: u32,
        pub total_price_minor: i64,
        /// Unit price rounded to cents, for display only.
        pub unit_price_minor: i64,
        pub assignment: ItemStatusView,
    }

    /// Snapshot of a whole session.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionView {
        pub id: Uuid,
        pub subtotal_minor: i64,
        pub grand_total_minor: i64,
        /// Tax, service or discount: grand total minus subtotal.
        pub adjustment_minor: i64,
        pub items: Vec<ItemView>,
        pub participants: Vec<super::participant::ParticipantView>,
        /// `true` when every purchased unit is assigned exactly once.
        pub fully_assigned: bool,
    }
}

pub mod participant {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantCreated {
        pub id: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub id: u64,
        pub name: String,
        pub assignments: Vec<super::assignment::AssignmentView>,
    }
}

pub mod assignment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentNew {
        pub item_id: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentCreated {
        pub id: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentCount {
        pub count: u32,
    }

    /// Request body for removing assignments.
    ///
    /// Exactly one of `ids` (stable assignment ids) or `positions`
    /// (indices in the participant's list) must be non-empty.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AssignmentsRemove {
        #[serde(default)]
        pub ids: Vec<u64>,
        #[serde(default)]
        pub positions: Vec<usize>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentView {
        pub id: u64,
        pub item_id: u64,
        pub assigned_count: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentsResponse {
        pub assignments: Vec<AssignmentView>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportLineView {
        pub item_id: u64,
        pub name: String,
        pub count: u32,
        pub unit_price_minor: i64,
        pub line_total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantReportView {
        pub id: u64,
        pub name: String,
        pub lines: Vec<ReportLineView>,
        pub subtotal_minor: i64,
        pub grand_total_minor: i64,
        /// Share of tax, service and discounts. Negative for a discount.
        pub others_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportView {
        pub participants: Vec<ParticipantReportView>,
        pub receipt_subtotal_minor: i64,
        pub receipt_grand_total_minor: i64,
        pub balanced: bool,
        /// Items that are under- or over-assigned.
        pub unassigned: Vec<super::session::ItemStatusView>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_state_is_tagged() {
        let view = session::ItemStatusView {
            item_id: 3,
            purchased: 2,
            assigned: 3,
            state: session::AssignmentState::Exceeding { units: 1 },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "exceeding");
        assert_eq!(json["units"], 1);
        assert_eq!(json["item_id"], 3);

        let balanced: session::ItemStatusView = serde_json::from_str(
            r#"{"item_id": 1, "purchased": 1, "assigned": 1, "status": "balanced"}"#,
        )
        .unwrap();
        assert_eq!(balanced.state, session::AssignmentState::Balanced);
    }

    #[test]
    fn remove_body_defaults_to_empty_lists() {
        let body: assignment::AssignmentsRemove = serde_json::from_str(r#"{"ids": [4]}"#).unwrap();
        assert_eq!(body.ids, vec![4]);
        assert!(body.positions.is_empty());
    }
}
