//! Report generation: turns an [`AssignmentManager`] into what everybody
//! owes.
//!
//! Each participant pays for the units assigned to them at unit price, plus a
//! share of the receipt's adjustment (tax, service, discount) proportional to
//! their fraction of the receipt subtotal:
//!
//! ```text
//! grand_total(p) = subtotal(p) * receipt.grand_total / receipt.subtotal
//! others(p)      = grand_total(p) - subtotal(p)
//! ```
//!
//! All of this is computed exactly and rounded to cents at the very end. The
//! rounding residue is handed out one cent at a time to whoever was rounded
//! down the most, so when every unit is assigned exactly once the
//! participants' grand totals add up to the receipt's grand total to the
//! cent.

use crate::{
    AssignmentManager, EngineError, Fraction, ItemAssignment, ItemId, MoneyCents, ParticipantId,
    ResultEngine,
    fraction::{round_half_even, too_large},
};

/// One assigned line in a participant's report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLine {
    pub item_id: ItemId,
    pub name: String,
    pub count: u32,
    /// Unit price rounded to cents.
    pub unit_price: MoneyCents,
    /// `count * unit price`, rounded once.
    pub line_total: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantReport {
    pub participant_id: ParticipantId,
    pub name: String,
    pub lines: Vec<ReportLine>,
    pub subtotal: MoneyCents,
    pub grand_total: MoneyCents,
    /// Apportioned tax/service/discount, negative for a discount.
    pub others: MoneyCents,
}

/// Read-only snapshot of who owes what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub participants: Vec<ParticipantReport>,
    pub receipt_subtotal: MoneyCents,
    pub receipt_grand_total: MoneyCents,
    /// Items whose assigned units do not match the purchased ones.
    pub unassigned: Vec<ItemAssignment>,
}

impl Report {
    pub fn participant(&self, id: ParticipantId) -> Option<&ParticipantReport> {
        self.participants.iter().find(|p| p.participant_id == id)
    }

    pub fn total_subtotal(&self) -> MoneyCents {
        self.participants.iter().map(|p| p.subtotal).sum()
    }

    pub fn total_grand_total(&self) -> MoneyCents {
        self.participants.iter().map(|p| p.grand_total).sum()
    }

    /// `true` when every purchased unit was assigned exactly once.
    pub fn is_balanced(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Builds the report for the manager's current state.
///
/// Fails with [`EngineError::Validation`] when the receipt subtotal is zero,
/// since there is nothing to apportion the grand total against.
pub fn generate(manager: &AssignmentManager) -> ResultEngine<Report> {
    let receipt = manager.receipt();
    let receipt_subtotal = receipt.subtotal();
    if receipt_subtotal.is_zero() {
        return Err(EngineError::validation(
            "cannot apportion totals: receipt subtotal is zero",
        ));
    }

    let ratio = Fraction::new(
        i128::from(receipt.grand_total().cents()),
        i128::from(receipt_subtotal.cents()),
    )?;

    let participants = manager.all_participants();
    let mut drafts = Vec::with_capacity(participants.len());
    let mut exact_subtotals = Vec::with_capacity(participants.len());

    for participant in participants {
        let mut lines = Vec::new();
        let mut exact = Fraction::ZERO;
        for record in manager.assignments(participant.id) {
            let item = manager.item(record.item_id)?;
            let share = item
                .unit_price()?
                .checked_mul_int(i128::from(record.assigned_count))?;
            exact = exact.checked_add(share)?;

            lines.push(ReportLine {
                item_id: item.id,
                name: item.name.clone(),
                count: record.assigned_count,
                unit_price: item.unit_price_cents()?,
                line_total: share.round_to_cents()?,
            });
        }
        drafts.push((participant, lines));
        exact_subtotals.push(exact);
    }

    let exact_grand_totals = exact_subtotals
        .iter()
        .map(|subtotal| subtotal.checked_mul(ratio))
        .collect::<ResultEngine<Vec<_>>>()?;
    let subtotals = distribute(&exact_subtotals)?;
    let grand_totals = distribute(&exact_grand_totals)?;

    let participants: Vec<_> = drafts
        .into_iter()
        .zip(subtotals)
        .zip(grand_totals)
        .map(|(((participant, lines), subtotal), grand_total)| ParticipantReport {
            participant_id: participant.id,
            name: participant.name.clone(),
            lines,
            subtotal,
            grand_total,
            others: grand_total - subtotal,
        })
        .collect();

    let unassigned: Vec<_> = manager
        .item_statuses()
        .into_iter()
        .filter(|status| !status.status.is_balanced())
        .collect();

    tracing::debug!(
        participants = participants.len(),
        unassigned = unassigned.len(),
        "report generated"
    );

    Ok(Report {
        participants,
        receipt_subtotal,
        receipt_grand_total: receipt.grand_total(),
        unassigned,
    })
}

/// Rounds every value to cents so that the rounded values add up to the
/// rounded exact sum. The residue goes to the values with the largest
/// rounding shortfall, ties in input order.
fn distribute(values: &[Fraction]) -> ResultEngine<Vec<MoneyCents>> {
    let mut rounded: Vec<i128> = values
        .iter()
        .map(|v| round_half_even(v.numerator(), v.denominator()))
        .collect();

    let exact_sum = values
        .iter()
        .try_fold(Fraction::ZERO, |acc, v| acc.checked_add(*v))?;
    let target = round_half_even(exact_sum.numerator(), exact_sum.denominator());
    let residue = rounded
        .iter()
        .try_fold(target, |acc, v| acc.checked_sub(*v))
        .ok_or_else(too_large)?;

    if residue != 0 {
        // Shortfall is exact - rounded, within (-1, 1).
        let mut order = values
            .iter()
            .zip(&rounded)
            .enumerate()
            .map(|(i, (v, &r))| {
                let (numerator, denominator) = (v.numerator(), v.denominator());
                let remainder = numerator.rem_euclid(denominator);
                let shortfall = if r == numerator.div_euclid(denominator) {
                    remainder
                } else {
                    remainder - denominator
                };
                Fraction::new(shortfall, denominator).map(|shortfall| (i, shortfall))
            })
            .collect::<ResultEngine<Vec<_>>>()?;
        if residue > 0 {
            order.sort_by(|a, b| b.1.cmp(&a.1));
        } else {
            order.sort_by(|a, b| a.1.cmp(&b.1));
        }
        let step = residue.signum();
        for (index, _) in order.into_iter().take(residue.unsigned_abs() as usize) {
            rounded[index] += step;
        }
    }

    rounded
        .into_iter()
        .map(|v| i64::try_from(v).map(MoneyCents::new).map_err(|_| too_large()))
        .collect()
}
