//! The module contains the receipt model: [`Receipt`] and its [`Item`]s.
//!
//! A receipt is built once from tabular rows (typed in by a user or returned
//! by a recognizer) and is immutable afterwards. Editing a receipt means
//! building a new one.

use std::collections::BTreeMap;

use crate::{
    EngineError, Fraction, IdAllocator, ItemId, MoneyCents, ResultEngine, fraction::too_large,
};

/// One purchasable line of a receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Number of units bought; always > 0.
    pub purchased_count: u32,
    /// Price of the whole line (all units).
    pub total_price: MoneyCents,
}

impl Item {
    /// Exact price of a single unit. Fails with [`EngineError::Validation`]
    /// for an item with no units.
    pub fn unit_price(&self) -> ResultEngine<Fraction> {
        Fraction::new(
            i128::from(self.total_price.cents()),
            i128::from(self.purchased_count),
        )
    }

    /// Unit price rounded to cents, for display.
    pub fn unit_price_cents(&self) -> ResultEngine<MoneyCents> {
        self.unit_price()?.round_to_cents()
    }
}

/// A row of tabular receipt data, before validation.
///
/// `count` is signed so that malformed input can be represented and
/// rejected instead of wrapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptRow {
    pub name: String,
    pub count: i64,
    pub total_price: MoneyCents,
}

impl ReceiptRow {
    pub fn new(name: impl Into<String>, count: i64, total_price: MoneyCents) -> Self {
        Self {
            name: name.into(),
            count,
            total_price,
        }
    }
}

/// The items of a bill together with the amount actually paid.
///
/// The grand total may differ from the [`subtotal`](Receipt::subtotal): the
/// difference is tax, service charge or discount and is what reports
/// apportion across participants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    items: BTreeMap<ItemId, Item>,
    subtotal: MoneyCents,
    grand_total: MoneyCents,
}

impl Receipt {
    /// Builds a receipt from rows, issuing a fresh id for every item.
    ///
    /// Fails with [`EngineError::Validation`] when a row has a non-positive
    /// count or a negative price, when the grand total is negative, or when
    /// the line prices add up past what [`MoneyCents`] can hold.
    pub fn from_rows(
        ids: &IdAllocator,
        rows: impl IntoIterator<Item = ReceiptRow>,
        grand_total: MoneyCents,
    ) -> ResultEngine<Self> {
        if grand_total.is_negative() {
            return Err(EngineError::validation(format!(
                "grand total must be >= 0, got {grand_total}"
            )));
        }

        let mut items = BTreeMap::new();
        let mut subtotal = MoneyCents::ZERO;
        for (index, row) in rows.into_iter().enumerate() {
            let name = row.name.trim().to_string();
            if row.count <= 0 {
                return Err(EngineError::validation(format!(
                    "row {index} ('{name}'): count must be > 0, got {}",
                    row.count
                )));
            }
            let purchased_count = u32::try_from(row.count).map_err(|_| {
                EngineError::validation(format!("row {index} ('{name}'): count too large"))
            })?;
            if row.total_price.is_negative() {
                return Err(EngineError::validation(format!(
                    "row {index} ('{name}'): price must be >= 0, got {}",
                    row.total_price
                )));
            }
            subtotal = subtotal
                .checked_add(row.total_price)
                .ok_or_else(too_large)?;

            let id = ids.next_item_id();
            items.insert(
                id,
                Item {
                    id,
                    name,
                    purchased_count,
                    total_price: row.total_price,
                },
            );
        }

        tracing::debug!(items = items.len(), %subtotal, %grand_total, "receipt built");
        Ok(Self {
            items,
            subtotal,
            grand_total,
        })
    }

    /// All items in receipt order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn item(&self, id: ItemId) -> ResultEngine<&Item> {
        self.items
            .get(&id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("item {id}")))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of every item's line price.
    pub fn subtotal(&self) -> MoneyCents {
        self.subtotal
    }

    pub fn grand_total(&self) -> MoneyCents {
        self.grand_total
    }

    /// Tax, service or discount baked into the grand total (signed).
    pub fn adjustment(&self) -> MoneyCents {
        // Both sides are within 0..=i64::MAX, so the difference fits.
        self.grand_total - self.subtotal
    }
}
