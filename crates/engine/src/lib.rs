//! Bill splitting engine.
//!
//! A [`Receipt`] (items and the grand total actually paid) is bound to a
//! [`Group`] of participants by an [`AssignmentManager`], which records how
//! many units of each item every participant takes. [`generate_report`]
//! folds that state into what each participant owes, apportioning tax,
//! service and discounts in proportion to each participant's share of the
//! subtotal.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use engine::{AssignmentManager, Group, IdAllocator, MoneyCents, Receipt, ReceiptRow};
//!
//! let ids = IdAllocator::new();
//! let receipt = Receipt::from_rows(
//!     &ids,
//!     vec![ReceiptRow::new("Coffee", 2, MoneyCents::new(10_00))],
//!     MoneyCents::new(11_00),
//! )
//! .unwrap();
//! let coffee = receipt.item_ids()[0];
//!
//! let mut manager = AssignmentManager::new(Group::new(), Arc::new(receipt));
//! let alice = manager.add_participant(&ids, "Alice").unwrap().id;
//! let line = manager.add_assignment(&ids, alice, coffee).unwrap();
//! manager.set_assigned_count(alice, line, 2).unwrap();
//!
//! let report = engine::generate_report(&manager).unwrap();
//! assert_eq!(report.participants[0].grand_total, MoneyCents::new(11_00));
//! assert_eq!(report.participants[0].others, MoneyCents::new(1_00));
//! ```

pub use assignment::{AssignedItem, AssignmentManager, AssignmentStatus, ItemAssignment};
pub use error::EngineError;
pub use fraction::Fraction;
pub use group::{Group, Participant};
pub use ids::{AssignmentId, IdAllocator, ItemId, ParticipantId};
pub use money::MoneyCents;
pub use receipt::{Item, Receipt, ReceiptRow};
pub use report::{ParticipantReport, Report, ReportLine, generate as generate_report};

mod assignment;
mod error;
mod fraction;
mod group;
mod ids;
mod money;
mod receipt;
pub mod report;

pub type ResultEngine<T> = Result<T, EngineError>;
