//! Domain models for invoice-editor.

mod catalog;
mod event;
mod line_item;
mod session;
mod tax_mode;
mod totals;

pub use catalog::{PartyKind, PartyRecord, ProductRecord};
pub use event::{EventOutcome, InvoiceEvent, RowId};
pub use line_item::{LineItem, LineItemField, ValidationError, MAX_FIELD_VALUE, MAX_PERCENT};
pub use session::{EditPolicy, RowView, SessionSnapshot};
pub use tax_mode::TaxMode;
pub use totals::{FormattedTotals, InvoiceTotals, LineTax, TaxInclusiveSplit};
