//! Services module for invoice-editor.

pub mod calculator;
pub mod catalog_client;
mod error;
pub mod metrics;
pub mod session;
pub mod session_store;

pub use calculator::{compute, line_tax, split_tax_inclusive, TotalsError};
pub use catalog_client::{CatalogClient, CatalogError, MIN_PARTY_QUERY_LEN};
pub use metrics::{get_metrics, init_metrics};
pub use session::{InvoiceRow, InvoiceSession, SearchKind, SearchTicket, SessionError};
pub use session_store::SessionStore;
