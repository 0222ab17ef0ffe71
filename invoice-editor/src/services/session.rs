//! Invoice editing session.
//!
//! A session owns everything the invoice form used to keep in page globals:
//! the row counter, the rows themselves, the tax mode and the catalog
//! entries fetched so far. Sessions are independent of each other; all
//! changes arrive as [`InvoiceEvent`]s.

use crate::models::{
    EditPolicy, EventOutcome, InvoiceEvent, InvoiceTotals, LineItem, LineItemField, PartyRecord,
    ProductRecord, RowId, RowView, SessionSnapshot, TaxMode, ValidationError,
};
use crate::services::calculator::{self, TotalsError};
use crate::utils::{gstin, number};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Rows one session may hold. At this size even a session of maximal rows
/// totals well inside `Decimal` range.
pub const MAX_ROWS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("row {0} does not exist")]
    UnknownRow(RowId),

    #[error("product {0} has not been loaded into this session")]
    UnknownProduct(i64),

    #[error("party {0} has not been loaded into this session")]
    UnknownParty(i64),

    #[error("an invoice holds at most {0} rows")]
    TooManyRows(usize),

    #[error("no row ids left in this session")]
    RowIdsExhausted,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Totals(#[from] TotalsError),
}

/// One line of the invoice table.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: RowId,
    pub product_id: Option<i64>,
    pub description: Option<String>,
    pub hsn_code: Option<String>,
    pub item: LineItem,
}

impl InvoiceRow {
    fn new(id: RowId) -> Self {
        Self {
            id,
            product_id: None,
            description: None,
            hsn_code: None,
            item: LineItem::new(Decimal::ONE, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Products,
    Parties,
}

/// Handed out when a catalog search starts; presented again when its
/// response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    pub kind: SearchKind,
    pub seq: u64,
    pub row: Option<RowId>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SearchSequence {
    issued: u64,
    rendered: u64,
}

#[derive(Debug)]
pub struct InvoiceSession {
    id: Uuid,
    next_row: u32,
    rows: BTreeMap<RowId, InvoiceRow>,
    mode: TaxMode,
    party: Option<PartyRecord>,
    products: HashMap<i64, ProductRecord>,
    parties: HashMap<i64, PartyRecord>,
    edit_policy: EditPolicy,
    seller_state_code: Option<String>,
    product_search: SearchSequence,
    party_search: SearchSequence,
    last_activity: Instant,
}

impl InvoiceSession {
    pub fn new(id: Uuid, edit_policy: EditPolicy, seller_state_code: Option<String>) -> Self {
        Self {
            id,
            next_row: 0,
            rows: BTreeMap::new(),
            mode: TaxMode::default(),
            party: None,
            products: HashMap::new(),
            parties: HashMap::new(),
            edit_policy,
            seller_state_code,
            product_search: SearchSequence::default(),
            party_search: SearchSequence::default(),
            last_activity: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> TaxMode {
        self.mode
    }

    pub fn edit_policy(&self) -> EditPolicy {
        self.edit_policy
    }

    pub fn party(&self) -> Option<&PartyRecord> {
        self.party.as_ref()
    }

    pub fn row(&self, id: RowId) -> Option<&InvoiceRow> {
        self.rows.get(&id)
    }

    /// Rows in the order they were added.
    pub fn rows(&self) -> impl Iterator<Item = &InvoiceRow> {
        self.rows.values()
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.rows.values().map(|row| row.item).collect()
    }

    pub fn cached_product(&self, id: i64) -> Option<&ProductRecord> {
        self.products.get(&id)
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Apply one user action. A failed event, including one whose totals
    /// cannot be computed, leaves the session unchanged.
    pub fn apply(&mut self, event: InvoiceEvent) -> Result<EventOutcome, SessionError> {
        debug!(session_id = %self.id, event = event.kind(), "Applying invoice event");

        let checkpoint = Checkpoint::capture(self, &event);
        let outcome = self.dispatch(event)?;
        if let Err(err) = self.totals() {
            debug!(session_id = %self.id, error = %err, "Rolling back invoice event");
            checkpoint.restore(self);
            return Err(err.into());
        }
        Ok(outcome)
    }

    fn dispatch(&mut self, event: InvoiceEvent) -> Result<EventOutcome, SessionError> {
        match event {
            InvoiceEvent::ItemAdded => {
                if self.rows.len() >= MAX_ROWS {
                    return Err(SessionError::TooManyRows(MAX_ROWS));
                }
                self.next_row = self
                    .next_row
                    .checked_add(1)
                    .ok_or(SessionError::RowIdsExhausted)?;
                let id = RowId(self.next_row);
                self.rows.insert(id, InvoiceRow::new(id));
                Ok(EventOutcome::RowAdded { row: id })
            }
            InvoiceEvent::ItemRemoved { row } => {
                self.rows
                    .remove(&row)
                    .ok_or(SessionError::UnknownRow(row))?;
                Ok(EventOutcome::RowRemoved { row })
            }
            InvoiceEvent::FieldChanged { row, field, value } => {
                self.ensure_row(row)?;
                let value = self.admit(field, value)?;
                self.row_mut(row)?.item.set(field, value);
                Ok(EventOutcome::FieldUpdated { row, field, value })
            }
            InvoiceEvent::ProductSelected { row, product_id } => {
                self.ensure_row(row)?;
                let product = self
                    .products
                    .get(&product_id)
                    .cloned()
                    .ok_or(SessionError::UnknownProduct(product_id))?;
                let rate = self.admit(LineItemField::Rate, product.selling_price)?;
                let gst_percent = self.admit(LineItemField::GstPercent, product.gst_percent)?;

                let target = self.row_mut(row)?;
                target.product_id = Some(product.id);
                target.description = Some(product.name);
                target.hsn_code = product.hsn_code;
                target.item.rate = rate;
                target.item.gst_percent = gst_percent;
                Ok(EventOutcome::ProductApplied { row, product_id })
            }
            InvoiceEvent::TaxModeChanged {
                gst_applicable,
                inter_state,
            } => {
                if let Some(gst_applicable) = gst_applicable {
                    self.mode.gst_applicable = gst_applicable;
                }
                if let Some(inter_state) = inter_state {
                    self.mode.inter_state = inter_state;
                }
                Ok(EventOutcome::TaxModeUpdated { mode: self.mode })
            }
            InvoiceEvent::PartySelected { party_id } => {
                let party = self
                    .parties
                    .get(&party_id)
                    .cloned()
                    .ok_or(SessionError::UnknownParty(party_id))?;
                let buyer_state = party
                    .state_code
                    .as_deref()
                    .filter(|code| !code.is_empty())
                    .or_else(|| party.gstin.as_deref().and_then(gstin::state_code));
                let inter_state =
                    gstin::is_interstate(self.seller_state_code.as_deref(), buyer_state);

                self.mode.inter_state = inter_state;
                self.party = Some(party);
                Ok(EventOutcome::PartyApplied {
                    party_id,
                    inter_state,
                })
            }
        }
    }

    pub fn totals(&self) -> Result<InvoiceTotals, TotalsError> {
        calculator::compute(&self.line_items(), self.mode)
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, TotalsError> {
        let totals = self.totals()?;
        let rows = self
            .rows
            .values()
            .map(|row| {
                let line = calculator::line_tax(&row.item, self.mode)?;
                Ok(RowView {
                    row: row.id,
                    product_id: row.product_id,
                    description: row.description.clone(),
                    hsn_code: row.hsn_code.clone(),
                    item: row.item,
                    amount: number::to_fixed_2(line.taxable_amount),
                    cgst: number::to_fixed_2(line.cgst),
                    sgst: number::to_fixed_2(line.sgst),
                    igst: number::to_fixed_2(line.igst),
                    tax: number::to_fixed_2(line.tax()),
                })
            })
            .collect::<Result<Vec<_>, TotalsError>>()?;

        Ok(SessionSnapshot {
            session_id: self.id,
            edit_policy: self.edit_policy,
            mode: self.mode,
            party: self.party.clone(),
            rows,
            display: totals.formatted(),
            amount_in_words: number::amount_in_words(totals.grand_total),
            totals,
        })
    }

    /// Start a catalog search, optionally on behalf of a row's dropdown.
    pub fn begin_search(
        &mut self,
        kind: SearchKind,
        row: Option<RowId>,
    ) -> Result<SearchTicket, SessionError> {
        if let Some(row) = row {
            self.ensure_row(row)?;
        }
        let sequence = self.sequence_mut(kind);
        sequence.issued += 1;
        Ok(SearchTicket {
            kind,
            seq: sequence.issued,
            row,
        })
    }

    /// Cache the products and return them for rendering, or `None` when the
    /// response is stale.
    pub fn complete_product_search(
        &mut self,
        ticket: SearchTicket,
        records: Vec<ProductRecord>,
    ) -> Option<Vec<ProductRecord>> {
        for record in &records {
            self.products.insert(record.id, record.clone());
        }
        self.settle(ticket).then_some(records)
    }

    /// Party counterpart of [`Self::complete_product_search`].
    pub fn complete_party_search(
        &mut self,
        ticket: SearchTicket,
        records: Vec<PartyRecord>,
    ) -> Option<Vec<PartyRecord>> {
        for record in &records {
            self.parties.insert(record.id, record.clone());
        }
        self.settle(ticket).then_some(records)
    }

    /// A response renders unless its row is gone or a newer search of the
    /// same kind already rendered.
    fn settle(&mut self, ticket: SearchTicket) -> bool {
        let session_id = self.id;
        if let Some(row) = ticket.row {
            if !self.rows.contains_key(&row) {
                debug!(session_id = %session_id, row = %row, "Discarding search for removed row");
                return false;
            }
        }

        let sequence = self.sequence_mut(ticket.kind);
        if ticket.seq < sequence.rendered {
            debug!(
                session_id = %session_id,
                seq = ticket.seq,
                rendered = sequence.rendered,
                "Discarding stale search response"
            );
            return false;
        }
        sequence.rendered = ticket.seq;
        true
    }

    fn sequence_mut(&mut self, kind: SearchKind) -> &mut SearchSequence {
        match kind {
            SearchKind::Products => &mut self.product_search,
            SearchKind::Parties => &mut self.party_search,
        }
    }

    fn admit(&self, field: LineItemField, value: Decimal) -> Result<Decimal, ValidationError> {
        match LineItem::validate_field(field, value) {
            Ok(()) => Ok(value),
            Err(err) => match self.edit_policy {
                EditPolicy::Reject => Err(err),
                EditPolicy::Clamp => {
                    let clamped = LineItem::clamp_field(field, value);
                    debug!(
                        session_id = %self.id,
                        field = %field,
                        value = %value,
                        clamped = %clamped,
                        "Clamped out-of-range value"
                    );
                    Ok(clamped)
                }
            },
        }
    }

    fn ensure_row(&self, row: RowId) -> Result<(), SessionError> {
        if self.rows.contains_key(&row) {
            Ok(())
        } else {
            Err(SessionError::UnknownRow(row))
        }
    }

    fn row_mut(&mut self, row: RowId) -> Result<&mut InvoiceRow, SessionError> {
        self.rows.get_mut(&row).ok_or(SessionError::UnknownRow(row))
    }
}

/// The parts of a session one event can change, captured before the event
/// so it can be undone.
#[derive(Debug)]
struct Checkpoint {
    /// Row the event touches and its prior state (`None` for a row being added).
    row: Option<(RowId, Option<InvoiceRow>)>,
    mode: TaxMode,
    party: Option<PartyRecord>,
}

impl Checkpoint {
    fn capture(session: &InvoiceSession, event: &InvoiceEvent) -> Self {
        let row = match event {
            InvoiceEvent::ItemAdded => session
                .next_row
                .checked_add(1)
                .map(|next| (RowId(next), None)),
            InvoiceEvent::ItemRemoved { row }
            | InvoiceEvent::FieldChanged { row, .. }
            | InvoiceEvent::ProductSelected { row, .. } => {
                Some((*row, session.rows.get(row).cloned()))
            }
            InvoiceEvent::TaxModeChanged { .. } | InvoiceEvent::PartySelected { .. } => None,
        };

        Self {
            row,
            mode: session.mode,
            party: session.party.clone(),
        }
    }

    fn restore(self, session: &mut InvoiceSession) {
        if let Some((id, previous)) = self.row {
            match previous {
                Some(row) => {
                    session.rows.insert(id, row);
                }
                None => {
                    session.rows.remove(&id);
                }
            }
        }
        session.mode = self.mode;
        session.party = self.party;
    }
}
