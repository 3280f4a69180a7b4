//! # Row Codec
//!
//! Maps one flat CSV row to a typed, reconciled sale and back.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  IMPORT                                                                 │
//! │    bytes ──► SaleRowReader ──► SaleRow (9 raw strings)                  │
//! │                                    │                                    │
//! │                                    ▼ decode_row()                       │
//! │                              DecodedSale                                │
//! │                              ├── date parsed (YYYY-MM-DD)               │
//! │                              ├── names defaulted                        │
//! │                              ├── quantity defaulted to 1                │
//! │                              └── card / cash reconciled to total        │
//! │                                                                         │
//! │  EXPORT                                                                 │
//! │    ExportRecord ──► encode_record() ──► SaleRow ──► write_csv() ──► text│
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `sale_date` can fail a row. Every other field falls back to a
//! default instead of raising.

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::ExportRecord;
use crate::{DEFAULT_CATEGORY_NAME, DEFAULT_PRODUCT_NAME, DEFAULT_STORE_NAME, REQUIRED_HEADERS};

// =============================================================================
// Constants
// =============================================================================

/// Fixed column order, used for the export header and the template.
pub const CSV_HEADERS: [&str; 9] = [
    "sale_date",
    "store_name",
    "product_category",
    "product_name",
    "quantity",
    "total",
    "card_amount",
    "cash_amount",
    "notes",
];

/// Download name of the import template.
pub const TEMPLATE_FILENAME: &str = "sales_import_template.csv";

/// Accepted date format for `sale_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Allowed gap between `card + cash` and `total` before cash is adjusted.
pub const RECONCILE_TOLERANCE: Money = Money::from_cents(1);

const TEMPLATE_SAMPLE: [&str; 9] = [
    "2024-12-31",
    "Main Store",
    "Jewelry",
    "Silver Ring",
    "1",
    "45.00",
    "25.00",
    "20.00",
    "Customer requested gift wrap",
];

// =============================================================================
// Sale Row
// =============================================================================

/// One CSV data row as raw text, keyed by column name.
///
/// A column absent from the file reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRow {
    pub sale_date: String,
    pub store_name: String,
    pub product_category: String,
    pub product_name: String,
    pub quantity: String,
    pub total: String,
    pub card_amount: String,
    pub cash_amount: String,
    pub notes: String,
}

impl SaleRow {
    /// Field values in [`CSV_HEADERS`] order.
    pub fn fields(&self) -> [&str; 9] {
        [
            &self.sale_date,
            &self.store_name,
            &self.product_category,
            &self.product_name,
            &self.quantity,
            &self.total,
            &self.card_amount,
            &self.cash_amount,
            &self.notes,
        ]
    }

    fn from_record(record: &StringRecord, columns: &ColumnIndex) -> Self {
        let cell = |slot: Option<usize>| -> String {
            slot.and_then(|i| record.get(i))
                .map(str::to_string)
                .unwrap_or_default()
        };

        SaleRow {
            sale_date: cell(columns.slots[0]),
            store_name: cell(columns.slots[1]),
            product_category: cell(columns.slots[2]),
            product_name: cell(columns.slots[3]),
            quantity: cell(columns.slots[4]),
            total: cell(columns.slots[5]),
            card_amount: cell(columns.slots[6]),
            cash_amount: cell(columns.slots[7]),
            notes: cell(columns.slots[8]),
        }
    }
}

/// Position of each known column in the file's header, if present.
#[derive(Debug, Clone)]
struct ColumnIndex {
    slots: [Option<usize>; 9],
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Self {
        let mut slots = [None; 9];
        for (slot, name) in slots.iter_mut().zip(CSV_HEADERS) {
            *slot = headers.iter().position(|h| h == name);
        }
        ColumnIndex { slots }
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Streams [`SaleRow`]s out of an in-memory CSV buffer.
///
/// The first line is the header. Ragged rows are accepted: short rows read
/// missing cells as blank, extra cells are ignored.
///
/// ## Example
/// ```rust
/// use tally_core::codec::SaleRowReader;
///
/// let mut reader = SaleRowReader::new("sale_date,quantity\n2024-01-01,3\n").unwrap();
/// assert!(reader.missing_required_headers().is_empty());
///
/// let rows: Vec<_> = reader.rows().collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows[0].quantity, "3");
/// assert_eq!(rows[0].store_name, "");
/// ```
pub struct SaleRowReader<'a> {
    inner: csv::Reader<&'a [u8]>,
    headers: Vec<String>,
    columns: ColumnIndex,
}

impl<'a> SaleRowReader<'a> {
    /// Opens a reader and consumes the header line.
    pub fn new<B: AsRef<[u8]> + ?Sized>(input: &'a B) -> CoreResult<Self> {
        let mut inner = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input.as_ref());

        let headers: Vec<String> = inner
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let columns = ColumnIndex::from_headers(&headers);

        Ok(SaleRowReader {
            inner,
            headers,
            columns,
        })
    }

    /// Header names as they appear in the file (trimmed).
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Required headers absent from this file, in declaration order.
    pub fn missing_required_headers(&self) -> Vec<&'static str> {
        REQUIRED_HEADERS
            .iter()
            .copied()
            .filter(|required| !self.headers.iter().any(|h| h == required))
            .collect()
    }

    /// Iterates the data rows in file order.
    pub fn rows(&mut self) -> SaleRows<'_, 'a> {
        SaleRows {
            records: self.inner.records(),
            columns: &self.columns,
        }
    }
}

/// Data rows of a [`SaleRowReader`], in file order.
pub struct SaleRows<'r, 'a> {
    records: csv::StringRecordsIter<'r, &'a [u8]>,
    columns: &'r ColumnIndex,
}

impl Iterator for SaleRows<'_, '_> {
    type Item = CoreResult<SaleRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map(|r| SaleRow::from_record(&r, self.columns)).map_err(Into::into))
    }
}

/// Formats the message for a header check failure.
pub fn missing_headers_message(missing: &[&str]) -> String {
    format!("Missing required headers: {}", missing.join(", "))
}

// =============================================================================
// Decoding
// =============================================================================

/// A row after parsing, defaulting and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DecodedSale {
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub store_name: String,
    pub category_name: String,
    pub product_name: String,
    pub quantity: i64,
    pub total: Money,
    pub card: Money,
    pub cash: Money,
    /// Trimmed notes; `None` when blank.
    pub notes: Option<String>,
}

impl DecodedSale {
    /// Unit price hint used when an import creates the product.
    pub fn unit_price(&self) -> Money {
        self.total.per_unit(self.quantity)
    }
}

/// Card and cash amounts after reconciliation against a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amounts {
    pub total: Money,
    pub card: Money,
    pub cash: Money,
}

/// Brings card and cash into agreement with the stated total.
///
/// - A zero total with any positive payment becomes `card + cash`.
/// - A positive total that disagrees with `card + cash` by more than one
///   cent keeps card and sets `cash = total - card`. If that would be
///   negative, the whole total moves to card.
///
/// Inputs are expected to be non-negative.
///
/// ## Example
/// ```rust
/// use tally_core::codec::reconcile;
/// use tally_core::Money;
///
/// let out = reconcile(Money::from_cents(5000), Money::zero(), Money::zero());
/// assert_eq!(out.cash.cents(), 5000);
///
/// let out = reconcile(Money::from_cents(3000), Money::from_cents(4000), Money::zero());
/// assert_eq!((out.card.cents(), out.cash.cents()), (3000, 0));
/// ```
pub fn reconcile(total: Money, card: Money, cash: Money) -> Amounts {
    let paid = card + cash;

    if total.is_zero() {
        // Nothing stated: trust the payments.
        return Amounts {
            total: paid,
            card,
            cash,
        };
    }

    if (paid - total).abs() <= RECONCILE_TOLERANCE {
        return Amounts { total, card, cash };
    }

    let cash = total - card;
    if cash.is_negative() {
        Amounts {
            total,
            card: total,
            cash: Money::zero(),
        }
    } else {
        Amounts { total, card, cash }
    }
}

/// Decodes one raw row.
///
/// Fails only when `sale_date` is not `YYYY-MM-DD`.
pub fn decode_row(row: &SaleRow) -> CoreResult<DecodedSale> {
    let raw_date = row.sale_date.trim();
    let sale_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .map_err(|_| CoreError::InvalidSaleDate(row.sale_date.clone()))?;

    let total = parse_amount(&row.total);
    let card = parse_amount(&row.card_amount);
    let cash = parse_amount(&row.cash_amount);
    let amounts = reconcile(total, card, cash);

    if amounts.card != card || amounts.cash != cash || amounts.total != total {
        tracing::warn!(
            sale_date = %sale_date,
            total = %amounts.total,
            card_before = %card,
            cash_before = %cash,
            card_after = %amounts.card,
            cash_after = %amounts.cash,
            "Reconciled payment amounts against total"
        );
    }

    let notes = row.notes.trim();

    Ok(DecodedSale {
        sale_date,
        store_name: name_or(&row.store_name, DEFAULT_STORE_NAME),
        category_name: name_or(&row.product_category, DEFAULT_CATEGORY_NAME),
        product_name: name_or(&row.product_name, DEFAULT_PRODUCT_NAME),
        quantity: parse_quantity(&row.quantity),
        total: amounts.total,
        card: amounts.card,
        cash: amounts.cash,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    })
}

fn name_or(raw: &str, default: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        default.to_string()
    } else {
        name.to_string()
    }
}

/// Blank, non-numeric or non-positive quantities read as 1.
fn parse_quantity(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(q) if q > 0 => q,
        _ => 1,
    }
}

/// Blank, non-numeric, negative or out-of-range amounts read as zero.
fn parse_amount(raw: &str) -> Money {
    match Money::parse(raw) {
        Some(m) if !m.is_negative() => m,
        _ => Money::zero(),
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Builds the export row for a stored sale.
///
/// `total` is the stored total, not `card + cash`. After a row reconciled
/// within the one-cent tolerance the two can differ by a cent; writing the
/// stored value lets a re-import reproduce the same sale.
pub fn encode_record(record: &ExportRecord) -> SaleRow {
    SaleRow {
        sale_date: record.sale_date.format(DATE_FORMAT).to_string(),
        store_name: record.store_label().to_string(),
        product_category: record.category_label().to_string(),
        product_name: record.product_label().to_string(),
        quantity: record.quantity.to_string(),
        total: Money::from_cents(record.total_cents).to_csv_string(),
        card_amount: Money::from_cents(record.card_cents).to_csv_string(),
        cash_amount: Money::from_cents(record.cash_cents).to_csv_string(),
        notes: record.notes.clone().unwrap_or_default(),
    }
}

/// Writes a header line followed by `rows`, in [`CSV_HEADERS`] order.
pub fn write_csv<'r, I>(rows: I) -> CoreResult<String>
where
    I: IntoIterator<Item = &'r SaleRow>,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::CsvWrite(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::CsvWrite(e.to_string()))
}

/// The import template: header plus one sample row.
pub fn template_csv() -> CoreResult<String> {
    let sample = SaleRow {
        sale_date: TEMPLATE_SAMPLE[0].to_string(),
        store_name: TEMPLATE_SAMPLE[1].to_string(),
        product_category: TEMPLATE_SAMPLE[2].to_string(),
        product_name: TEMPLATE_SAMPLE[3].to_string(),
        quantity: TEMPLATE_SAMPLE[4].to_string(),
        total: TEMPLATE_SAMPLE[5].to_string(),
        card_amount: TEMPLATE_SAMPLE[6].to_string(),
        cash_amount: TEMPLATE_SAMPLE[7].to_string(),
        notes: TEMPLATE_SAMPLE[8].to_string(),
    };
    write_csv([&sample])
}

/// `sales_export_<YYYYMMDD_HHMMSS>.csv` for the given instant.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("sales_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

// =============================================================================
// Unit Tests
// =============================================================================
