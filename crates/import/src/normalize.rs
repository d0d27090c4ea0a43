// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Header-synonym resolution and row normalization.

use csv::StringRecord;
use porteiro_domain::CanonicalTicketRow;
use tracing::{debug, warn};

use crate::error::ImportError;

/// Known header spellings per logical field.
///
/// Matching is case-insensitive and trimmed, so each list only carries
/// distinct spellings, not case variants. For each logical field, the
/// first header in the *input* order matching any synonym wins.
const ID_SYNONYMS: &[&str] = &["id", "ticket_id", "ticketid", "ticket id"];

const QR_CODE_SYNONYMS: &[&str] = &[
    "qr code",
    "qr_code",
    "qrcode",
    "código qr",
    "codigo qr",
    "qr code url",
    "url",
];

const STATUS_SYNONYMS: &[&str] = &[
    "status",
    "status de validação",
    "ticket type",
    "type",
    "estado",
];

const DATE_SYNONYMS: &[&str] = &[
    "data/hora da validação",
    "validation_date",
    "validationdate",
    "date",
    "data",
];

const COUNT_SYNONYMS: &[&str] = &[
    "número de utilizações",
    "validation_count",
    "validationcount",
    "count",
    "utilizações",
    "uses",
];

const NAME_SYNONYMS: &[&str] = &["name", "nome"];

const EMAIL_SYNONYMS: &[&str] = &["email", "e-mail"];

const PHONE_SYNONYMS: &[&str] = &["phone", "telefone"];

const SECURITY_CODE_SYNONYMS: &[&str] = &[
    "security code",
    "security_code",
    "codigo segurança",
    "código de segurança",
];

const EVENT_NAME_SYNONYMS: &[&str] = &["nome do evento", "event_name", "event", "evento"];

/// Normalizes a CSV header for case-insensitive, whitespace-tolerant
/// matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Finds the first header (in input order) matching any synonym.
fn find_column(headers: &StringRecord, synonyms: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| synonyms.contains(&normalize_header(header).as_str()))
}

/// Resolved column indices for the logical ticket fields.
///
/// `qr_code` is the only binding that must exist; everything else is
/// optional and maps to an empty string when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    id: Option<usize>,
    qr_code: usize,
    status: Option<usize>,
    date: Option<usize>,
    count: Option<usize>,
    name: Option<usize>,
    email: Option<usize>,
    phone: Option<usize>,
    security_code: Option<usize>,
    event_name: Option<usize>,
}

/// Resolves the column map from the header row, using the first data row
/// for the QR content-sniffing fallback.
///
/// QR column fallback order when no synonym matches:
/// 1. a column whose sampled first-row value contains "http" or "QR", or
///    whose header contains "url"
/// 2. the first column positionally (common exports put the QR URL there)
///
/// The id fallback is the first column positionally; the ID is typically
/// present even under a generic header.
fn resolve_columns(
    headers: &StringRecord,
    first_row: &StringRecord,
) -> Result<ColumnMap, ImportError> {
    let qr_code: usize = match find_column(headers, QR_CODE_SYNONYMS) {
        Some(idx) => idx,
        None => sniff_qr_column(headers, first_row)
            .ok_or(ImportError::MissingRequiredColumn { field: "qr_code" })?,
    };

    let id: Option<usize> = find_column(headers, ID_SYNONYMS).or(if headers.is_empty() {
        None
    } else {
        Some(0)
    });

    let map: ColumnMap = ColumnMap {
        id,
        qr_code,
        status: find_column(headers, STATUS_SYNONYMS),
        date: find_column(headers, DATE_SYNONYMS),
        count: find_column(headers, COUNT_SYNONYMS),
        name: find_column(headers, NAME_SYNONYMS),
        email: find_column(headers, EMAIL_SYNONYMS),
        phone: find_column(headers, PHONE_SYNONYMS),
        security_code: find_column(headers, SECURITY_CODE_SYNONYMS),
        event_name: find_column(headers, EVENT_NAME_SYNONYMS),
    };
    debug!(?map, "Resolved CSV column map");
    Ok(map)
}

/// Content-sniffing fallback for the QR column.
fn sniff_qr_column(headers: &StringRecord, first_row: &StringRecord) -> Option<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let sample: &str = first_row.get(idx).unwrap_or("");
        if sample.contains("http")
            || sample.contains("QR")
            || normalize_header(header).contains("url")
        {
            return Some(idx);
        }
    }
    // QR Code URL is usually the first column in the wild.
    if headers.is_empty() { None } else { Some(0) }
}

fn field(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Normalizes parsed records into canonical ticket rows.
///
/// Missing optional fields map to empty strings; a missing status defaults
/// to the literal "válido" and a missing count to "0", matching the sample
/// export format. Rows with an empty QR value are skipped with a warning.
///
/// # Errors
///
/// Returns [`ImportError::EmptyInput`] for zero data rows, or
/// [`ImportError::MissingRequiredColumn`] if no QR column can be bound.
pub fn normalize_rows(
    headers: &StringRecord,
    records: &[StringRecord],
) -> Result<Vec<CanonicalTicketRow>, ImportError> {
    let Some(first_row) = records.first() else {
        return Err(ImportError::EmptyInput);
    };

    let map: ColumnMap = resolve_columns(headers, first_row)?;

    let mut rows: Vec<CanonicalTicketRow> = Vec::with_capacity(records.len());
    for (row_number, record) in records.iter().enumerate() {
        let qr_code: String = field(record, Some(map.qr_code));
        if qr_code.is_empty() {
            warn!(row_number, "Skipping row with empty QR code");
            continue;
        }

        let status: String = {
            let raw: String = field(record, map.status);
            if raw.is_empty() { String::from("válido") } else { raw }
        };
        let validation_count: String = {
            let raw: String = field(record, map.count);
            if raw.is_empty() { String::from("0") } else { raw }
        };

        rows.push(CanonicalTicketRow {
            id: field(record, map.id),
            qr_code,
            name: field(record, map.name),
            email: field(record, map.email),
            phone: field(record, map.phone),
            security_code: field(record, map.security_code),
            status,
            validation_date: field(record, map.date),
            validation_count,
            event_name: field(record, map.event_name),
        });
    }

    Ok(rows)
}

/// Parses raw CSV content and normalizes it into canonical ticket rows.
///
/// Parsing uses a header row, UTF-8 decoding, and tolerates ragged rows
/// (short records read as empty fields). Everything is parsed and
/// normalized before the caller touches the store, so a malformed file
/// never causes a partial destructive import.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] for malformed CSV,
/// [`ImportError::EmptyInput`] for zero data rows, or
/// [`ImportError::MissingRequiredColumn`] if no QR column can be bound.
pub fn parse_and_normalize(csv_content: &str) -> Result<Vec<CanonicalTicketRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader.headers()?.clone();

    let mut records: Vec<StringRecord> = Vec::new();
    for result in reader.records() {
        records.push(result?);
    }

    normalize_rows(&headers, &records)
}
