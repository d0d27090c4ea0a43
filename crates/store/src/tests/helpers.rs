// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use porteiro_domain::CanonicalTicketRow;

/// Builds canonical rows for the given QR codes, one valid ticket each.
pub fn rows(qr_codes: &[&str]) -> Vec<CanonicalTicketRow> {
    qr_codes
        .iter()
        .enumerate()
        .map(|(index, qr_code)| CanonicalTicketRow {
            id: format!("TKT{index:03}"),
            qr_code: (*qr_code).to_string(),
            name: format!("Holder {index}"),
            status: String::from("válido"),
            validation_count: String::from("0"),
            event_name: String::from("Festival 2026"),
            ..CanonicalTicketRow::default()
        })
        .collect()
}

/// Parses the reference sample export into canonical rows.
pub fn sample_rows() -> Vec<CanonicalTicketRow> {
    porteiro_import::parse_and_normalize(&porteiro_import::sample_csv())
        .expect("sample CSV must normalize")
}
