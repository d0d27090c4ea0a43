// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sample CSV generation for the import UI.

/// Renders the three-row sample export staff can download as a template.
///
/// Uses the fixed column headers of the reference export format; the
/// third row demonstrates an already-used ticket.
#[must_use]
pub fn sample_csv() -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let rows: [[&str; 5]; 4] = [
        [
            "ID",
            "Código QR",
            "Status de Validação",
            "Data/Hora da Validação",
            "Número de utilizações",
        ],
        ["TKT001", "QR123456789", "válido", "", "0"],
        ["TKT002", "QR987654321", "válido", "", "0"],
        ["TKT003", "QR555666777", "usado", "2024-01-15T19:30:00Z", "1"],
    ];

    for row in rows {
        // Writing to a Vec cannot fail.
        let _ = writer.write_record(row);
    }

    writer
        .into_inner()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
