//! Chunk rendering: one partner group → one canonical text block
//!
//! The chunk is the unit shared by the write path (embedded and stored as
//! point payload) and the read path (fed to answer synthesis), so rendering
//! must be a pure function of its input: re-aggregating identical rows must
//! reproduce byte-identical text.

use crate::store::Row;

/// Render a partner's rows into the canonical chunk text
///
/// One `Partner: <name>` header line followed by one line per row. Every
/// field falls back to its default, so this function never fails; an empty
/// row set renders as an empty string, which callers treat as "do not
/// index".
#[must_use]
pub fn build_chunk(partner_name: &str, rows: &[Row]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!("Partner: {partner_name}"));

    for row in rows {
        lines.push(
            [
                format!("Offer: {}", row.offer_reference),
                format!("Country: {}", row.countries.join(", ")),
                format!("Currency: {}", row.currencies.join(", ")),
                format!("Status: {}", row.status),
                format!("Payment fee: {}", row.payment_fee),
                format!("Risk: {}", row.risk_types.join(", ")),
                format!("For LPM: {}", row.lpm_count),
            ]
            .join("; "),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row {
            offer_reference: "ACME-001".to_string(),
            countries: vec!["Brazil".to_string(), "Mexico".to_string()],
            currencies: vec!["BRL".to_string(), "USD".to_string()],
            status: "Active".to_string(),
            payment_fee: "2.5".to_string(),
            risk_types: vec!["Medium".to_string()],
            lpm_count: 2,
            ..Row::default()
        }
    }

    #[test]
    fn test_chunk_format() {
        let chunk = build_chunk("Acme", &[sample_row()]);
        assert_eq!(
            chunk,
            "Partner: Acme\n\
             Offer: ACME-001; Country: Brazil, Mexico; Currency: BRL, USD; \
             Status: Active; Payment fee: 2.5; Risk: Medium; For LPM: 2"
        );
    }

    #[test]
    fn test_chunk_is_deterministic() {
        let rows = vec![sample_row(), Row::default(), sample_row()];
        let first = build_chunk("Acme", &rows);
        let second = build_chunk("Acme", &rows);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_rows_render_empty() {
        assert_eq!(build_chunk("Acme", &[]), "");
    }

    #[test]
    fn test_default_row_renders_with_fallbacks() {
        let chunk = build_chunk("Acme", &[Row::default()]);
        assert_eq!(
            chunk,
            "Partner: Acme\n\
             Offer: ; Country: ; Currency: ; Status: ; Payment fee: ; \
             Risk: ; For LPM: 0"
        );
    }
}
