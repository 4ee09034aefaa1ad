//! Line-item aggregation for invoices and quotes.

use serde::Serialize;

use crate::models::{LineItem, TaxTable, TaxType};

use super::money::{apply_percentage, round_currency, sanitize};

/// Document-level totals rolled up from the line items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentTotals {
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
}

/// Per-line figures, for display next to the editable row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineBreakdown {
    pub line_total: f64,
    pub discount_amount: f64,
    /// Post-discount price. Under inclusive pricing this still carries
    /// the tax; the net amount only appears in the document subtotal.
    pub discounted_total: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
}

/// Compute one line. `quantity`, `unit_price` and `discount` are
/// sanitized on the way in; a malformed row contributes 0 everywhere.
pub fn line_breakdown(item: &LineItem, taxes: &TaxTable, tax_type: TaxType) -> LineBreakdown {
    let quantity = sanitize(item.quantity);
    let unit_price = sanitize(item.unit_price);
    let discount = sanitize(item.discount);

    let line_total = quantity * unit_price;
    let discount_amount = apply_percentage(line_total, discount);
    let discounted_total = line_total - discount_amount;

    let rate = match tax_type {
        TaxType::NoTax => 0.0,
        _ => taxes.rate_for(&item.tax_rate),
    };

    let (tax_amount, final_amount) = match tax_type {
        TaxType::Inclusive if rate > 0.0 => {
            // Price already carries the tax; extract it.
            let tax = discounted_total - discounted_total / (1.0 + rate / 100.0);
            (tax, discounted_total)
        }
        TaxType::Exclusive => {
            let tax = apply_percentage(discounted_total, rate);
            (tax, discounted_total + tax)
        }
        _ => (0.0, discounted_total),
    };

    LineBreakdown {
        line_total: round_currency(line_total),
        discount_amount: round_currency(discount_amount),
        discounted_total: round_currency(discounted_total),
        tax_amount: round_currency(tax_amount),
        final_amount: round_currency(final_amount),
    }
}

/// Roll an ordered sequence of line items into document totals.
///
/// Summation happens in input order at full precision; only the three
/// output figures are rounded. Pure and idempotent: the same items
/// always produce bit-identical totals.
pub fn compute_document_totals(
    items: &[LineItem],
    taxes: &TaxTable,
    tax_type: TaxType,
) -> DocumentTotals {
    let mut subtotal = 0.0;
    let mut total_tax = 0.0;

    for item in items {
        let quantity = sanitize(item.quantity);
        let unit_price = sanitize(item.unit_price);
        let discount = sanitize(item.discount);

        let line_total = quantity * unit_price;
        let discounted_total = line_total - apply_percentage(line_total, discount);

        let rate = match tax_type {
            TaxType::NoTax => 0.0,
            _ => taxes.rate_for(&item.tax_rate),
        };

        match tax_type {
            TaxType::Inclusive if rate > 0.0 => {
                let tax = discounted_total - discounted_total / (1.0 + rate / 100.0);
                subtotal += discounted_total - tax;
                total_tax += tax;
            }
            TaxType::Exclusive => {
                subtotal += discounted_total;
                total_tax += apply_percentage(discounted_total, rate);
            }
            _ => {
                subtotal += discounted_total;
            }
        }
    }

    let subtotal = round_currency(subtotal);
    let total_tax = round_currency(total_tax);
    DocumentTotals {
        subtotal,
        total_tax,
        total: round_currency(subtotal + total_tax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAXABLE: &str = "Tax on Sales (15%)";

    fn table() -> TaxTable {
        TaxTable::single(TAXABLE, 15.0)
    }

    fn item(quantity: f64, unit_price: f64, discount: f64, tax_rate: &str) -> LineItem {
        let mut li = LineItem::new("Freight".to_string(), quantity, unit_price);
        li.discount = discount;
        li.tax_rate = tax_rate.to_string();
        li
    }

    #[test]
    fn empty_items_yield_zero_totals() {
        let totals = compute_document_totals(&[], &table(), TaxType::Exclusive);
        assert_eq!(
            totals,
            DocumentTotals {
                subtotal: 0.0,
                total_tax: 0.0,
                total: 0.0
            }
        );
    }

    #[test]
    fn worked_example_with_discount_and_tax() {
        // 2 x 100, 10% discount, 15% tax: 200 -> 180 -> 27 -> 207.
        let items = vec![item(2.0, 100.0, 10.0, TAXABLE)];
        let b = line_breakdown(&items[0], &table(), TaxType::Exclusive);
        assert_eq!(b.line_total, 200.0);
        assert_eq!(b.discount_amount, 20.0);
        assert_eq!(b.discounted_total, 180.0);
        assert_eq!(b.tax_amount, 27.0);
        assert_eq!(b.final_amount, 207.0);

        let totals = compute_document_totals(&items, &table(), TaxType::Exclusive);
        assert_eq!(totals.subtotal, 180.0);
        assert_eq!(totals.total_tax, 27.0);
        assert_eq!(totals.total, 207.0);
    }

    #[test]
    fn exempt_lines_contribute_no_tax() {
        let items = vec![
            item(1.0, 1000.0, 0.0, TAXABLE),
            item(1.0, 1000.0, 0.0, "Exempt"),
            item(1.0, 1000.0, 0.0, ""),
        ];
        let totals = compute_document_totals(&items, &table(), TaxType::Exclusive);
        assert_eq!(totals.subtotal, 3000.0);
        assert_eq!(totals.total_tax, 150.0);
        assert_eq!(totals.total, 3150.0);
    }

    #[test]
    fn unknown_label_is_zero_rated() {
        let items = vec![item(1.0, 500.0, 0.0, "Tax on Sales (15 %)")];
        let totals = compute_document_totals(&items, &table(), TaxType::Exclusive);
        assert_eq!(totals.total_tax, 0.0);
        assert_eq!(totals.total, 500.0);
    }

    #[test]
    fn no_tax_mode_zeroes_every_line() {
        let items = vec![item(2.0, 100.0, 0.0, TAXABLE)];
        let totals = compute_document_totals(&items, &table(), TaxType::NoTax);
        assert_eq!(totals.subtotal, 200.0);
        assert_eq!(totals.total_tax, 0.0);
        assert_eq!(totals.total, 200.0);
    }

    #[test]
    fn inclusive_mode_extracts_tax_from_the_price() {
        // 230 tax-inclusive at 15%: net 200, tax 30, total stays 230.
        let items = vec![item(1.0, 230.0, 0.0, TAXABLE)];
        let totals = compute_document_totals(&items, &table(), TaxType::Inclusive);
        assert_eq!(totals.subtotal, 200.0);
        assert_eq!(totals.total_tax, 30.0);
        assert_eq!(totals.total, 230.0);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let items = vec![
            item(3.0, 19.99, 5.0, TAXABLE),
            item(1.5, 7.5, 0.0, "Exempt"),
            item(12.0, 0.35, 50.0, TAXABLE),
        ];
        let first = compute_document_totals(&items, &table(), TaxType::Exclusive);
        let second = compute_document_totals(&items, &table(), TaxType::Exclusive);
        assert_eq!(first, second);
        assert_eq!(
            round_currency(first.subtotal + first.total_tax),
            first.total
        );
    }

    #[test]
    fn malformed_numeric_fields_contribute_zero() {
        // Lenient deserialization turns a non-numeric quantity into 0.
        let raw = r#"{
            "description": "Detention fee",
            "quantity": "abc",
            "unit_price": 100.0,
            "tax_rate": "Tax on Sales (15%)"
        }"#;
        let bad: LineItem = serde_json::from_str(raw).unwrap();
        assert_eq!(bad.quantity, 0.0);

        let items = vec![bad, item(2.0, 100.0, 10.0, TAXABLE)];
        let totals = compute_document_totals(&items, &table(), TaxType::Exclusive);
        assert_eq!(totals.subtotal, 180.0);
        assert_eq!(totals.total_tax, 27.0);
        assert_eq!(totals.total, 207.0);
    }
}
