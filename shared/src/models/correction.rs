//! Local "reset to zero" correction of negative stock rows

use rust_decimal::Decimal;

use super::DerivedRow;

/// Notice shown when there is nothing to reset
pub const NO_NEGATIVE_STOCK_NOTICE: &str = "No negative stock items to reset.";

/// Whether the reset needs the user's confirmation before it may run.
/// Only a non-empty table can be mutated, so that is the whole rule.
pub fn reset_requires_confirmation(rows: &[DerivedRow]) -> bool {
    !rows.is_empty()
}

/// Prompt shown before resetting `count` rows
pub fn confirmation_prompt(count: usize) -> String {
    format!(
        "Reset stock to zero for {} negative stock item(s)? Need will be set to the full quantity.",
        count
    )
}

/// Quantity a corrected row needs: `qty`, else `best_sell`, else zero
pub fn correction_qty(row: &DerivedRow) -> Decimal {
    row.qty.or(row.best_sell).unwrap_or(Decimal::ZERO)
}

/// Zero the stock of every row and make the full quantity the need.
///
/// Touches only the rows passed in. Returns the number of corrected rows.
pub fn reset_negative_stock(rows: &mut [DerivedRow]) -> usize {
    for row in rows.iter_mut() {
        let qty = correction_qty(row);
        row.on_stock = Decimal::ZERO;
        row.need = qty;
        row.overload = Decimal::ZERO;
    }
    rows.len()
}
