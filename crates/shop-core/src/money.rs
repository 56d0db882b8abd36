//! # Money
//!
//! Decimal price helpers. Prices travel as strings and are formatted in
//! Brazilian reais for display.

use crate::model::CartItemWithProduct;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal price string (`"89.99"`)
pub fn parse_price(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

/// Sum of `price × quantity` over a joined cart
pub fn cart_total(items: &[CartItemWithProduct]) -> Decimal {
    items.iter().map(CartItemWithProduct::subtotal).sum()
}

/// Format an amount as pt-BR currency, e.g. `R$ 1.234,56`
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("{}R$ {},{}", sign, grouped, frac_part)
}
