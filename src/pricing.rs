//! Money math for the storefront. All amounts are integer cents.

/// Sales tax applied at checkout review and commit, in percent.
pub const TAX_RATE_PERCENT: i64 = 8;

pub fn line_subtotal(price: i64, quantity: i32) -> i64 {
    price * quantity as i64
}

/// Tax on a subtotal, rounded half-up to the cent.
pub fn tax_on(subtotal: i64) -> i64 {
    (subtotal * TAX_RATE_PERCENT + 50) / 100
}

pub fn order_total(subtotal: i64) -> i64 {
    subtotal + tax_on(subtotal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_eight_percent() {
        assert_eq!(tax_on(2500), 200);
        assert_eq!(tax_on(0), 0);
        assert_eq!(tax_on(100), 8);
    }

    #[test]
    fn tax_rounds_half_up_to_the_cent() {
        // 12.34 * 8% = 0.9872 -> 0.99
        assert_eq!(tax_on(1234), 99);
        // 1.06 * 8% = 0.0848 -> 0.08
        assert_eq!(tax_on(106), 8);
        // 0.63 * 8% = 0.0504 -> 0.05
        assert_eq!(tax_on(63), 5);
    }

    #[test]
    fn worked_checkout_example() {
        // {A: 2 @ 10.00, B: 1 @ 5.00} -> subtotal 25.00, tax 2.00, total 27.00
        let subtotal = line_subtotal(1000, 2) + line_subtotal(500, 1);
        assert_eq!(subtotal, 2500);
        assert_eq!(tax_on(subtotal), 200);
        assert_eq!(order_total(subtotal), 2700);
    }
}
