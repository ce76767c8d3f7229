//! Balance Arithmetic Module
//!
//! Unified conversion between client-facing decimal strings and the canonical
//! scale-2 `Decimal` balance representation, plus the single function that is
//! allowed to compute a new balance. All balance math MUST go through this
//! module.
//!
//! ## Design Principles
//! 1. Exact arithmetic: `rust_decimal` end to end, never binary floating point
//! 2. Explicit error handling: no silent truncation, no silent rounding
//! 3. Canonical encoding: every persisted balance has exactly 2 decimal places

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::BankError;
use crate::ledger::TransactionKind;

/// Fractional digits of the canonical balance encoding
pub const BALANCE_SCALE: u32 = 2;

/// Parse a client-supplied amount string into an exact positive Decimal.
///
/// Strict format: plain decimal digits with an optional fractional part of at
/// most [`BALANCE_SCALE`] digits. Rejected outright: empty strings, signs
/// (`+1`, `-1`), bare dots (`.5`, `5.`), scientific notation, separators and
/// anything non-positive.
pub fn parse_amount(amount_str: &str) -> Result<Decimal, BankError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(BankError::InvalidAmount);
    }
    if amount_str.starts_with('-') || amount_str.starts_with('+') {
        return Err(BankError::InvalidAmount);
    }

    let parts: Vec<&str> = amount_str.split('.').collect();
    let (whole, frac) = match parts.len() {
        1 => (parts[0], ""),
        // Require both sides of the dot to be non-empty: no ".5" or "5."
        2 => {
            if parts[0].is_empty() || parts[1].is_empty() {
                return Err(BankError::InvalidAmount);
            }
            (parts[0], parts[1])
        }
        _ => return Err(BankError::InvalidAmount),
    };

    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BankError::InvalidAmount);
    }

    // No silent truncation: more than 2 fractional digits is the caller's bug
    if frac.len() > BALANCE_SCALE as usize {
        return Err(BankError::InvalidAmount);
    }

    let amount = Decimal::from_str(amount_str).map_err(|_| BankError::InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(BankError::InvalidAmount);
    }

    canonical(amount)
}

/// Compute the balance resulting from applying `amount` to `current`.
///
/// Debits (`Withdrawal`, `TransferOut`) require `amount <= current`; credits
/// (`Deposit`, `TransferIn`) always succeed. `Fee`/`Interest` are not valid
/// inputs here. The result is re-encoded at exactly [`BALANCE_SCALE`] digits;
/// an encoding failure is a fatal calculation error, never a silent clamp.
pub fn compute_new_balance(
    current: Decimal,
    amount: Decimal,
    kind: TransactionKind,
) -> Result<Decimal, BankError> {
    if amount <= Decimal::ZERO {
        return Err(BankError::InvalidAmount);
    }

    let raw = match kind {
        TransactionKind::Withdrawal | TransactionKind::TransferOut => {
            if amount > current {
                return Err(BankError::InsufficientFunds);
            }
            current
                .checked_sub(amount)
                .ok_or(BankError::InternalCalculationError)?
        }
        TransactionKind::Deposit | TransactionKind::TransferIn => current
            .checked_add(amount)
            .ok_or(BankError::InternalCalculationError)?,
        TransactionKind::Fee | TransactionKind::Interest => {
            return Err(BankError::InternalCalculationError);
        }
    };

    canonical(raw)
}

/// Re-encode a value at the canonical balance scale.
///
/// Scale can only shrink here when the input carries trailing zeros; a value
/// with genuine sub-cent precision is a calculation bug upstream.
fn canonical(value: Decimal) -> Result<Decimal, BankError> {
    if value.round_dp(BALANCE_SCALE) != value {
        return Err(BankError::InternalCalculationError);
    }
    let mut value = value;
    value.rescale(BALANCE_SCALE);
    Ok(value)
}

/// Format a balance or amount as the exact decimal string clients receive.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.prec$}", value, prec = BALANCE_SCALE as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ========================================================================
    // parse_amount
    // ========================================================================

    #[test]
    fn parse_amount_variations() {
        assert_eq!(parse_amount("1.23").unwrap(), dec("1.23"));
        assert_eq!(parse_amount("40").unwrap(), dec("40.00"));
        assert_eq!(parse_amount("001.2").unwrap(), dec("1.20"));
        assert_eq!(parse_amount(" 12.50 ").unwrap(), dec("12.50"));
        assert_eq!(parse_amount("0.01").unwrap(), dec("0.01"));
    }

    #[test]
    fn parse_amount_rejects_non_positive() {
        assert!(matches!(parse_amount("0"), Err(BankError::InvalidAmount)));
        assert!(matches!(
            parse_amount("0.00"),
            Err(BankError::InvalidAmount)
        ));
        assert!(matches!(
            parse_amount("-1.50"),
            Err(BankError::InvalidAmount)
        ));
    }

    #[test]
    fn parse_amount_invalid_formats() {
        for case in [
            "",          // empty
            "1,000.00",  // commas
            "1.2.3",     // multiple dots
            "1. 23",     // inner space
            "+1.23",     // explicit plus
            "1e2",       // scientific notation
            "0x12",      // hex
            ".",         // bare dot
            ".5",        // missing leading zero (STRICT)
            "5.",        // missing fractional part (STRICT)
            "1.234",     // more than 2 decimal places (no truncation)
            "abc",       // not a number
        ] {
            assert!(
                matches!(parse_amount(case), Err(BankError::InvalidAmount)),
                "should reject: {:?}",
                case
            );
        }
    }

    // ========================================================================
    // compute_new_balance
    // ========================================================================

    #[test]
    fn withdrawal_is_exact_inverse_of_its_amount() {
        // For all b and positive a <= b: (b - a) + a == b, exactly.
        let balances = ["0.01", "1.00", "99.99", "1000.00", "123456789.10"];
        let amounts = ["0.01", "0.99", "1.00", "50.55"];
        for b in balances {
            for a in amounts {
                let (b, a) = (dec(b), dec(a));
                if a > b {
                    continue;
                }
                let after = compute_new_balance(b, a, TransactionKind::Withdrawal).unwrap();
                assert_eq!(after + a, b, "b={} a={}", b, a);
                assert_eq!(after.scale(), BALANCE_SCALE);
            }
        }
    }

    #[test]
    fn withdrawal_beyond_balance_fails() {
        let res = compute_new_balance(dec("10.00"), dec("10.01"), TransactionKind::Withdrawal);
        assert!(matches!(res, Err(BankError::InsufficientFunds)));

        let res = compute_new_balance(dec("0.00"), dec("0.01"), TransactionKind::TransferOut);
        assert!(matches!(res, Err(BankError::InsufficientFunds)));
    }

    #[test]
    fn withdrawal_of_entire_balance_reaches_zero() {
        let after = compute_new_balance(dec("42.42"), dec("42.42"), TransactionKind::TransferOut)
            .unwrap();
        assert_eq!(after, dec("0.00"));
        assert_eq!(format_amount(after), "0.00");
    }

    #[test]
    fn deposit_and_transfer_in_add() {
        assert_eq!(
            compute_new_balance(dec("100.00"), dec("40.00"), TransactionKind::TransferIn).unwrap(),
            dec("140.00")
        );
        assert_eq!(
            compute_new_balance(dec("0.00"), dec("0.01"), TransactionKind::Deposit).unwrap(),
            dec("0.01")
        );
    }

    #[test]
    fn non_positive_amount_fails_for_every_kind() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::TransferIn,
            TransactionKind::TransferOut,
        ] {
            assert!(matches!(
                compute_new_balance(dec("100.00"), Decimal::ZERO, kind),
                Err(BankError::InvalidAmount)
            ));
            assert!(matches!(
                compute_new_balance(dec("100.00"), dec("-5.00"), kind),
                Err(BankError::InvalidAmount)
            ));
        }
    }

    #[test]
    fn fee_and_interest_are_not_computable_kinds() {
        assert!(matches!(
            compute_new_balance(dec("100.00"), dec("1.00"), TransactionKind::Fee),
            Err(BankError::InternalCalculationError)
        ));
        assert!(matches!(
            compute_new_balance(dec("100.00"), dec("1.00"), TransactionKind::Interest),
            Err(BankError::InternalCalculationError)
        ));
    }

    #[test]
    fn result_is_canonically_scaled() {
        // 1.5 + 1.5 = 3 at scale 1; canonical encoding must still be "3.00"
        let after = compute_new_balance(dec("1.5"), dec("1.5"), TransactionKind::Deposit).unwrap();
        assert_eq!(after.scale(), BALANCE_SCALE);
        assert_eq!(format_amount(after), "3.00");
    }

    // ========================================================================
    // format_amount
    // ========================================================================

    #[test]
    fn format_amount_always_two_places() {
        assert_eq!(format_amount(dec("0")), "0.00");
        assert_eq!(format_amount(dec("1.5")), "1.50");
        assert_eq!(format_amount(dec("100")), "100.00");
        assert_eq!(format_amount(dec("99.99")), "99.99");
    }

    #[test]
    fn parse_format_round_trip() {
        for s in ["0.01", "1.00", "12.50", "99999.99"] {
            let parsed = parse_amount(s).unwrap();
            assert_eq!(format_amount(parsed), s);
            assert_eq!(parse_amount(&format_amount(parsed)).unwrap(), parsed);
        }
    }
}
