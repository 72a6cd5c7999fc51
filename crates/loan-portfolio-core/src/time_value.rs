//! Annuity closed forms for level-payment loans.
//!
//! Sign convention follows the standard payment formula: `pv` is the positive
//! amount borrowed, payments and their components are negative outflows.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LoanPortfolioError;
use crate::types::{Money, Rate};
use crate::LoanPortfolioResult;

/// Level periodic payment (PMT) for a fully-amortizing loan.
pub fn pmt(
    rate: Rate,
    nper: u32,
    present_value: Money,
    future_value: Money,
) -> LoanPortfolioResult<Money> {
    if nper == 0 {
        return Err(LoanPortfolioError::InvalidTerms {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let one_plus_r = Decimal::ONE + rate;
    let factor = one_plus_r.powd(Decimal::from(nper));
    let annuity_factor = (factor - Decimal::ONE) / rate;

    if annuity_factor.is_zero() {
        return Err(LoanPortfolioError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

/// Outstanding balance immediately before payment `per` (1-indexed) on a
/// level-payment schedule, ignoring any extra principal paydown.
pub fn remaining_balance(
    rate: Rate,
    per: u32,
    nper: u32,
    present_value: Money,
) -> LoanPortfolioResult<Money> {
    if per == 0 || per > nper {
        return Err(LoanPortfolioError::InvalidTerms {
            field: "per".into(),
            reason: format!("Period must be in 1..={nper}, got {per}"),
        });
    }

    let payment = pmt(rate, nper, present_value, Decimal::ZERO)?;
    let elapsed = Decimal::from(per - 1);

    if rate.is_zero() {
        // Payment is negative, so the balance steps down each period.
        return Ok(present_value + payment * elapsed);
    }

    let growth = (Decimal::ONE + rate).powd(elapsed);
    Ok(present_value * growth + payment * (growth - Decimal::ONE) / rate)
}

/// Interest portion (IPMT) of payment `per`.
pub fn ipmt(rate: Rate, per: u32, nper: u32, present_value: Money) -> LoanPortfolioResult<Money> {
    let balance = remaining_balance(rate, per, nper, present_value)?;
    Ok(-(balance * rate))
}

/// Principal portion (PPMT) of payment `per`.
pub fn ppmt(rate: Rate, per: u32, nper: u32, present_value: Money) -> LoanPortfolioResult<Money> {
    let payment = pmt(rate, nper, present_value, Decimal::ZERO)?;
    let interest = ipmt(rate, per, nper, present_value)?;
    Ok(payment - interest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pmt_standard_mortgage() {
        // 5% / 12 monthly rate, 360 periods, 100k borrowed
        let rate = dec!(0.05) / dec!(12);
        let payment = pmt(rate, 360, dec!(100000), dec!(0)).unwrap();
        assert_eq!(payment.round_dp(2), dec!(-536.82));
    }

    #[test]
    fn test_pmt_zero_rate() {
        let payment = pmt(dec!(0), 10, dec!(1000), dec!(0)).unwrap();
        assert_eq!(payment, dec!(-100));
    }

    #[test]
    fn test_pmt_zero_periods_rejected() {
        assert!(pmt(dec!(0.01), 0, dec!(1000), dec!(0)).is_err());
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let rate = dec!(0.05) / dec!(12);
        let first = remaining_balance(rate, 1, 360, dec!(100000)).unwrap();
        assert_eq!(first, dec!(100000));

        // Balance before the final payment is one discounted payment away
        // from zero.
        let payment = pmt(rate, 360, dec!(100000), dec!(0)).unwrap();
        let last = remaining_balance(rate, 360, 360, dec!(100000)).unwrap();
        let after_final = last * (Decimal::ONE + rate) + payment;
        assert!(after_final.abs() < dec!(0.000001));
    }

    #[test]
    fn test_split_sums_to_payment() {
        let rate = dec!(0.05) / dec!(12);
        let payment = pmt(rate, 360, dec!(100000), dec!(0)).unwrap();
        for per in [1, 2, 180, 359, 360] {
            let i = ipmt(rate, per, 360, dec!(100000)).unwrap();
            let p = ppmt(rate, per, 360, dec!(100000)).unwrap();
            assert!((payment - (i + p)).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn test_ipmt_first_period_is_simple_interest() {
        let rate = dec!(0.05) / dec!(12);
        let i = ipmt(rate, 1, 360, dec!(100000)).unwrap();
        assert_eq!(i.round_dp(2), dec!(-416.67));
    }

    #[test]
    fn test_ppmt_out_of_range_period() {
        let rate = dec!(0.05) / dec!(12);
        assert!(ppmt(rate, 0, 360, dec!(100000)).is_err());
        assert!(ppmt(rate, 361, 360, dec!(100000)).is_err());
    }
}
