use rust_decimal::Decimal;

/// Fee yield of a single sampling step for a reported annual percentage rate.
///
/// `apr_pct` is in percent (12.5 = 12.5%). Returns zero for non-positive
/// inputs.
pub fn per_step_yield(apr_pct: Decimal, steps_per_year: Decimal) -> Decimal {
    if apr_pct <= Decimal::ZERO || steps_per_year <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    apr_pct / Decimal::ONE_HUNDRED / steps_per_year
}

/// Annualizes a gain over `principal` earned during `days`.
///
/// Returns zero when the principal or the elapsed time is not positive.
pub fn annualize_return(gain: Decimal, principal: Decimal, days: Decimal) -> Decimal {
    if principal <= Decimal::ZERO || days <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let roi = gain / principal;
    roi * Decimal::from(365) / days
}
