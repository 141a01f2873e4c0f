//! Quantity discount ladder

use crate::params::ParameterSnapshot;

/// Prefix of quantity-break parameter ids (`qty_break_<N>`)
pub const QTY_BREAK_PREFIX: &str = "qty_break_";

/// Historical spelling carried a `_pct` suffix (`qty_break_10_pct`)
const QTY_BREAK_SUFFIX: &str = "_pct";

/// Ladder used when no live parameters are available, as (threshold, fraction)
pub const FALLBACK_LADDER: [(u32, f64); 3] = [(100, 0.20), (50, 0.15), (10, 0.10)];

/// Parse the threshold out of a quantity-break parameter id
///
/// Returns None for ids that are not quantity breaks or whose threshold is
/// not a positive integer.
pub fn parse_threshold(id: &str) -> Option<u32> {
    let rest = id.strip_prefix(QTY_BREAK_PREFIX)?;
    let digits = rest.strip_suffix(QTY_BREAK_SUFFIX).unwrap_or(rest);
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

/// Quantity breaks present in a snapshot, ascending by threshold
///
/// Negative or non-finite percentages are ignored like missing ones.
pub fn quantity_breaks(params: &ParameterSnapshot) -> Vec<(u32, f64)> {
    let mut breaks: Vec<(u32, f64)> = params
        .iter()
        .filter_map(|(id, pct)| {
            let threshold = parse_threshold(id)?;
            (pct.is_finite() && pct >= 0.0).then_some((threshold, pct))
        })
        .collect();
    breaks.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    breaks
}

/// Discount fraction unlocked at `quantity`
///
/// With a snapshot: the largest `pct / 100` among breaks whose threshold is
/// `<= quantity`, or 0 when none qualify. Without one: [`FALLBACK_LADDER`].
/// The result is capped at 1.0 so a subtotal can never go negative.
pub fn discount_fraction(quantity: u32, params: Option<&ParameterSnapshot>) -> f64 {
    let fraction = match params {
        Some(params) => quantity_breaks(params)
            .into_iter()
            .take_while(|(threshold, _)| *threshold <= quantity)
            .map(|(_, pct)| pct / 100.0)
            .fold(0.0, f64::max),
        None => FALLBACK_LADDER
            .iter()
            .find(|(threshold, _)| quantity >= *threshold)
            .map(|(_, fraction)| *fraction)
            .unwrap_or(0.0),
    };
    fraction.min(1.0)
}
