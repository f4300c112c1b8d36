//! Offset calculation: glyph space + line-height to CSS length expressions.

use crate::metrics::SpaceValues;

/// Margin expressions for the top and bottom edges.
///
/// An empty string means "no margin needed on that edge".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Offsets {
    pub before: String,
    pub after: String,
}

impl Offsets {
    /// Returns true when neither edge needs a correction.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Compute margin expressions for `space` at the given (normalized) line-height.
///
/// `unit` is empty for unitless line-heights; any other unit can't be resolved to `em` here, so
/// the correction is left to the browser as a `calc()` expression.
pub fn compute_offsets(space: SpaceValues, line_height: f64, unit: &str) -> Offsets {
    if space.before == 0.0 && space.after == 0.0 && line_height == 1.0 {
        return Offsets::default();
    }

    if unit.is_empty() {
        let height_correction = (line_height - 1.0) / 2.0;
        let em = |s: f64| format!("{}em", format_number(round2(-s - height_correction)));
        return Offsets {
            before: em(space.before),
            after: em(space.after),
        };
    }

    let calc = |s: f64| {
        format!(
            "calc({}em - ({}{unit} - 1em) / 2)",
            format_number(-s),
            format_number(line_height),
        )
    };
    Offsets {
        before: calc(space.before),
        after: calc(space.after),
    }
}

/// Round to two decimals, half away from zero, on the shortest decimal representation.
///
/// Rounding the decimal text (rather than `x * 100`) keeps values like `1.005` from landing on
/// `1.00` because of binary representation error.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() || x.abs() >= 1e15 {
        return x;
    }

    let repr = x.abs().to_string();
    let Some((int, frac)) = repr.split_once('.') else {
        return x;
    };
    let frac = frac.as_bytes();
    if frac.len() <= 2 {
        return x;
    }

    let Ok(int) = int.parse::<u64>() else {
        return x;
    };
    let mut cents = int * 100 + u64::from(frac[0] - b'0') * 10 + u64::from(frac[1] - b'0');
    if frac[2] >= b'5' {
        cents += 1;
    }
    (cents as f64 / 100.0).copysign(x)
}

/// Print a number the way CSS authors write it: shortest decimal, no `-0`.
pub fn format_number(x: f64) -> String {
    if x == 0.0 {
        "0".to_string()
    } else {
        x.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(before: f64, after: f64) -> SpaceValues {
        SpaceValues { before, after }
    }

    #[test]
    fn no_correction_needed() {
        let o = compute_offsets(space(0.0, 0.0), 1.0, "");
        assert!(o.is_empty());
        // The shortcut ignores the unit, like the line-height of `1px` would.
        assert!(compute_offsets(space(0.0, 0.0), 1.0, "px").is_empty());
    }

    #[test]
    fn unitless_line_height() {
        let o = compute_offsets(space(0.13, 0.17), 2.0, "");
        assert_eq!(o.before, "-0.63em");
        assert_eq!(o.after, "-0.67em");

        let o = compute_offsets(space(0.13, 0.17), 1.5, "");
        assert_eq!(o.before, "-0.38em");
        assert_eq!(o.after, "-0.42em");
    }

    #[test]
    fn zero_space_with_line_height() {
        let o = compute_offsets(space(0.0, 0.0), 2.0, "");
        assert_eq!(o.before, "-0.5em");
        assert_eq!(o.after, "-0.5em");
    }

    #[test]
    fn line_height_below_one_gives_positive_offsets() {
        let o = compute_offsets(space(0.0, 0.0), 0.5, "");
        assert_eq!(o.before, "0.25em");
    }

    #[test]
    fn non_em_unit_uses_calc() {
        let o = compute_offsets(space(0.13, 0.17), 24.0, "px");
        assert_eq!(o.before, "calc(-0.13em - (24px - 1em) / 2)");
        assert_eq!(o.after, "calc(-0.17em - (24px - 1em) / 2)");

        let o = compute_offsets(space(0.0, 0.0), 1.5, "rem");
        assert_eq!(o.before, "calc(0em - (1.5rem - 1em) / 2)");
    }

    #[test]
    fn calc_keeps_space_unrounded() {
        let o = compute_offsets(space(0.125, 0.0), 20.0, "pt");
        assert_eq!(o.before, "calc(-0.125em - (20pt - 1em) / 2)");
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(-0.6300000000000001), -0.63);
        assert_eq!(round2(0.5), 0.5);
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn formats_without_negative_zero() {
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(round2(-0.001)), "0");
        assert_eq!(format_number(24.0), "24");
        assert_eq!(format_number(-0.63), "-0.63");
    }

    #[test]
    fn offsets_are_a_pure_function_of_inputs() {
        let a = compute_offsets(space(0.17, 0.16), 1.5, "");
        let b = compute_offsets(space(0.17, 0.16), 1.5, "");
        assert_eq!(a, b);
        assert_eq!(a.before, "-0.42em");
        assert_eq!(a.after, "-0.41em");
    }
}
