//! Simple Moving Average (SMA).
//!
//! Rolling arithmetic mean of close prices over a trailing window, inclusive
//! of the current bar. No smoothing.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::components::indicator::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("MA{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    /// Each window is summed over its closes in ascending order. Two windows
    /// holding the same multiset of closes (a rotation, as on a plateau) then
    /// produce bit-identical means, which the exact-zero flatness and
    /// equality checks rely on.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let divisor = self.period as f64;
        let mut window: Vec<f64> = Vec::with_capacity(self.period);
        for (end, slot) in result.iter_mut().enumerate().skip(self.lookback()) {
            window.clear();
            window.extend(bars[end + 1 - self.period..=end].iter().map(|b| b.close));
            window.sort_by(f64::total_cmp);
            // NaN in any close makes the sum NaN, which is the undefined marker.
            let sum: f64 = window.iter().sum();
            *slot = sum / divisor;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn trailing_mean_includes_current_bar() {
        let bars = make_bars(&[50.0, 52.0, 54.0, 56.0, 58.0, 70.0]);
        let result = Sma::new(5).compute(&bars);

        assert_eq!(result.len(), 6);
        assert!(result[..4].iter().all(|v| v.is_nan()));
        assert_approx(result[4], 54.0, DEFAULT_EPSILON);
        assert_approx(result[5], 58.0, DEFAULT_EPSILON);
    }

    #[test]
    fn window_of_one_is_close() {
        let bars = make_bars(&[12.5, 13.0, 11.75]);
        let result = Sma::new(1).compute(&bars);
        assert_eq!(result, vec![12.5, 13.0, 11.75]);
    }

    #[test]
    fn nan_close_blanks_every_window_it_touches() {
        let mut bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        bars[1].close = f64::NAN;
        let result = Sma::new(3).compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert_approx(result[4], 40.0, DEFAULT_EPSILON);
        assert_approx(result[5], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn named_after_window() {
        assert_eq!(Sma::new(60).name(), "MA60");
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(1).lookback(), 0);
    }

    #[test]
    fn rotated_window_on_flat_prices_is_exact() {
        let bars = make_bars(&[100.0; 30]);
        let result = Sma::new(10).compute(&bars);
        for w in result[9..].windows(2) {
            assert_eq!(w[0], w[1]);
        }
    }

    #[test]
    fn rotated_window_on_cyclic_prices_is_bit_identical() {
        let cycle = [10.01, 20.01, 30.3, 0.7, 15.55];
        let closes: Vec<f64> = cycle.iter().copied().cycle().take(30).collect();
        let bars = make_bars(&closes);

        let ma5 = Sma::new(5).compute(&bars);
        let ma10 = Sma::new(10).compute(&bars);
        for row in 5..30 {
            assert_eq!(ma5[row].to_bits(), ma5[row - 1].to_bits(), "MA5 row {row}");
        }
        for row in 10..30 {
            assert_eq!(ma10[row].to_bits(), ma10[row - 1].to_bits(), "MA10 row {row}");
        }
        assert_approx(ma5[10], 15.314, DEFAULT_EPSILON);
    }

    #[test]
    fn fewer_bars_than_window() {
        let bars = make_bars(&[10.0, 11.0]);
        assert!(Sma::new(5).compute(&bars).iter().all(|v| v.is_nan()));
    }
}
