use std::collections::BTreeMap;

/// Constant-space-per-distinct-value running statistics.
///
/// Keeps count, sum, sum of squares, min/max, and a value-to-occurrences
/// frequency map over a stream of `u64` measurements (latencies in
/// milliseconds). The map is ordered, so nearest-rank percentiles are a
/// single walk with no sort step.
///
/// Not internally synchronized. Shared use goes through a mutex; the
/// intended pattern is one calculator per producer task, merged into an
/// aggregate via [`StatCalculator::add_all`] under the aggregate's lock.
#[derive(Debug, Clone)]
pub struct StatCalculator {
    count: u64,
    sum: u128,
    sum_of_squares: u128,
    min: u64,
    max: u64,
    frequency: BTreeMap<u64, u64>,
}

impl Default for StatCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatCalculator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0,
            sum_of_squares: 0,
            min: u64::MAX,
            max: 0,
            frequency: BTreeMap::new(),
        }
    }

    /// Record `value` with the given occurrence weight.
    pub fn add_value(&mut self, value: u64, weight: u64) {
        if weight == 0 {
            return;
        }
        let wide_value = u128::from(value);
        let wide_weight = u128::from(weight);
        self.count = self.count.saturating_add(weight);
        self.sum = self.sum.saturating_add(wide_value.saturating_mul(wide_weight));
        self.sum_of_squares = self.sum_of_squares.saturating_add(
            wide_value
                .saturating_mul(wide_value)
                .saturating_mul(wide_weight),
        );
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let slot = self.frequency.entry(value).or_insert(0);
        *slot = slot.saturating_add(weight);
    }

    /// Merge another calculator into this one, value by value.
    ///
    /// Used to fold a per-task (or per-interval) accumulator into a running
    /// cumulative total.
    pub fn add_all(&mut self, other: &StatCalculator) {
        for (&value, &weight) in &other.frequency {
            self.add_value(value, weight);
        }
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub const fn min(&self) -> u64 {
        if self.count == 0 { 0 } else { self.min }
    }

    #[must_use]
    pub const fn max(&self) -> u64 {
        self.max
    }

    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Mean is inherently floating point"
    )]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }

    /// Population standard deviation computed from the running sums.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Standard deviation is inherently floating point"
    )]
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let mean_of_squares = self.sum_of_squares as f64 / self.count as f64;
        let variance = mean_of_squares - mean * mean;
        if variance <= 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Nearest-rank percentile: the smallest observed value whose cumulative
    /// occurrence count reaches `ceil(fraction * count)`, with the target
    /// rank clamped to `[1, count]`. Returns an actually observed value,
    /// never an interpolation; 0 when the calculator is empty.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Rank selection multiplies the fraction before rounding up"
    )]
    pub fn percent_point(&self, fraction: f64) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let raw_rank = (fraction * self.count as f64).ceil();
        let target = if raw_rank < 1.0 {
            1
        } else if raw_rank >= self.count as f64 {
            self.count
        } else {
            raw_rank as u64
        };

        let mut seen: u64 = 0;
        for (&value, &weight) in &self.frequency {
            seen = seen.saturating_add(weight);
            if seen >= target {
                return value;
            }
        }
        self.max
    }

    #[must_use]
    pub fn median(&self) -> u64 {
        self.percent_point(0.5)
    }
}
