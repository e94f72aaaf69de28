//! Derived distributions
//!
//! Everything here is built on [`RngContext::uniform`] and budgets only.
//! Invalid parameters are programming errors; how they surface depends on
//! [`Strictness`]:
//! - `Strict`: `Err(ProgrammingError::InvalidRange)`, nothing drawn
//! - `Lenient`: a warning, nothing drawn, and the fallback value
//!
//! | function            | range            | fallback |
//! |---------------------|------------------|----------|
//! | `uniform_range`     | `[0, x)`         | 0        |
//! | `biased_range`      | `[0, x)`         | 0        |
//! | `die_roll`          | `[1, x]`         | 1        |
//! | `dice_sum`          | `[n, n*x]`       | 1        |
//! | `bounded_geometric` | `[1, max(cap,1)]`| 1        |

use crate::config::Strictness;
use crate::error::{ProgrammingError, RngError};
use crate::rng::{RngContext, StreamId};
use tracing::{error, warn};

/// Numerator/denominator scale of `scaled_ratio`
const RATIO_SCALE: i64 = 1000;

/// Base of the gate draw in `biased_range`
const BIAS_GATE_BASE: i64 = 37;

/// Ranges at or below this size use a damped bias
const SMALL_RANGE: i32 = 15;

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl RngContext {
    fn invalid_range<T>(
        &self,
        operation: &'static str,
        args: &[i64],
        fallback: T,
    ) -> Result<T, RngError> {
        let err = ProgrammingError::InvalidRange {
            operation,
            args: args.to_vec(),
        };
        match self.config.strictness {
            Strictness::Strict => {
                error!(%err, "RNG invariant violated");
                Err(err.into())
            }
            Strictness::Lenient => {
                warn!(%err, "invalid RNG range, using fallback");
                Ok(fallback)
            }
        }
    }

    /// Uniform integer in `[0, x)`.
    ///
    /// # Example
    /// ```
    /// use stream_rng_core_rs::{RngConfig, RngContext, StreamId};
    ///
    /// let mut rng = RngContext::from_seed(RngConfig::default(), [3u8; 32]).unwrap();
    /// let v = rng.uniform_range(StreamId::Core, 6).unwrap();
    /// assert!((0..6).contains(&v));
    /// ```
    pub fn uniform_range(&mut self, stream: StreamId, x: i32) -> Result<i32, RngError> {
        if x <= 0 {
            return self.invalid_range("uniform_range", &[x as i64], 0);
        }
        Ok(self.uniform(stream, x as u32) as i32)
    }

    /// Integer in `[0, x)` nudged toward 0 by a positive `bias` (toward
    /// `x - 1` by a negative one).
    ///
    /// For `x <= 15` the bias is damped to `(|bias| + 1) / 3`, keeping its
    /// sign. With a non-zero adjustment a gate word decides whether it
    /// applies at all: it does unless the gate lands on 0.
    pub fn biased_range(&mut self, stream: StreamId, x: i32, bias: i32) -> Result<i32, RngError> {
        if x <= 0 {
            return self.invalid_range("biased_range", &[x as i64, bias as i64], 0);
        }

        let bias = bias as i64;
        let adjustment = if x <= SMALL_RANGE {
            (bias.abs() + 1) / 3 * bias.signum()
        } else {
            bias
        };

        let mut i = self.uniform(stream, x as u32) as i64;
        if adjustment != 0 {
            let gate_range = (BIAS_GATE_BASE + adjustment.abs()).min(u32::MAX as i64) as u32;
            if self.uniform(stream, gate_range) != 0 {
                i = (i - adjustment).clamp(0, x as i64 - 1);
            }
        }
        Ok(i as i32)
    }

    /// One die with `x` faces: `[1, x]`.
    pub fn die_roll(&mut self, stream: StreamId, x: i32) -> Result<i32, RngError> {
        if x <= 0 {
            return self.invalid_range("die_roll", &[x as i64], 1);
        }
        Ok(1 + self.uniform(stream, x as u32) as i32)
    }

    /// Sum of `n` dice with `x` faces: `[n, n*x]`.
    ///
    /// Requires `n >= 0`, `x >= 0`, and `n == 0` whenever `x == 0`.
    pub fn dice_sum(&mut self, stream: StreamId, n: i32, x: i32) -> Result<i32, RngError> {
        if n < 0 || x < 0 || (x == 0 && n != 0) {
            return self.invalid_range("dice_sum", &[n as i64, x as i64], 1);
        }

        let mut total = n as i64;
        for _ in 0..n {
            total += self.uniform(stream, x as u32) as i64;
        }
        Ok(saturate(total))
    }

    /// Counts successive `uniform_range(x) == 0` successes, starting at 1 and
    /// stopping at `cap`.
    ///
    /// Runs inside a budget of `cap - 1`, so the stream always advances by
    /// exactly `cap - 1` words whatever the number of successes. A lenient
    /// fallback for `x <= 0` advances by the same amount.
    pub fn bounded_geometric(
        &mut self,
        stream: StreamId,
        x: i32,
        cap: i32,
    ) -> Result<i32, RngError> {
        let budget = (cap as i64 - 1).max(0);
        if x <= 0 {
            let fallback = self.invalid_range("bounded_geometric", &[x as i64, cap as i64], 1)?;
            return self.with_budget(stream, budget, |_| Ok(fallback));
        }

        self.with_budget(stream, budget, |rng| {
            let mut count = 1;
            while count < cap && rng.uniform(stream, x as u32) == 0 {
                count += 1;
            }
            Ok(count)
        })
    }

    /// Randomly scaled variant of `i`.
    ///
    /// A factor in `[1000, 2000)` is multiplied by a bounded geometric draw
    /// (`x = 4`, cap from [`RngConfig::geometric_cap`]); a coin then picks
    /// `i * factor / 1000` or `i * 1000 / factor`.
    ///
    /// [`RngConfig::geometric_cap`]: crate::RngConfig::geometric_cap
    pub fn scaled_ratio(&mut self, stream: StreamId, i: i32) -> Result<i32, RngError> {
        let cap = self.config.geometric_cap;

        let mut factor = RATIO_SCALE + self.uniform_range(stream, RATIO_SCALE as i32)? as i64;
        factor *= self.bounded_geometric(stream, 4, cap)? as i64;

        let x = i as i64;
        let scaled = if self.uniform_range(stream, 2)? != 0 {
            x * factor / RATIO_SCALE
        } else {
            x * RATIO_SCALE / factor
        };
        Ok(saturate(scaled))
    }
}
