//! Budgeted consumption
//!
//! A budget declares "at most N draws from this stream". When it is
//! released, the stream is skipped forward so that it ends where it would
//! have ended had exactly N words been drawn. Code after the budget therefore
//! sees the same words no matter which branch ran inside it.
//!
//! Budgets nest. A released child credits its *declared* amount to its
//! parent, so reservations compose additively up the stack. Release must
//! follow strict LIFO order per stream; anything else is a
//! [`ProgrammingError::BudgetOrder`].
//!
//! # Example
//! ```
//! use stream_rng_core_rs::{RngConfig, RngContext, StreamId};
//!
//! let mut rng = RngContext::from_seed(RngConfig::default(), [9u8; 32]).unwrap();
//!
//! rng.with_budget(StreamId::Core, 10, |rng| {
//!     // Stop early on some condition; the remaining 7 words are skipped.
//!     for _ in 0..3 {
//!         rng.draw(StreamId::Core);
//!     }
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(rng.position(StreamId::Core), 10);
//! ```

use crate::config::OverflowPolicy;
use crate::error::{ProgrammingError, RngError};
use crate::rng::context::RngContext;
use crate::rng::stream::{same_block, StreamId};
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, warn};

/// Budget identities, unique across every context in the process
static NEXT_BUDGET_SERIAL: AtomicU64 = AtomicU64::new(0);

/// One entry of a stream's budget stack
#[derive(Debug, Clone)]
pub(crate) struct BudgetRecord {
    pub(crate) serial: u64,
    pub(crate) budget: i64,
    /// Words drawn while this record was on top
    pub(crate) direct: i64,
    /// Declared budgets of released children
    pub(crate) indirect: i64,
    pub(crate) depth: usize,
    pub(crate) origin: &'static Location<'static>,
}

/// Token for an active budget; pass it back to
/// [`RngContext::destroy_budget`].
#[derive(Debug)]
#[must_use = "an unreleased budget blocks persistence and skews later draws"]
pub struct BudgetHandle {
    stream: StreamId,
    serial: u64,
    depth: usize,
    origin: &'static Location<'static>,
}

impl BudgetHandle {
    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// 0 for an outermost budget.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Where the budget was created.
    pub fn origin(&self) -> &'static Location<'static> {
        self.origin
    }
}

/// Accounting of a released budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetReport {
    pub budget: i64,
    pub direct: i64,
    pub indirect: i64,
    /// `budget - direct - indirect`; negative on overflow
    pub leftover: i64,
    /// Stream position after the release
    pub position: u64,
}

impl BudgetReport {
    pub fn overflowed(&self) -> bool {
        self.leftover < 0
    }
}

impl RngContext {
    /// Pushes a budget of `budget` draws onto `stream`'s stack.
    #[track_caller]
    pub fn create_budget(&mut self, stream: StreamId, budget: i64) -> BudgetHandle {
        let origin = Location::caller();
        let serial = NEXT_BUDGET_SERIAL.fetch_add(1, Ordering::Relaxed);

        let budgets = &mut self.streams[stream.index()].budgets;
        let depth = budgets.last().map_or(0, |parent| parent.depth + 1);
        budgets.push(BudgetRecord {
            serial,
            budget,
            direct: 0,
            indirect: 0,
            depth,
            origin,
        });
        debug!(%stream, budget, depth, %origin, "RNG budget created");

        BudgetHandle {
            stream,
            serial,
            depth,
            origin,
        }
    }

    /// Releases the budget on top of its stream and skips the stream past
    /// any unused reservation.
    ///
    /// Positions never move backward: an overflowing budget is only reported.
    /// Under [`OverflowPolicy::Reject`] the release still completes before
    /// the overflow error is returned.
    pub fn destroy_budget(&mut self, handle: BudgetHandle) -> Result<BudgetReport, RngError> {
        let stream = handle.stream;
        let policy = self.config.overflow_policy;
        let state = &mut self.streams[stream.index()];

        let top = state.budgets.last().map(|r| (r.serial, r.origin));
        let record = match top {
            Some((serial, _)) if serial == handle.serial => state.budgets.pop(),
            _ => None,
        };
        let Some(record) = record else {
            let err = ProgrammingError::BudgetOrder {
                stream,
                released: handle.origin,
                top: top.map(|(_, origin)| origin),
            };
            error!(%err, "RNG invariant violated");
            return Err(err.into());
        };

        let leftover = record.budget - record.direct - record.indirect;

        state.budgeted_position = state.budgeted_position.wrapping_add_signed(leftover);
        if state.budgeted_position > state.position {
            state.block_valid =
                state.block_valid && same_block(state.position, state.budgeted_position);
            state.position = state.budgeted_position;
        }

        if let Some(parent) = state.budgets.last_mut() {
            parent.indirect += record.budget;
        }

        let report = BudgetReport {
            budget: record.budget,
            direct: record.direct,
            indirect: record.indirect,
            leftover,
            position: state.position,
        };
        debug!(%stream, leftover, position = state.position, "RNG budget released");

        if report.overflowed() {
            warn!(
                %stream,
                origin = %record.origin,
                budget = record.budget,
                direct = record.direct,
                indirect = record.indirect,
                "RNG budget overflowed"
            );
            if policy == OverflowPolicy::Reject {
                return Err(ProgrammingError::BudgetOverflow {
                    origin: record.origin,
                    budget: record.budget,
                    direct: record.direct,
                    indirect: record.indirect,
                }
                .into());
            }
        }

        Ok(report)
    }

    /// Runs `f` inside a budget that is released on every exit path.
    ///
    /// An error from `f` takes precedence over an error from the release.
    #[track_caller]
    pub fn with_budget<T, F>(&mut self, stream: StreamId, budget: i64, f: F) -> Result<T, RngError>
    where
        F: FnOnce(&mut RngContext) -> Result<T, RngError>,
    {
        let handle = self.create_budget(stream, budget);
        let result = f(self);
        let released = self.destroy_budget(handle);

        let value = result?;
        released?;
        Ok(value)
    }
}
