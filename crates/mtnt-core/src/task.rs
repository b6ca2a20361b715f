use crate::error::{Result, TrackerError};
use chrono::{DateTime, TimeDelta, Utc};

const MICROS_PER_SEC: i128 = 1_000_000;
const NANOS_PER_MICRO: i128 = 1_000;

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A recurring obligation: something that has to be done every `interval`,
/// counting from `start_time`.
///
/// Tasks are values. Two tasks are equal when every field is equal, and a
/// task never changes after construction; [`Task::with_changes`] derives an
/// edited copy instead.
///
/// A task without a `start_time` has never been scheduled and has no
/// occurrences. A zero `interval` makes the task a one-shot: it occurs once,
/// at `start_time`, and never repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    description: String,
    start_time: Option<DateTime<Utc>>,
    interval: TimeDelta,
}

/// Field overrides applied by [`Task::with_changes`]. `None` keeps the
/// original value; `start_time: Some(None)` unschedules the task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<Option<DateTime<Utc>>>,
    pub interval: Option<TimeDelta>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.interval.is_none()
    }
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        start_time: Option<DateTime<Utc>>,
        interval: TimeDelta,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TrackerError::InvalidTask(
                "task name must not be empty".to_string(),
            ));
        }
        if interval < TimeDelta::zero() {
            return Err(TrackerError::InvalidTask(format!(
                "interval of task '{name}' must not be negative"
            )));
        }
        Ok(Self {
            name,
            description: description.into(),
            start_time,
            interval,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    pub fn is_scheduled(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_one_shot(&self) -> bool {
        self.interval.is_zero()
    }

    /// Build a new task from this one with `changes` applied. The result is
    /// validated exactly like [`Task::new`].
    pub fn with_changes(&self, changes: TaskChanges) -> Result<Self> {
        Self::new(
            changes.name.unwrap_or_else(|| self.name.clone()),
            changes
                .description
                .unwrap_or_else(|| self.description.clone()),
            changes.start_time.unwrap_or(self.start_time),
            changes.interval.unwrap_or(self.interval),
        )
    }

    // -----------------------------------------------------------------------
    // Recurrence
    // -----------------------------------------------------------------------

    /// The `n`th programmed time of the task relative to `when` (now if
    /// `None`).
    ///
    /// `n = 1` is the next occurrence after `when`, `n = 2` the one after
    /// that; `n = -1` is the last occurrence at or before `when`, `n = -2` the
    /// one before it. Returns `Ok(None)` when the task is unscheduled or when
    /// the requested occurrence does not exist (e.g. a previous occurrence of
    /// a task that has not started yet).
    ///
    /// # Errors
    ///
    /// `n = 0` is a programming error and fails with
    /// [`TrackerError::InvalidIndex`].
    pub fn get_programmed_time(
        &self,
        n: i64,
        when: Option<DateTime<Utc>>,
    ) -> Result<Option<DateTime<Utc>>> {
        if n == 0 {
            return Err(TrackerError::InvalidIndex);
        }
        Ok(self.occurrence(n, when.unwrap_or_else(Utc::now)))
    }

    /// Shorthand for `get_programmed_time(1, Some(when))`.
    pub fn next_programmed_time(&self, when: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.occurrence(1, when)
    }

    /// Shorthand for `get_programmed_time(-1, Some(when))`.
    pub fn last_programmed_time(&self, when: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.occurrence(-1, when)
    }

    /// Every programmed time inside the window spanned by `when` (now if
    /// `None`) and `when + period`. A negative `period` looks backward.
    ///
    /// The window excludes its lower bound and includes its upper bound.
    /// Occurrences come back in ascending order and never precede
    /// `start_time`.
    pub fn get_all_programmed_times(
        &self,
        period: TimeDelta,
        when: Option<DateTime<Utc>>,
    ) -> Vec<DateTime<Utc>> {
        let (window_start, window_end) = window(when.unwrap_or_else(Utc::now), period);

        let Some(start) = self.start_time else {
            return Vec::new();
        };
        if start > window_end {
            return Vec::new();
        }

        if self.is_one_shot() {
            return if start > window_start {
                vec![start]
            } else {
                Vec::new()
            };
        }

        let mut times = Vec::new();
        let mut n = 1;
        while let Some(time) = self.occurrence(n, window_start) {
            if time > window_end {
                break;
            }
            if time >= start {
                times.push(time);
            }
            n += 1;
        }
        times
    }

    /// Occurrence lookup for a nonzero `n`.
    fn occurrence(&self, n: i64, when: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = self.start_time?;
        let step = total_micros(self.interval);

        if step == 0 {
            let hit = match n {
                1 => start > when,
                -1 => start <= when,
                _ => false,
            };
            return hit.then_some(start);
        }

        let elapsed = total_micros(when - start).div_euclid(step);
        let index = if n > 0 {
            elapsed + i128::from(n)
        } else {
            elapsed + 1 + i128::from(n)
        };
        let candidate = offset(start, step.checked_mul(index)?)?;
        if n < 0 && candidate < start {
            return None;
        }
        Some(candidate)
    }
}

// ---------------------------------------------------------------------------
// Time helpers
// ---------------------------------------------------------------------------

/// Normalize `(when, period)` into `(window_start, window_end)` with
/// `window_start <= window_end`. Bounds saturate at the representable range.
pub fn window(when: DateTime<Utc>, period: TimeDelta) -> (DateTime<Utc>, DateTime<Utc>) {
    let other = when.checked_add_signed(period).unwrap_or(if period < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });
    if period >= TimeDelta::zero() {
        (when, other)
    } else {
        (other, when)
    }
}

/// Whole microseconds in `delta`; sub-microsecond precision is truncated.
pub(crate) fn total_micros(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * MICROS_PER_SEC
        + i128::from(delta.subsec_nanos()) / NANOS_PER_MICRO
}

pub(crate) fn delta_from_micros(micros: i128) -> Option<TimeDelta> {
    i64::try_from(micros).ok().map(TimeDelta::microseconds)
}

fn offset(start: DateTime<Utc>, micros: i128) -> Option<DateTime<Utc>> {
    start.checked_add_signed(delta_from_micros(micros)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
