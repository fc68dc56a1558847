//! Sets of integers stored as sorted, disjoint, non-adjacent closed intervals.
//!
//! Binary operators propagate intervals: the result is the union of the
//! operator applied to every pair of component intervals. Relational
//! operators narrow instead of deciding, returning the part of the left
//! operand for which the relation can hold.
//!
//! Arithmetic saturates at the `i64` bounds. Division or remainder by an
//! interval containing zero, a possibly negative exponent and a possibly
//! negative shift amount all widen the affected pair to the full range.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScriptDescError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub min: i64,
    pub max: i64,
}

impl Interval {
    pub const FULL: Interval = Interval {
        min: i64::MIN,
        max: i64::MAX,
    };

    pub fn new(min: i64, max: i64) -> Result<Self, ScriptDescError> {
        if min > max {
            return Err(ScriptDescError::invalid_range(min, max));
        }
        Ok(Self { min, max })
    }

    fn point(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn spanning(values: &[i64]) -> Self {
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        Self { min, max }
    }

    fn contains(self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    fn is_singleton(self) -> bool {
        self.min == self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<[i64; 2]>", into = "Vec<[i64; 2]>")]
pub struct Range {
    intervals: Vec<Interval>,
}

impl Range {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(value: i64) -> Self {
        Self {
            intervals: vec![Interval {
                min: value,
                max: value,
            }],
        }
    }

    pub fn interval(min: i64, max: i64) -> Result<Self, ScriptDescError> {
        let interval = Interval::new(min, max)?;
        Ok(Self {
            intervals: vec![interval],
        })
    }

    pub fn full() -> Self {
        Self {
            intervals: vec![Interval::FULL],
        }
    }

    /// The `{0, 1}` range yielded by relational and logical operators.
    pub fn boolean() -> Self {
        Self {
            intervals: vec![Interval { min: 0, max: 1 }],
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn min(&self) -> Option<i64> {
        self.intervals.first().map(|interval| interval.min)
    }

    pub fn max(&self) -> Option<i64> {
        self.intervals.last().map(|interval| interval.max)
    }

    pub fn singleton(&self) -> Option<i64> {
        match self.intervals.as_slice() {
            [only] if only.is_singleton() => Some(only.min),
            _ => None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.intervals.as_slice() == [Interval::FULL]
    }

    /// Non-empty and not touching either representable bound.
    pub fn is_bounded(&self) -> bool {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => min > i64::MIN && max < i64::MAX,
            _ => false,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.intervals
            .iter()
            .any(|interval| interval.contains(value))
    }

    /// Every member of the set, or `None` when there are more than `limit`.
    pub fn values(&self, limit: usize) -> Option<Vec<i64>> {
        let mut values = Vec::new();
        for interval in &self.intervals {
            let width = interval.max.abs_diff(interval.min);
            if width >= limit as u64 || values.len() + width as usize >= limit {
                return None;
            }
            values.extend(interval.min..=interval.max);
        }
        Some(values)
    }

    /// Inserts `[min, max]`, merging every interval it overlaps or touches.
    pub fn add(&mut self, min: i64, max: i64) -> Result<(), ScriptDescError> {
        if min > max {
            return Err(ScriptDescError::invalid_range(min, max));
        }

        let mut start = 0usize;
        while start < self.intervals.len() && self.intervals[start].max.saturating_add(1) < min {
            start += 1;
        }

        let mut merged = Interval { min, max };
        let mut end = start;
        while end < self.intervals.len() && self.intervals[end].min <= max.saturating_add(1) {
            merged.min = merged.min.min(self.intervals[end].min);
            merged.max = merged.max.max(self.intervals[end].max);
            end += 1;
        }

        if start == end {
            self.intervals
                .try_reserve(1)
                .map_err(|_| ScriptDescError::out_of_memory("range"))?;
            self.intervals.insert(start, merged);
        } else {
            self.intervals[start] = merged;
            self.intervals.drain(start + 1..end);
        }
        Ok(())
    }

    /// Subtracts `[min, max]`, splitting an interval that strictly contains it.
    pub fn remove(&mut self, min: i64, max: i64) -> Result<(), ScriptDescError> {
        if min > max {
            return Err(ScriptDescError::invalid_range(min, max));
        }

        let mut remaining = Vec::new();
        remaining
            .try_reserve(self.intervals.len() + 1)
            .map_err(|_| ScriptDescError::out_of_memory("range"))?;
        for interval in &self.intervals {
            if interval.max < min || interval.min > max {
                remaining.push(*interval);
                continue;
            }
            if interval.min < min {
                remaining.push(Interval {
                    min: interval.min,
                    max: min - 1,
                });
            }
            if interval.max > max {
                remaining.push(Interval {
                    min: max + 1,
                    max: interval.max,
                });
            }
        }
        self.intervals = remaining;
        Ok(())
    }

    pub fn union(&self, other: &Range) -> Result<Range, ScriptDescError> {
        let mut result = self.clone();
        for interval in &other.intervals {
            result.add(interval.min, interval.max)?;
        }
        Ok(result)
    }

    pub fn subtract(&self, other: &Range) -> Result<Range, ScriptDescError> {
        let mut result = self.clone();
        for interval in &other.intervals {
            result.remove(interval.min, interval.max)?;
        }
        Ok(result)
    }

    pub fn intersect(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            let min = a.min.max(b.min);
            let max = a.max.min(b.max);
            (min <= max).then_some(Interval { min, max })
        })
    }

    fn clamp_to(&self, min: i64, max: i64) -> Result<Range, ScriptDescError> {
        if min > max {
            return Ok(Range::new());
        }
        self.intersect(&Range {
            intervals: vec![Interval { min, max }],
        })
    }

    fn propagate<F>(&self, other: &Range, op: F) -> Result<Range, ScriptDescError>
    where
        F: Fn(Interval, Interval) -> Option<Interval>,
    {
        let mut result = Range::new();
        for left in &self.intervals {
            for right in &other.intervals {
                if let Some(interval) = op(*left, *right) {
                    result.add(interval.min, interval.max)?;
                }
            }
        }
        Ok(result)
    }

    fn map<F>(&self, op: F) -> Result<Range, ScriptDescError>
    where
        F: Fn(Interval) -> Interval,
    {
        let mut result = Range::new();
        for interval in &self.intervals {
            let mapped = op(*interval);
            result.add(mapped.min, mapped.max)?;
        }
        Ok(result)
    }

    pub fn plus(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            Some(Interval {
                min: a.min.saturating_add(b.min),
                max: a.max.saturating_add(b.max),
            })
        })
    }

    pub fn minus(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            Some(Interval {
                min: a.min.saturating_sub(b.max),
                max: a.max.saturating_sub(b.min),
            })
        })
    }

    pub fn multiply(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            Some(Interval::spanning(&[
                a.min.saturating_mul(b.min),
                a.min.saturating_mul(b.max),
                a.max.saturating_mul(b.min),
                a.max.saturating_mul(b.max),
            ]))
        })
    }

    pub fn divide(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if b.contains(0) {
                return Some(Interval::FULL);
            }
            let div = |x: i64, y: i64| x.checked_div(y).unwrap_or(i64::MAX);
            Some(Interval::spanning(&[
                div(a.min, b.min),
                div(a.min, b.max),
                div(a.max, b.min),
                div(a.max, b.max),
            ]))
        })
    }

    pub fn remainder(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if b.contains(0) {
                return Some(Interval::FULL);
            }
            if a.is_singleton() && b.is_singleton() {
                return Some(Interval::point(a.min.wrapping_rem(b.min)));
            }
            let largest = b.min.unsigned_abs().max(b.max.unsigned_abs()) - 1;
            let bound = i64::try_from(largest).unwrap_or(i64::MAX);
            let min = if a.min >= 0 { 0 } else { a.min.max(-bound) };
            let max = if a.max <= 0 { 0 } else { a.max.min(bound) };
            Some(Interval { min, max })
        })
    }

    pub fn pow(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |base, exponent| {
            if exponent.min < 0 {
                return Some(Interval::FULL);
            }
            let last = exponent.max.min(exponent.min.saturating_add(64));
            let mut candidates = Vec::new();
            for raw in exponent.min..=last {
                // Anything past 64 has saturated already; keep the parity.
                let power = if raw > 64 { 64 - (raw % 2) as u32 } else { raw as u32 };
                candidates.push(base.min.saturating_pow(power));
                candidates.push(base.max.saturating_pow(power));
                if base.contains(0) {
                    candidates.push(0i64.pow(power));
                }
            }
            Some(Interval::spanning(&candidates))
        })
    }

    pub fn shift_left(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if b.min < 0 {
                return Some(Interval::FULL);
            }
            Some(Interval::spanning(&[
                saturating_shl(a.min, b.min),
                saturating_shl(a.min, b.max),
                saturating_shl(a.max, b.min),
                saturating_shl(a.max, b.max),
            ]))
        })
    }

    pub fn shift_right(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if b.min < 0 {
                return Some(Interval::FULL);
            }
            let shr = |x: i64, k: i64| x >> k.min(63);
            Some(Interval::spanning(&[
                shr(a.min, b.min),
                shr(a.min, b.max),
                shr(a.max, b.min),
                shr(a.max, b.max),
            ]))
        })
    }

    pub fn bit_and(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if a.is_singleton() && b.is_singleton() {
                return Some(Interval::point(a.min & b.min));
            }
            if a.min >= 0 && b.min >= 0 {
                return Some(Interval {
                    min: 0,
                    max: a.max.min(b.max),
                });
            }
            Some(Interval::FULL)
        })
    }

    pub fn bit_or(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if a.is_singleton() && b.is_singleton() {
                return Some(Interval::point(a.min | b.min));
            }
            if a.min >= 0 && b.min >= 0 {
                return Some(Interval {
                    min: a.min.max(b.min),
                    max: bit_mask(a.max.max(b.max)),
                });
            }
            Some(Interval::FULL)
        })
    }

    pub fn bit_xor(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            if a.is_singleton() && b.is_singleton() {
                return Some(Interval::point(a.min ^ b.min));
            }
            if a.min >= 0 && b.min >= 0 {
                return Some(Interval {
                    min: 0,
                    max: bit_mask(a.max.max(b.max)),
                });
            }
            Some(Interval::FULL)
        })
    }

    pub fn min_of(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            Some(Interval {
                min: a.min.min(b.min),
                max: a.max.min(b.max),
            })
        })
    }

    pub fn max_of(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.propagate(other, |a, b| {
            Some(Interval {
                min: a.min.max(b.min),
                max: a.max.max(b.max),
            })
        })
    }

    /// Members of `self` that can equal some member of `other`.
    pub fn equal(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.intersect(other)
    }

    /// `self` with every sub-interval overlapping `other` removed.
    pub fn not_equal(&self, other: &Range) -> Result<Range, ScriptDescError> {
        self.subtract(other)
    }

    pub fn lesser(&self, other: &Range) -> Result<Range, ScriptDescError> {
        match other.max() {
            Some(i64::MIN) | None => Ok(Range::new()),
            Some(max) => self.clamp_to(i64::MIN, max - 1),
        }
    }

    pub fn lesser_equal(&self, other: &Range) -> Result<Range, ScriptDescError> {
        match other.max() {
            Some(max) => self.clamp_to(i64::MIN, max),
            None => Ok(Range::new()),
        }
    }

    pub fn greater(&self, other: &Range) -> Result<Range, ScriptDescError> {
        match other.min() {
            Some(i64::MAX) | None => Ok(Range::new()),
            Some(min) => self.clamp_to(min + 1, i64::MAX),
        }
    }

    pub fn greater_equal(&self, other: &Range) -> Result<Range, ScriptDescError> {
        match other.min() {
            Some(min) => self.clamp_to(min, i64::MAX),
            None => Ok(Range::new()),
        }
    }

    pub fn negate(&self) -> Result<Range, ScriptDescError> {
        self.map(|interval| Interval {
            min: interval.max.saturating_neg(),
            max: interval.min.saturating_neg(),
        })
    }

    pub fn bit_not(&self) -> Result<Range, ScriptDescError> {
        self.map(|interval| Interval {
            min: !interval.max,
            max: !interval.min,
        })
    }

    pub fn increment(&self) -> Result<Range, ScriptDescError> {
        self.plus(&Range::single(1))
    }

    pub fn decrement(&self) -> Result<Range, ScriptDescError> {
        self.minus(&Range::single(1))
    }

    pub fn absolute(&self) -> Result<Range, ScriptDescError> {
        self.map(|interval| {
            if interval.min >= 0 {
                interval
            } else if interval.max <= 0 {
                Interval {
                    min: interval.max.saturating_neg(),
                    max: interval.min.saturating_neg(),
                }
            } else {
                Interval {
                    min: 0,
                    max: interval.max.max(interval.min.saturating_neg()),
                }
            }
        })
    }
}

fn saturating_shl(value: i64, amount: i64) -> i64 {
    if value == 0 {
        return 0;
    }
    if amount >= 63 {
        return if value > 0 { i64::MAX } else { i64::MIN };
    }
    value.saturating_mul(1i64 << amount)
}

fn bit_mask(value: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    let bits = 64 - (value as u64).leading_zeros();
    ((1u64 << bits) - 1) as i64
}

impl TryFrom<Vec<[i64; 2]>> for Range {
    type Error = ScriptDescError;

    fn try_from(pairs: Vec<[i64; 2]>) -> Result<Self, Self::Error> {
        let mut range = Range::new();
        for [min, max] in pairs {
            range.add(min, max)?;
        }
        Ok(range)
    }
}

impl From<Range> for Vec<[i64; 2]> {
    fn from(range: Range) -> Self {
        range
            .intervals
            .into_iter()
            .map(|interval| [interval.min, interval.max])
            .collect()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, interval) in self.intervals.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            if interval.is_singleton() {
                write!(f, "{}", interval.min)?;
            } else {
                write!(f, "{} ~ {}", interval.min, interval.max)?;
            }
        }
        Ok(())
    }
}
