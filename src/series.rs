/// Generator of stepped numbers series.
use std::ops::{Add, Sub};

/// Generator (iterator) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct StepSeries<T: Copy> {
    max: T,
    step: T,
    next: Option<T>,
}

impl<T> StepSeries<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + PartialOrd,
{
    /// Produces `min`, `min + step`, ... while the value doesn't exceed `max`.
    ///
    /// Panics if `step` is zero or `max` is less than `min`.
    #[inline]
    pub(crate) fn new(min: T, max: T, step: T) -> Self {
        if max < min {
            panic!("max value is less than min value");
        }

        if min + step == min {
            panic!("step value is 0");
        }

        Self {
            max,
            step,
            next: Some(min),
        }
    }
}

impl<T> Iterator for StepSeries<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + PartialOrd,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        // stop before overflowing the type when max is close to its upper bound
        self.next = if self.max - current < self.step {
            None
        } else {
            Some(current + self.step)
        };
        Some(current)
    }
}
