use time::macros::time;
use time::{Duration, PrimitiveDateTime, Time};

const OPENS: Time = time!(17:00);
const LENGTH: Duration = Duration::hours(27);
const WEEK: Duration = Duration::weeks(1);

/// The weekly window from Friday 17:00 to Saturday 20:00, shifted one hour
/// later while daylight saving time is in effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SabbathWindow {
    dst: bool,
}

impl SabbathWindow {
    pub(crate) fn new(dst: bool) -> Self {
        Self { dst }
    }

    fn shift(&self) -> Duration {
        if self.dst {
            Duration::HOUR
        } else {
            Duration::ZERO
        }
    }

    /// Latest window opening not after `at`.
    fn opening_at_or_before(&self, at: PrimitiveDateTime) -> PrimitiveDateTime {
        let days_back = (at.weekday().number_days_from_monday() + 3) % 7;
        let friday = at.date() - Duration::days(i64::from(days_back));
        let opening = PrimitiveDateTime::new(friday, OPENS) + self.shift();

        if opening > at {
            opening - WEEK
        } else {
            opening
        }
    }

    /// Time between `start` and `end` that falls inside any window.
    pub(crate) fn overlap(&self, start: PrimitiveDateTime, end: PrimitiveDateTime) -> Duration {
        let mut total = Duration::ZERO;
        let mut opening = self.opening_at_or_before(start);

        while opening < end {
            let from = start.max(opening);
            let to = end.min(opening + LENGTH);

            if to > from {
                total += to - from;
            }

            opening += WEEK;
        }

        total
    }
}
