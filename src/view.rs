use crate::error::Error;
use crate::models::Interval;
use crate::recorder::Recorder;
use askama::Template;
use std::fmt;
use time::macros::format_description;
use time::PrimitiveDateTime;
use uuid::Uuid;

/// Displays a timestamp the way the pickers show it, e.g. `01/01/2024, 12:30`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WallClock(PrimitiveDateTime);

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .0
            .format(format_description!("[day]/[month]/[year], [hour]:[minute]"))
            .map_err(|_| fmt::Error)?;

        f.write_str(&text)
    }
}

/// Value for a `datetime-local` input, empty when unset.
fn input_value(value: Option<PrimitiveDateTime>) -> String {
    value
        .and_then(|value| {
            value
                .format(format_description!("[year]-[month]-[day]T[hour]:[minute]"))
                .ok()
        })
        .unwrap_or_default()
}

/// One rendered row of the interval list.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntervalItem<'a> {
    interval: &'a Interval,
}

impl<'a> IntervalItem<'a> {
    fn new(interval: &'a Interval) -> Self {
        Self { interval }
    }

    pub(crate) fn key(&self) -> Uuid {
        self.interval.id()
    }

    pub(crate) fn name(&self) -> &'a str {
        self.interval.name()
    }

    pub(crate) fn start(&self) -> WallClock {
        WallClock(self.interval.start())
    }

    pub(crate) fn end(&self) -> WallClock {
        WallClock(self.interval.end())
    }

    pub(crate) fn duration_minutes(&self) -> i64 {
        self.interval.duration_minutes()
    }

    pub(crate) fn sabbath_minutes(&self) -> i64 {
        self.interval.sabbath_minutes()
    }
}

impl fmt::Display for IntervalItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {} ({} min)",
            self.name(),
            self.start(),
            self.end(),
            self.duration_minutes()
        )?;

        if self.sabbath_minutes() > 0 {
            write!(f, " [{} min Sabbath]", self.sabbath_minutes())?;
        }

        Ok(())
    }
}

/// Sums over the whole list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    pub(crate) count: usize,
    pub(crate) duration_minutes: i64,
    pub(crate) sabbath_minutes: i64,
}

impl Totals {
    pub(crate) fn hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} intervals, {} min ({:.2} h) total, {} min during Sabbath",
            self.count,
            self.duration_minutes,
            self.hours(),
            self.sabbath_minutes
        )
    }
}

/// Read-only view over the recorded intervals.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntervalList<'a> {
    intervals: &'a [Interval],
}

impl<'a> IntervalList<'a> {
    pub(crate) fn new(intervals: &'a [Interval]) -> Self {
        Self { intervals }
    }

    /// Items in recording order. Each call starts over from the first one.
    pub(crate) fn items(&self) -> impl Iterator<Item = IntervalItem<'a>> + Clone + 'a {
        self.intervals.iter().map(IntervalItem::new)
    }

    pub(crate) fn len(&self) -> usize {
        self.intervals.len()
    }

    pub(crate) fn totals(&self) -> Totals {
        self.items().fold(Totals::default(), |totals, item| Totals {
            count: totals.count + 1,
            duration_minutes: totals.duration_minutes + item.duration_minutes(),
            sabbath_minutes: totals.sabbath_minutes + item.sabbath_minutes(),
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate<'a> {
    name: &'a str,
    start: String,
    end: String,
    error: Option<String>,
    list: IntervalList<'a>,
}

impl<'a> IndexTemplate<'a> {
    pub(crate) fn new(recorder: &'a Recorder, error: Option<&Error>) -> Self {
        let selection = recorder.selection();

        Self {
            name: &selection.name,
            start: input_value(selection.start),
            end: input_value(selection.end),
            error: error.map(ToString::to_string),
            list: recorder.list(),
        }
    }
}
