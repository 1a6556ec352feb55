use crate::error::Error;
use crate::models::{Interval, Selection};
use crate::sabbath::SabbathWindow;
use crate::view::IntervalList;
use time::PrimitiveDateTime;
use tracing::{info, warn};

/// Owns the recorded intervals and the selection being edited.
///
/// The list only ever grows at its end, so its order is the order of
/// successful commits.
#[derive(Default, Debug)]
pub(crate) struct Recorder {
    window: SabbathWindow,
    selection: Selection,
    intervals: Vec<Interval>,
}

fn validate(
    start: Option<PrimitiveDateTime>,
    end: Option<PrimitiveDateTime>,
) -> Result<(PrimitiveDateTime, PrimitiveDateTime), Error> {
    let start = start.ok_or(Error::MissingStart)?;
    let end = end.ok_or(Error::MissingEnd)?;

    if end < start {
        return Err(Error::EndBeforeStart);
    }

    Ok((start, end))
}

impl Recorder {
    pub(crate) fn new(window: SabbathWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub(crate) fn set_start(&mut self, start: Option<PrimitiveDateTime>) {
        self.selection.start = start;
    }

    pub(crate) fn set_end(&mut self, end: Option<PrimitiveDateTime>) {
        self.selection.end = end;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.selection.name = name;
    }

    pub(crate) fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub(crate) fn list(&self) -> IntervalList<'_> {
        IntervalList::new(&self.intervals)
    }

    /// Appends a new interval. Empty names are fine, missing or inverted
    /// bounds are not.
    pub(crate) fn commit_interval(
        &mut self,
        name: impl Into<String>,
        start: Option<PrimitiveDateTime>,
        end: Option<PrimitiveDateTime>,
    ) -> Result<&Interval, Error> {
        let (start, end) = validate(start, end).map_err(|err| {
            warn!(%err, "rejected interval");
            err
        })?;

        let interval = Interval::new(name.into(), start, end, self.window);
        info!(
            id = %interval.id(),
            name = interval.name(),
            minutes = interval.duration_minutes(),
            sabbath_minutes = interval.sabbath_minutes(),
            "recorded interval"
        );

        let index = self.intervals.len();
        self.intervals.push(interval);
        Ok(&self.intervals[index])
    }

    /// Commits the current selection and clears it. A rejected selection is
    /// kept so it can be corrected.
    pub(crate) fn submit(&mut self) -> Result<&Interval, Error> {
        let Selection { name, start, end } = self.selection.clone();
        let index = self.intervals.len();

        self.commit_interval(name, start, end)?;
        self.selection = Selection::default();

        Ok(&self.intervals[index])
    }
}
