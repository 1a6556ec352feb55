use crate::error::Error;
use crate::sabbath::SabbathWindow;
use serde::Serialize;
use time::macros::format_description;
use time::PrimitiveDateTime;
use uuid::Uuid;

time::serde::format_description!(
    wall_clock,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);

/// A recorded span of time. Created once on commit and never changed afterwards.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Interval {
    id: Uuid,
    name: String,
    #[serde(with = "wall_clock")]
    start: PrimitiveDateTime,
    #[serde(with = "wall_clock")]
    end: PrimitiveDateTime,
    duration_minutes: i64,
    sabbath_minutes: i64,
}

fn floor_minutes(duration: time::Duration) -> i64 {
    duration.whole_seconds().div_euclid(60)
}

impl Interval {
    pub(crate) fn new(
        name: String,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        window: SabbathWindow,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            start,
            end,
            duration_minutes: floor_minutes(end - start),
            sabbath_minutes: floor_minutes(window.overlap(start, end)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    /// Minutes of the interval that fall between Friday evening and
    /// Saturday evening.
    pub fn sabbath_minutes(&self) -> i64 {
        self.sabbath_minutes
    }
}

/// Start, end and title as currently entered, not yet committed.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub start: Option<PrimitiveDateTime>,
    pub end: Option<PrimitiveDateTime>,
}

/// Parses the value of a `datetime-local` input. Blank input means "not set".
pub(crate) fn parse_wall_clock(text: &str) -> Result<Option<PrimitiveDateTime>, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }

    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let with_minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");

    PrimitiveDateTime::parse(text, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(text, with_minutes))
        .map(Some)
        .map_err(|_| Error::InvalidDateTime(text.to_string()))
}
