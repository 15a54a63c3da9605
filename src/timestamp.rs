use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, SubsecRound};

use crate::error::Error;

/// A point in time with the UTC offset it was recorded in, written `<unix> ±HHMM`.
///
/// Only whole seconds are kept, as that is all the written form can hold.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<FixedOffset>);

impl Timestamp {
    pub fn now() -> Self {
        let now: DateTime<FixedOffset> = chrono::offset::Local::now().into();
        Self(now.trunc_subsecs(0))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%s %z"))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Parse a timestamp from a unix + HH + mm offset
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_str(s, "%s %z")
            .map(Self)
            .map_err(|e| Error::MalformedCommit(format!("invalid timestamp '{s}': {e}")))
    }
}
