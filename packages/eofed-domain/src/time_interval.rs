use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
	pub start: OffsetDateTime,
	pub end: OffsetDateTime,
}
impl TimeInterval {
	/// Accepts exactly two non-null RFC 3339 timestamps. Every other shape, including unparsable
	/// timestamps or a reversed range, means "no time filter".
	pub fn from_values(values: &[Value]) -> Option<Self> {
		let [start, end] = values else {
			return None;
		};

		Self::from_strs(start.as_str()?, end.as_str()?)
	}

	pub fn from_value(value: &Value) -> Option<Self> {
		value.as_array().and_then(|values| Self::from_values(values))
	}

	pub fn from_strs(start: &str, end: &str) -> Option<Self> {
		let start = OffsetDateTime::parse(start.trim(), &Rfc3339).ok()?;
		let end = OffsetDateTime::parse(end.trim(), &Rfc3339).ok()?;

		(start <= end).then_some(Self { start, end })
	}

	pub fn contains(&self, at: OffsetDateTime) -> bool {
		self.start <= at && at <= self.end
	}

	/// STAC `datetime` parameter: `start/end`.
	pub fn to_stac_datetime(&self) -> String {
		format!("{}/{}", format_rfc3339(self.start), format_rfc3339(self.end))
	}
}

pub fn format_rfc3339(at: OffsetDateTime) -> String {
	at.format(&Rfc3339).unwrap_or_else(|_| at.unix_timestamp().to_string())
}
