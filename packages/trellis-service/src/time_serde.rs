//! Rfc3339 (de)serialization for the timestamp fields of the wire structs.

use serde::{Deserialize, Deserializer, Serializer, de, ser};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S: Serializer>(at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&at.format(&Rfc3339).map_err(ser::Error::custom)?)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
	parse(&String::deserialize(deserializer)?)
}

fn parse<E: de::Error>(raw: &str) -> Result<OffsetDateTime, E> {
	OffsetDateTime::parse(raw, &Rfc3339).map_err(de::Error::custom)
}

pub mod option {
	use super::*;

	pub fn serialize<S: Serializer>(
		at: &Option<OffsetDateTime>,
		serializer: S,
	) -> Result<S::Ok, S::Error> {
		match at {
			Some(at) => super::serialize(at, serializer),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Option<OffsetDateTime>, D::Error> {
		Option::<String>::deserialize(deserializer)?.as_deref().map(super::parse).transpose()
	}
}
