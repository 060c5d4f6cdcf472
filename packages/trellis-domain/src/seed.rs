use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The closed seed lifecycle. Transitions are monotonic: a seed leaves
/// `Scheduled` exactly once and never returns.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStatus {
	Scheduled,
	Bloomed,
	Cancelled,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown seed status {0:?}.")]
pub struct UnknownStatus(pub String);

#[derive(Debug, thiserror::Error)]
#[error("Seed cannot move from {from} to {to}.")]
pub struct InvalidTransition {
	pub from: SeedStatus,
	pub to: SeedStatus,
}

impl SeedStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Scheduled => "scheduled",
			Self::Bloomed => "bloomed",
			Self::Cancelled => "cancelled",
		}
	}

	pub fn is_terminal(self) -> bool {
		!matches!(self, Self::Scheduled)
	}

	pub fn bloom(self) -> Result<Self, InvalidTransition> {
		match self {
			Self::Scheduled => Ok(Self::Bloomed),
			from => Err(InvalidTransition { from, to: Self::Bloomed }),
		}
	}

	pub fn cancel(self) -> Result<Self, InvalidTransition> {
		match self {
			Self::Scheduled => Ok(Self::Cancelled),
			from => Err(InvalidTransition { from, to: Self::Cancelled }),
		}
	}
}

impl FromStr for SeedStatus {
	type Err = UnknownStatus;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"scheduled" => Ok(Self::Scheduled),
			"bloomed" => Ok(Self::Bloomed),
			"cancelled" => Ok(Self::Cancelled),
			other => Err(UnknownStatus(other.to_string())),
		}
	}
}

impl std::fmt::Display for SeedStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Derived readiness: a scheduled seed whose reveal instant has passed. Pure,
/// never mutates; every listing and detail query goes through this.
pub fn is_ready(status: SeedStatus, bloom_at: OffsetDateTime, now: OffsetDateTime) -> bool {
	status == SeedStatus::Scheduled && now >= bloom_at
}
