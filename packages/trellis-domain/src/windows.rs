use time::{Duration, OffsetDateTime};

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
	#[error("Edit window expired.")]
	EditWindowElapsed,
	#[error("Seed has already reached its reveal time.")]
	AlreadyRevealed,
	#[error("Cancel window expired.")]
	CancelWindowElapsed,
	#[error("Memory edit window expired.")]
	MemoryWindowElapsed,
}

/// Seed edits close at the boundary instant: an edit at exactly
/// `created_at + window` is rejected. Edits are also rejected once the seed
/// has reached its reveal time, even while it is still unbloomed.
pub fn seed_edit_allowed(
	created_at: OffsetDateTime,
	bloom_at: OffsetDateTime,
	now: OffsetDateTime,
	window: Duration,
) -> Result<(), WindowError> {
	if now >= created_at + window {
		return Err(WindowError::EditWindowElapsed);
	}
	if now >= bloom_at {
		return Err(WindowError::AlreadyRevealed);
	}

	Ok(())
}

/// Media mutations share only the creation-window arm of the edit rule.
pub fn seed_media_allowed(
	created_at: OffsetDateTime,
	now: OffsetDateTime,
	window: Duration,
) -> Result<(), WindowError> {
	if now >= created_at + window {
		return Err(WindowError::EditWindowElapsed);
	}

	Ok(())
}

/// Cancellation is a disjunction: still inside the initial grace period, or
/// still at least `cancel_lead` ahead of the reveal. Both arms are inclusive,
/// so a cancel at exactly `created_at + window` is allowed.
pub fn seed_cancel_allowed(
	created_at: OffsetDateTime,
	bloom_at: OffsetDateTime,
	now: OffsetDateTime,
	window: Duration,
	cancel_lead: Duration,
) -> Result<(), WindowError> {
	let within_creation_window = now <= created_at + window;
	let before_bloom_cutoff = now <= bloom_at - cancel_lead;

	if within_creation_window || before_bloom_cutoff {
		Ok(())
	} else {
		Err(WindowError::CancelWindowElapsed)
	}
}

/// Memory edits are rejected strictly after `editable_until`, regardless of
/// actor.
pub fn memory_edit_allowed(
	editable_until: OffsetDateTime,
	now: OffsetDateTime,
) -> Result<(), WindowError> {
	if now > editable_until {
		Err(WindowError::MemoryWindowElapsed)
	} else {
		Ok(())
	}
}
