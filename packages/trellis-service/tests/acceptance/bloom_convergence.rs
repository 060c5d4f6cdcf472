use time::Duration;

use trellis_domain::SeedStatus;
use trellis_service::{
	BloomOutcome, CreateSeedRequest, Error, MemoryDetailRequest, RecordViewRequest,
	SeedDetailRequest, UpdateMemoryRequest,
};

use super::T0;

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn view_before_the_reveal_time_is_not_ready() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping view_before_the_reveal_time_is_not_ready; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Patience".to_string(),
			content: "Not yet.".to_string(),
			bloom_at: T0 + Duration::days(7),
		})
		.await
		.expect("Failed to create seed.");

	let err = bed
		.service
		.record_view(RecordViewRequest { user_id: bob, seed_id: seed.seed_id })
		.await
		.expect_err("View before the reveal time must be rejected.");

	assert!(matches!(err, Error::NotReady { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn two_distinct_viewers_converge_into_a_memory() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping two_distinct_viewers_converge_into_a_memory; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let bloom_at = T0 + Duration::days(7);
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Lake house".to_string(),
			content: "The summer we rebuilt the dock.".to_string(),
			bloom_at,
		})
		.await
		.expect("Failed to create seed.");

	bed.clock.set(bloom_at + Duration::hours(1));

	// The creator's own view counts toward convergence, exactly once.
	let first = bed
		.service
		.record_view(RecordViewRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("First view must succeed.");
	let repeat = bed
		.service
		.record_view(RecordViewRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("Repeated view must succeed.");

	assert_eq!(first.outcome, BloomOutcome::ViewRecorded);
	assert_eq!(first.view_count, 1);
	assert_eq!(repeat.outcome, BloomOutcome::ViewRecorded);
	assert_eq!(repeat.view_count, 1);

	let converged = bed
		.service
		.record_view(RecordViewRequest { user_id: bob, seed_id: seed.seed_id })
		.await
		.expect("Second distinct view must succeed.");

	assert_eq!(converged.outcome, BloomOutcome::ConvertedToMemory);
	assert_eq!(converged.view_count, 2);

	let memory_id = converged.memory_id.expect("Conversion must yield a memory id.");
	let detail = bed
		.service
		.seed_detail(SeedDetailRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("Seed detail must load.");

	assert_eq!(detail.seed.status, SeedStatus::Bloomed);
	assert_eq!(detail.seed.memory_id, Some(memory_id));

	let memory = bed
		.service
		.memory_detail(MemoryDetailRequest { user_id: bob, memory_id })
		.await
		.expect("Memory must be visible to both members.");

	assert!(memory.is_seed);
	assert_eq!(memory.title, "Lake house");
	assert_eq!(memory.memory_date, Some(bloom_at));

	// Any later view reports the conversion instead of repeating it.
	let after = bed
		.service
		.record_view(RecordViewRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("View after conversion must succeed.");

	assert_eq!(after.outcome, BloomOutcome::AlreadyConverted);
	assert_eq!(after.memory_id, Some(memory_id));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn memory_edits_are_creator_only_and_time_boxed() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping memory_edits_are_creator_only_and_time_boxed; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let bloom_at = T0 + Duration::days(1);
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Typo inside".to_string(),
			content: "The summr we rebuilt the dock.".to_string(),
			bloom_at,
		})
		.await
		.expect("Failed to create seed.");

	bed.clock.set(bloom_at);
	bed.service
		.record_view(RecordViewRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("First view must succeed.");

	let converged = bed
		.service
		.record_view(RecordViewRequest { user_id: bob, seed_id: seed.seed_id })
		.await
		.expect("Second view must succeed.");
	let memory_id = converged.memory_id.expect("Conversion must yield a memory id.");

	let partner_edit = bed
		.service
		.update_memory(UpdateMemoryRequest {
			user_id: bob,
			memory_id,
			title: None,
			content: Some("Partner rewrite.".to_string()),
		})
		.await
		.expect_err("Partner edit must be rejected.");

	assert!(matches!(partner_edit, Error::Forbidden { .. }));

	// Inside the window, including its last instant.
	bed.clock.set(bloom_at + Duration::hours(8));
	bed.service
		.update_memory(UpdateMemoryRequest {
			user_id: alice,
			memory_id,
			title: None,
			content: Some("The summer we rebuilt the dock.".to_string()),
		})
		.await
		.expect("Creator edit at the window boundary must succeed.");

	bed.clock.set(bloom_at + Duration::hours(8) + Duration::seconds(1));

	let late_edit = bed
		.service
		.update_memory(UpdateMemoryRequest {
			user_id: alice,
			memory_id,
			title: Some("Too late".to_string()),
			content: None,
		})
		.await
		.expect_err("Edit past the window must be rejected.");

	assert!(matches!(late_edit, Error::WindowExpired { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn cancelled_seeds_never_bloom() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping cancelled_seeds_never_bloom; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let bloom_at = T0 + Duration::days(7);
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Changed my mind".to_string(),
			content: "Never mind.".to_string(),
			bloom_at,
		})
		.await
		.expect("Failed to create seed.");

	bed.service
		.cancel_seed(trellis_service::CancelSeedRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("Cancel inside the grace period must succeed.");
	bed.clock.set(bloom_at + Duration::hours(1));

	let err = bed
		.service
		.record_view(RecordViewRequest { user_id: bob, seed_id: seed.seed_id })
		.await
		.expect_err("Cancelled seed must not accept views.");

	assert!(matches!(err, Error::InvalidState { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
