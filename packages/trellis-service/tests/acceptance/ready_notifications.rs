use time::Duration;

use trellis_service::{
	ActiveSeedsRequest, CreateSeedRequest, NotificationKind, SeedSummaryRequest,
};

use super::T0;

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn tick_notifies_each_ready_seed_at_most_once() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping tick_notifies_each_ready_seed_at_most_once; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, _) = super::seed_vault(&bed.service).await;

	for title in ["First", "Second"] {
		bed.service
			.create_seed(CreateSeedRequest {
				user_id: alice,
				title: title.to_string(),
				content: "Ready soon.".to_string(),
				bloom_at: T0 + Duration::hours(1),
			})
			.await
			.expect("Failed to create seed.");
	}

	bed.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Still growing".to_string(),
			content: "Not ready for a while.".to_string(),
			bloom_at: T0 + Duration::days(30),
		})
		.await
		.expect("Failed to create seed.");
	bed.clock.set(T0 + Duration::hours(2));

	let first = bed.service.tick().await.expect("First tick must succeed.");
	let second = bed.service.tick().await.expect("Second tick must succeed.");

	assert_eq!(first.notified, 2);
	assert_eq!(second.notified, 0);

	let ready: Vec<_> = bed
		.notifier
		.sent()
		.into_iter()
		.filter(|notification| notification.kind == NotificationKind::SeedReady)
		.collect();

	assert_eq!(ready.len(), 2);
	assert!(ready.iter().all(|notification| notification.user_id == alice));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn listing_active_seeds_sweeps_the_vault_first() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping listing_active_seeds_sweeps_the_vault_first; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Sweep me".to_string(),
			content: "Readiness via the read path.".to_string(),
			bloom_at: T0 + Duration::hours(1),
		})
		.await
		.expect("Failed to create seed.");

	bed.clock.set(T0 + Duration::hours(2));

	let active = bed
		.service
		.list_active_seeds(ActiveSeedsRequest { user_id: bob })
		.await
		.expect("Active listing must succeed.");

	let ready_sent = |bed: &super::TestBed| {
		bed.notifier
			.sent()
			.iter()
			.filter(|notification| {
				notification.kind == NotificationKind::SeedReady && notification.user_id == alice
			})
			.count()
	};

	assert_eq!(active.items.len(), 1);
	assert_eq!(active.items[0].seed_id, seed.seed_id);
	assert!(active.items[0].is_ready);
	// The read path alone produced the readiness notification.
	assert_eq!(ready_sent(&bed), 1);

	bed.clock.set(T0 + Duration::hours(3));

	let again = bed
		.service
		.list_active_seeds(ActiveSeedsRequest { user_id: bob })
		.await
		.expect("Second active listing must succeed.");

	// Still listed as ready, but the notification never repeats.
	assert_eq!(again.items.len(), 1);
	assert_eq!(ready_sent(&bed), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn planting_notifies_the_partner_without_content() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping planting_notifies_the_partner_without_content; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;

	bed.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Surprise".to_string(),
			content: "Tickets to the coast.".to_string(),
			bloom_at: T0 + Duration::days(7),
		})
		.await
		.expect("Failed to create seed.");

	let planted: Vec<_> = bed
		.notifier
		.sent()
		.into_iter()
		.filter(|notification| notification.kind == NotificationKind::SeedPlanted)
		.collect();

	assert_eq!(planted.len(), 1);
	assert_eq!(planted[0].user_id, bob);
	assert!(!planted[0].body.contains("Tickets"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn summary_counts_follow_the_lifecycle() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping summary_counts_follow_the_lifecycle; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, _) = super::seed_vault(&bed.service).await;

	bed.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Growing".to_string(),
			content: "Far away.".to_string(),
			bloom_at: T0 + Duration::days(30),
		})
		.await
		.expect("Failed to create seed.");
	bed.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Ready".to_string(),
			content: "Close by.".to_string(),
			bloom_at: T0 + Duration::hours(1),
		})
		.await
		.expect("Failed to create seed.");
	bed.clock.set(T0 + Duration::hours(2));

	let summary = bed
		.service
		.seed_summary(SeedSummaryRequest { user_id: alice })
		.await
		.expect("Summary must succeed.");

	assert_eq!(summary.total, 2);
	assert_eq!(summary.growing, 1);
	assert_eq!(summary.ready, 1);
	assert_eq!(summary.bloomed, 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
