use time::Duration;
use uuid::Uuid;

use trellis_service::{CreateSeedRequest, Error};
use trellis_storage::queries;

use super::T0;

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn a_vault_never_holds_more_than_two_members() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping a_vault_never_holds_more_than_two_members; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (vault_id, _, _) = super::seed_vault(&bed.service).await;
	let intruder = Uuid::new_v4();
	let err = queries::insert_membership(&bed.service.db, vault_id, intruder, T0)
		.await
		.expect_err("Third membership must be rejected.");

	assert!(matches!(err, trellis_storage::Error::Conflict(_)));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn vaultless_users_are_rejected() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping vaultless_users_are_rejected; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let loner = Uuid::new_v4();
	let err = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: loner,
			title: "No vault".to_string(),
			content: "Nowhere to plant this.".to_string(),
			bloom_at: T0 + Duration::days(7),
		})
		.await
		.expect_err("Seed creation without a vault must be rejected.");

	assert!(matches!(err, Error::Forbidden { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
