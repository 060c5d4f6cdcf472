use uuid::Uuid;

use trellis_service::{ConvertJournalRequest, Error, MemoryDetailRequest, NotificationKind};
use trellis_storage::{models::Journal, queries};

use super::T0;

async fn plant_journal(bed: &super::TestBed, user_id: Uuid, vault_id: Option<Uuid>) -> Journal {
	let journal = Journal {
		journal_id: Uuid::new_v4(),
		user_id,
		vault_id,
		title: "Quiet morning".to_string(),
		content: "Wrote this one just for me.".to_string(),
		visibility: "private".to_string(),
		status: "active".to_string(),
		created_at: T0,
		edited_at: None,
		is_deleted: false,
		memory_id: None,
	};

	queries::insert_journal(&bed.service.db.pool, &journal)
		.await
		.expect("Failed to insert journal.");

	journal
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn converting_a_journal_creates_a_shared_memory_once() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping converting_a_journal_creates_a_shared_memory_once; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (vault_id, alice, bob) = super::seed_vault(&bed.service).await;
	let journal = plant_journal(&bed, alice, Some(vault_id)).await;

	let converted = bed
		.service
		.convert_journal(ConvertJournalRequest { user_id: alice, journal_id: journal.journal_id })
		.await
		.expect("Conversion must succeed.");
	let memory = bed
		.service
		.memory_detail(MemoryDetailRequest { user_id: bob, memory_id: converted.memory_id })
		.await
		.expect("Converted memory must be visible to the partner.");

	assert_eq!(memory.title, "Quiet morning");
	assert!(!memory.is_seed);
	assert_eq!(memory.memory_date, Some(T0));

	let again = bed
		.service
		.convert_journal(ConvertJournalRequest { user_id: alice, journal_id: journal.journal_id })
		.await
		.expect_err("Second conversion must be rejected.");

	assert!(matches!(again, Error::InvalidState { .. }));
	assert!(bed.notifier.sent().iter().any(|notification| {
		notification.kind == NotificationKind::JournalConverted && notification.user_id == bob
	}));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn only_the_author_converts_and_only_within_their_vault() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping only_the_author_converts_and_only_within_their_vault; set TRELLIS_PG_DSN."
		);

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (vault_id, alice, bob) = super::seed_vault(&bed.service).await;
	let journal = plant_journal(&bed, alice, Some(vault_id)).await;
	let unlinked = plant_journal(&bed, alice, None).await;

	let stolen = bed
		.service
		.convert_journal(ConvertJournalRequest { user_id: bob, journal_id: journal.journal_id })
		.await
		.expect_err("Partner conversion must be rejected.");
	let orphan = bed
		.service
		.convert_journal(ConvertJournalRequest { user_id: alice, journal_id: unlinked.journal_id })
		.await
		.expect_err("Conversion of an unlinked journal must be rejected.");

	assert!(matches!(stolen, Error::Forbidden { .. }));
	assert!(matches!(orphan, Error::InvalidState { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
