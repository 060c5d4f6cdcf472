use time::Duration;

use trellis_service::{
	BloomOutcome, CreateSeedRequest, DeleteSeedMediaRequest, Error, MemoryDetailRequest,
	RecordViewRequest, SeedDetailRequest, UploadSeedMediaRequest,
};

use super::T0;

fn png_upload(user_id: uuid::Uuid, seed_id: uuid::Uuid) -> UploadSeedMediaRequest {
	UploadSeedMediaRequest {
		user_id,
		seed_id,
		content_type: "image/png".to_string(),
		bytes: vec![0_u8; 64],
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn partner_sees_nothing_until_the_seed_is_ready() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping partner_sees_nothing_until_the_seed_is_ready; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let bloom_at = T0 + Duration::days(7);
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Hidden".to_string(),
			content: "Concealed until ready.".to_string(),
			bloom_at,
		})
		.await
		.expect("Failed to create seed.");

	bed.service.upload_seed_media(png_upload(alice, seed.seed_id)).await.expect("Upload failed.");

	let creator_view = bed
		.service
		.seed_detail(SeedDetailRequest { user_id: alice, seed_id: seed.seed_id })
		.await
		.expect("Creator detail must load.");
	let partner_view = bed
		.service
		.seed_detail(SeedDetailRequest { user_id: bob, seed_id: seed.seed_id })
		.await
		.expect("Partner detail must load.");

	assert!(creator_view.seed.content.is_some());
	assert_eq!(creator_view.seed.media.len(), 1);
	assert!(partner_view.seed.content.is_none());
	assert!(partner_view.seed.media.is_empty());

	bed.clock.set(bloom_at);

	let partner_after = bed
		.service
		.seed_detail(SeedDetailRequest { user_id: bob, seed_id: seed.seed_id })
		.await
		.expect("Partner detail must load after the reveal time.");

	assert!(partner_after.seed.is_ready);
	assert!(partner_after.seed.content.is_some());
	assert_eq!(partner_after.seed.media.len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn media_mutation_is_creator_only_and_windowed() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping media_mutation_is_creator_only_and_windowed; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Media rules".to_string(),
			content: "Uploads are restricted.".to_string(),
			bloom_at: T0 + Duration::days(7),
		})
		.await
		.expect("Failed to create seed.");

	let partner_upload = bed
		.service
		.upload_seed_media(png_upload(bob, seed.seed_id))
		.await
		.expect_err("Partner upload must be rejected.");

	assert!(matches!(partner_upload, Error::Forbidden { .. }));

	let bad_type = bed
		.service
		.upload_seed_media(UploadSeedMediaRequest {
			user_id: alice,
			seed_id: seed.seed_id,
			content_type: "application/zip".to_string(),
			bytes: vec![0_u8; 8],
		})
		.await
		.expect_err("Disallowed content type must be rejected.");

	assert!(matches!(bad_type, Error::InvalidRequest { .. }));

	bed.clock.set(T0 + Duration::hours(24));

	let late_upload = bed
		.service
		.upload_seed_media(png_upload(alice, seed.seed_id))
		.await
		.expect_err("Upload past the window must be rejected.");

	assert!(matches!(late_upload, Error::WindowExpired { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn deleting_media_also_removes_the_blob() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping deleting_media_also_removes_the_blob; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, _) = super::seed_vault(&bed.service).await;
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Attachment".to_string(),
			content: "One photo.".to_string(),
			bloom_at: T0 + Duration::days(7),
		})
		.await
		.expect("Failed to create seed.");
	let uploaded =
		bed.service.upload_seed_media(png_upload(alice, seed.seed_id)).await.expect("Upload failed.");

	bed.service
		.delete_seed_media(DeleteSeedMediaRequest { user_id: alice, media_id: uploaded.media_id })
		.await
		.expect("Delete must succeed.");

	let removed = bed.blobs.removed.lock().expect("Blob lock poisoned.");
	let uploaded_paths = bed.blobs.uploaded.lock().expect("Blob lock poisoned.");

	assert_eq!(removed.len(), 1);
	assert_eq!(removed[0], uploaded_paths[0]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn bloom_carries_media_into_the_memory() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping bloom_carries_media_into_the_memory; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let bloom_at = T0 + Duration::days(1);
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "With photo".to_string(),
			content: "The dock, mid-build.".to_string(),
			bloom_at,
		})
		.await
		.expect("Failed to create seed.");
	let uploaded =
		bed.service.upload_seed_media(png_upload(alice, seed.seed_id)).await.expect("Upload failed.");

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

	assert_eq!(converged.outcome, BloomOutcome::ConvertedToMemory);

	let memory = bed
		.service
		.memory_detail(MemoryDetailRequest {
			user_id: bob,
			memory_id: converged.memory_id.expect("Conversion must yield a memory id."),
		})
		.await
		.expect("Memory detail must load.");

	assert_eq!(memory.media.len(), 1);
	assert_eq!(memory.media[0].file_url, uploaded.file_url);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TRELLIS_PG_DSN to run."]
async fn no_media_attaches_once_the_seed_has_bloomed() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping no_media_attaches_once_the_seed_has_bloomed; set TRELLIS_PG_DSN.");

		return;
	};
	let bed = super::testbed(test_db.dsn()).await.expect("Failed to build test bed.");
	let (_, alice, bob) = super::seed_vault(&bed.service).await;
	let bloom_at = T0 + Duration::hours(1);
	let seed = bed
		.service
		.create_seed(CreateSeedRequest {
			user_id: alice,
			title: "Sealed".to_string(),
			content: "Snapshot is final.".to_string(),
			bloom_at,
		})
		.await
		.expect("Failed to create seed.");

	bed.service.upload_seed_media(png_upload(alice, seed.seed_id)).await.expect("Upload failed.");
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

	assert_eq!(converged.outcome, BloomOutcome::ConvertedToMemory);

	// The upload takes the seed's row lock, so it observes the bloomed status
	// instead of slipping a row in behind the snapshot.
	let late_upload = bed
		.service
		.upload_seed_media(png_upload(alice, seed.seed_id))
		.await
		.expect_err("Upload after the bloom must be rejected.");

	assert!(matches!(late_upload, Error::InvalidState { .. }));

	let memory = bed
		.service
		.memory_detail(MemoryDetailRequest {
			user_id: alice,
			memory_id: converged.memory_id.expect("Conversion must yield a memory id."),
		})
		.await
		.expect("Memory detail must load.");

	assert_eq!(memory.media.len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
