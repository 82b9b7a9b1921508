//! Curation invariants exercised against an in-memory SQLite database and a
//! recording image store.
//!
//! Run with: `cargo test --test portfolio_test`
mod common;

use jjclicks_backend::db::categories::{get_counter, sync_counters};
use jjclicks_backend::errors::PortfolioError;
use jjclicks_backend::models::portfolio::{
    self, Category, ImageFilter, MAX_IMAGES_PER_CATEGORY, UpdatePortfolioImage,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use common::{FakeImageStore, jpeg, service, setup_db};

fn by_category(category: Category) -> ImageFilter {
    ImageFilter {
        category: Some(category),
        landing_only: false,
    }
}

#[tokio::test]
async fn test_uploads_get_increasing_order_within_a_category() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let a = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    let b = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    let other = svc.upload(jpeg(Category::Events, false)).await.unwrap();
    let c = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();

    assert_eq!((a.order, b.order, c.order), (0, 1, 2));
    assert_eq!(other.order, 0);
    assert_eq!(
        store.stored()[0].0, "jjclicks/wedding",
        "uploads are grouped by category folder"
    );
}

#[tokio::test]
async fn test_order_continues_after_the_highest_existing_value() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let first = svc.upload(jpeg(Category::Corporate, false)).await.unwrap();
    svc.update(
        first.id,
        UpdatePortfolioImage {
            is_landing_page: None,
            order: Some(7),
        },
    )
    .await
    .unwrap();

    let next = svc.upload(jpeg(Category::Corporate, false)).await.unwrap();
    assert_eq!(next.order, 8);
}

#[tokio::test]
async fn test_twenty_first_upload_is_rejected_without_touching_the_store() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    for _ in 0..MAX_IMAGES_PER_CATEGORY {
        svc.upload(jpeg(Category::Maternity, false)).await.unwrap();
    }
    assert_eq!(store.store_calls(), 20);

    let err = svc
        .upload(jpeg(Category::Maternity, false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PortfolioError::CapacityExceeded {
            category: Category::Maternity,
            limit: 20
        }
    ));
    assert_eq!(store.store_calls(), 20, "no external upload on rejection");

    let images = svc.list(by_category(Category::Maternity)).await.unwrap();
    assert_eq!(images.len(), 20);

    // Other categories are unaffected.
    svc.upload(jpeg(Category::Baby, false)).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_uploads_cannot_exceed_capacity() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    for _ in 0..(MAX_IMAGES_PER_CATEGORY - 1) {
        svc.upload(jpeg(Category::Cinematic, false)).await.unwrap();
    }

    let (a, b, c) = tokio::join!(
        svc.upload(jpeg(Category::Cinematic, false)),
        svc.upload(jpeg(Category::Cinematic, false)),
        svc.upload(jpeg(Category::Cinematic, false)),
    );

    let results = [a, b, c];
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(PortfolioError::CapacityExceeded { .. })
        ));
    }

    let images = svc.list(by_category(Category::Cinematic)).await.unwrap();
    assert_eq!(images.len(), 20);
    assert_eq!(get_counter(&db, Category::Cinematic).await.unwrap(), Some(20));

    // Assets stored by the losing uploads were removed again.
    let mut live = store.live_keys();
    live.sort();
    let mut recorded: Vec<String> = images.into_iter().map(|i| i.storage_key).collect();
    recorded.sort();
    assert_eq!(live, recorded);
}

#[tokio::test]
async fn test_at_most_one_landing_image_per_category() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let a = svc.upload(jpeg(Category::Events, true)).await.unwrap();
    let b = svc.upload(jpeg(Category::Events, false)).await.unwrap();
    let c = svc.upload(jpeg(Category::Events, true)).await.unwrap();
    let wedding = svc.upload(jpeg(Category::Wedding, true)).await.unwrap();

    svc.update(
        b.id,
        UpdatePortfolioImage {
            is_landing_page: Some(true),
            order: None,
        },
    )
    .await
    .unwrap();

    let landing = svc
        .list(ImageFilter {
            category: Some(Category::Events),
            landing_only: true,
        })
        .await
        .unwrap();
    assert_eq!(landing.len(), 1);
    assert_eq!(landing[0].id, b.id);

    let events = svc.list(by_category(Category::Events)).await.unwrap();
    for image in events {
        assert_eq!(image.is_landing_page, image.id == b.id, "image {}", image.id);
    }
    assert_ne!(a.id, c.id);

    // Changing the events landing image leaves other categories alone.
    let weddings = svc.list(by_category(Category::Wedding)).await.unwrap();
    assert!(weddings.iter().any(|i| i.id == wedding.id && i.is_landing_page));
}

#[tokio::test]
async fn test_concurrent_landing_updates_leave_a_single_landing_image() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let a = svc.upload(jpeg(Category::Portraits, false)).await.unwrap();
    let b = svc.upload(jpeg(Category::Portraits, false)).await.unwrap();
    let landing = UpdatePortfolioImage {
        is_landing_page: Some(true),
        order: None,
    };

    let (ra, rb) = tokio::join!(
        svc.update(a.id, landing.clone()),
        svc.update(b.id, landing.clone()),
    );
    ra.unwrap();
    rb.unwrap();

    let flagged = svc
        .list(ImageFilter {
            category: Some(Category::Portraits),
            landing_only: true,
        })
        .await
        .unwrap();
    assert_eq!(flagged.len(), 1);
}

#[tokio::test]
async fn test_list_filters_by_category_and_sorts_by_order() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let w0 = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    svc.upload(jpeg(Category::PreWedding, false)).await.unwrap();
    let w1 = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    let w2 = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();

    // Move the first image to the end.
    svc.update(
        w0.id,
        UpdatePortfolioImage {
            is_landing_page: None,
            order: Some(5),
        },
    )
    .await
    .unwrap();

    let weddings = svc.list(by_category(Category::Wedding)).await.unwrap();
    let ids: Vec<Uuid> = weddings.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![w1.id, w2.id, w0.id]);
    assert!(weddings.iter().all(|i| i.category == Category::Wedding));

    let all = svc.list(ImageFilter::default()).await.unwrap();
    assert_eq!(all.len(), 4);
    let orders: Vec<i32> = all.iter().map(|i| i.order).collect();
    let mut sorted = orders.clone();
    sorted.sort();
    assert_eq!(orders, sorted);
}

#[tokio::test]
async fn test_equal_orders_list_newest_upload_first() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let older = svc.upload(jpeg(Category::Baby, false)).await.unwrap();
    let newer = svc.upload(jpeg(Category::Baby, false)).await.unwrap();

    // Give both the same order and distinct, known timestamps.
    let mut active: portfolio::ActiveModel = older.clone().into();
    active.order = Set(3);
    active.uploaded_at = Set(chrono::Utc::now() - chrono::Duration::hours(1));
    active.update(&db).await.unwrap();
    let mut active: portfolio::ActiveModel = newer.clone().into();
    active.order = Set(3);
    active.update(&db).await.unwrap();

    let babies = svc.list(by_category(Category::Baby)).await.unwrap();
    assert_eq!(babies[0].id, newer.id);
    assert_eq!(babies[1].id, older.id);
}

#[tokio::test]
async fn test_landing_only_returns_at_most_one_per_category() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    for category in [Category::Wedding, Category::Events, Category::Wedding] {
        svc.upload(jpeg(category, true)).await.unwrap();
    }
    svc.upload(jpeg(Category::Corporate, false)).await.unwrap();

    let landing = svc
        .list(ImageFilter {
            category: None,
            landing_only: true,
        })
        .await
        .unwrap();

    assert_eq!(landing.len(), 2);
    assert_ne!(landing[0].category, landing[1].category);
    assert!(landing.iter().all(|i| i.is_landing_page));
}

#[tokio::test]
async fn test_deleting_an_unknown_id_changes_nothing() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    svc.upload(jpeg(Category::Events, false)).await.unwrap();
    let before = svc.list(ImageFilter::default()).await.unwrap();

    let missing = Uuid::new_v4();
    let err = svc.delete(missing).await.unwrap_err();
    assert!(matches!(err, PortfolioError::NotFound(id) if id == missing));

    assert_eq!(svc.list(ImageFilter::default()).await.unwrap(), before);
    assert!(store.deprovisioned().is_empty());
}

#[tokio::test]
async fn test_portraits_scenario() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let a = svc.upload(jpeg(Category::Portraits, true)).await.unwrap();
    assert_eq!(a.order, 0);
    assert!(a.is_landing_page);

    let b = svc.upload(jpeg(Category::Portraits, true)).await.unwrap();
    assert_eq!(b.order, 1);
    assert!(b.is_landing_page);

    let a_now = portfolio::Entity::find_by_id(a.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(!a_now.is_landing_page);

    let removed = svc.delete(a.id).await.unwrap();
    assert_eq!(removed.id, a.id);
    assert_eq!(store.deprovisioned(), vec![a.storage_key.clone()]);

    let portraits = svc.list(by_category(Category::Portraits)).await.unwrap();
    assert_eq!(portraits.len(), 1);
    assert_eq!(portraits[0].id, b.id);
    assert!(portraits[0].is_landing_page);
    assert_eq!(portraits[0].order, 1);
}

#[tokio::test]
async fn test_failed_deprovision_keeps_the_record() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let image = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    store.fail_deprovision(true);

    let err = svc.delete(image.id).await.unwrap_err();
    assert!(matches!(err, PortfolioError::ImageStore(_)));
    assert!(err.is_storage_failure());

    let still_there = svc.list(by_category(Category::Wedding)).await.unwrap();
    assert_eq!(still_there.len(), 1);
    assert_eq!(get_counter(&db, Category::Wedding).await.unwrap(), Some(1));

    store.fail_deprovision(false);
    svc.delete(image.id).await.unwrap();
    assert!(svc.list(by_category(Category::Wedding)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_store_records_nothing() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    store.fail_store(true);
    let err = svc.upload(jpeg(Category::Events, true)).await.unwrap_err();
    assert!(matches!(err, PortfolioError::ImageStore(_)));

    assert!(svc.list(ImageFilter::default()).await.unwrap().is_empty());
    assert_eq!(get_counter(&db, Category::Events).await.unwrap(), Some(0));
}

#[tokio::test]
async fn test_invalid_payloads_never_reach_the_store() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let mut empty = jpeg(Category::Wedding, false);
    empty.payload.clear();
    assert!(matches!(
        svc.upload(empty).await,
        Err(PortfolioError::Validation(_))
    ));

    let mut pdf = jpeg(Category::Wedding, false);
    pdf.content_type = Some("application/pdf".to_string());
    assert!(matches!(
        svc.upload(pdf).await,
        Err(PortfolioError::Validation(_))
    ));

    let mut huge = jpeg(Category::Wedding, false);
    huge.payload = vec![0u8; svc.settings().max_upload_bytes + 1];
    assert!(matches!(
        svc.upload(huge).await,
        Err(PortfolioError::Validation(_))
    ));

    assert_eq!(store.store_calls(), 0);
}

#[tokio::test]
async fn test_order_only_update_does_not_touch_siblings() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let a = svc.upload(jpeg(Category::Events, true)).await.unwrap();
    let b = svc.upload(jpeg(Category::Events, false)).await.unwrap();

    let updated = svc
        .update(
            b.id,
            UpdatePortfolioImage {
                is_landing_page: None,
                order: Some(0),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.order, 0);
    assert!(!updated.is_landing_page);

    let a_now = portfolio::Entity::find_by_id(a.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a_now, a, "sibling unchanged");
}

#[tokio::test]
async fn test_update_rejects_bad_input_and_unknown_ids() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let image = svc.upload(jpeg(Category::Wedding, true)).await.unwrap();

    let err = svc
        .update(
            image.id,
            UpdatePortfolioImage {
                is_landing_page: None,
                order: Some(-1),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::Validation(_)));

    let missing = Uuid::new_v4();
    let err = svc
        .update(
            missing,
            UpdatePortfolioImage {
                is_landing_page: Some(true),
                order: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PortfolioError::NotFound(id) if id == missing));

    // An empty patch is a no-op.
    let same = svc
        .update(image.id, UpdatePortfolioImage::default())
        .await
        .unwrap();
    assert_eq!(same, image);

    // Unsetting the landing flag is allowed and leaves the category without one.
    let unset = svc
        .update(
            image.id,
            UpdatePortfolioImage {
                is_landing_page: Some(false),
                order: None,
            },
        )
        .await
        .unwrap();
    assert!(!unset.is_landing_page);
}

#[tokio::test]
async fn test_counters_follow_uploads_and_deletes_and_can_be_repaired() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let a = svc.upload(jpeg(Category::Corporate, false)).await.unwrap();
    svc.upload(jpeg(Category::Corporate, false)).await.unwrap();
    assert_eq!(get_counter(&db, Category::Corporate).await.unwrap(), Some(2));

    svc.delete(a.id).await.unwrap();
    assert_eq!(get_counter(&db, Category::Corporate).await.unwrap(), Some(1));

    // Simulate drift from an out-of-band edit.
    jjclicks_backend::models::categories::ActiveModel {
        slug: Set("corporate".to_string()),
        image_count: Set(9),
    }
    .update(&db)
    .await
    .unwrap();

    sync_counters(&db).await.unwrap();
    assert_eq!(get_counter(&db, Category::Corporate).await.unwrap(), Some(1));
    for category in Category::ALL {
        assert!(get_counter(&db, category).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_category_summaries_report_counts_and_cover_images() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    let cover = svc.upload(jpeg(Category::Wedding, true)).await.unwrap();
    svc.upload(jpeg(Category::Baby, false)).await.unwrap();

    let summaries = svc.category_summaries().await.unwrap();
    assert_eq!(summaries.len(), 8);
    assert_eq!(
        summaries.iter().map(|s| s.category).collect::<Vec<_>>(),
        Category::ALL.to_vec()
    );

    let wedding = &summaries[0];
    assert_eq!(wedding.count, 2);
    assert_eq!(wedding.capacity, 20);
    assert_eq!(wedding.landing_image_url.as_deref(), Some(cover.url.as_str()));

    let baby = summaries
        .iter()
        .find(|s| s.category == Category::Baby)
        .unwrap();
    assert_eq!(baby.count, 1);
    assert_eq!(baby.title, "Baby Shoot");
    assert!(baby.landing_image_url.is_none());
}

#[tokio::test]
async fn test_order_exhaustion_is_a_validation_error() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let first = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    svc.update(
        first.id,
        UpdatePortfolioImage {
            is_landing_page: None,
            order: Some(i32::MAX),
        },
    )
    .await
    .unwrap();

    let err = svc.upload(jpeg(Category::Wedding, false)).await.unwrap_err();
    assert!(matches!(err, PortfolioError::Validation(_)));

    // Nothing recorded, slot returned, and the stored asset cleaned up.
    let weddings = svc.list(by_category(Category::Wedding)).await.unwrap();
    assert_eq!(weddings.len(), 1);
    assert_eq!(get_counter(&db, Category::Wedding).await.unwrap(), Some(1));
    assert_eq!(store.deprovisioned(), vec![store.stored()[1].1.clone()]);

    // Lowering the order makes room again.
    svc.update(
        first.id,
        UpdatePortfolioImage {
            is_landing_page: None,
            order: Some(3),
        },
    )
    .await
    .unwrap();
    let next = svc.upload(jpeg(Category::Wedding, false)).await.unwrap();
    assert_eq!(next.order, 4);
}

#[tokio::test]
async fn test_duplicate_storage_key_never_removes_the_live_asset() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);
    store.always_return_key("jjclicks/shared");

    let first = svc.upload(jpeg(Category::Events, false)).await.unwrap();
    let err = svc.upload(jpeg(Category::Events, false)).await.unwrap_err();
    assert!(err.is_storage_failure());

    assert!(
        store.deprovisioned().is_empty(),
        "asset still referenced by {}",
        first.id
    );
    let events = svc.list(by_category(Category::Events)).await.unwrap();
    assert_eq!(events, vec![first]);
    assert_eq!(get_counter(&db, Category::Events).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_delete_succeeds_when_the_host_already_lost_the_asset() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    let image = svc.upload(jpeg(Category::Maternity, false)).await.unwrap();
    store.lose(&image.storage_key);

    svc.delete(image.id).await.unwrap();

    assert_eq!(store.already_absent(), vec![image.storage_key.clone()]);
    assert!(svc.list(by_category(Category::Maternity)).await.unwrap().is_empty());
    assert_eq!(get_counter(&db, Category::Maternity).await.unwrap(), Some(0));
}

#[tokio::test]
async fn test_freshly_migrated_database_accepts_uploads() {
    let db = jjclicks_backend::create_pool("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    for category in Category::ALL {
        assert_eq!(get_counter(&db, category).await.unwrap(), Some(0));
    }
    let image = svc.upload(jpeg(Category::Baby, true)).await.unwrap();
    assert_eq!(image.order, 0);
    assert_eq!(get_counter(&db, Category::Baby).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_missing_counter_row_is_a_storage_failure_not_capacity() {
    let db = setup_db().await;
    let store = FakeImageStore::new();
    let svc = service(&db, &store);

    jjclicks_backend::models::categories::Entity::delete_by_id("cinematic".to_string())
        .exec(&db)
        .await
        .unwrap();

    let err = svc.upload(jpeg(Category::Cinematic, false)).await.unwrap_err();
    assert!(matches!(err, PortfolioError::Database(_)));
    assert_eq!(store.live_keys(), Vec::<String>::new());
}
