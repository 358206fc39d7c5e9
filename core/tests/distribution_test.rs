//! Distribution and inventory tests
//!
//! A distribution draws stock down atomically; stock can never go negative
//! and the dashboard rate follows the distributed/total ratio.

use relief_core::model::*;
use relief_core::{ReliefError, Store};

fn rice(quantity: i64) -> NewReliefResource {
    NewReliefResource {
        name: "Rice".to_string(),
        resource_type: "food".to_string(),
        quantity,
        unit: "kg".to_string(),
        location: Some("Upazila warehouse".to_string()),
        zone_id: None,
    }
}

fn hand_out(resource_id: i64, quantity: i64) -> NewDistribution {
    NewDistribution {
        resource_id,
        zone_id: None,
        population_id: None,
        quantity,
        recipient_count: None,
        notes: None,
    }
}

#[tokio::test]
async fn distribution_decrements_available_stock() {
    let store = Store::open_in_memory().unwrap();
    let r = store.create_resource(&rice(100)).await.unwrap();
    assert_eq!(r.distributed, 0);

    let d = store.create_distribution(&hand_out(r.id, 30), None).await.unwrap();
    assert_eq!(d.quantity, 30);
    assert_eq!(d.recipient_count, 1);

    let after = store.get_resource(r.id).await.unwrap();
    assert_eq!(after.distributed, 30);
    assert_eq!(after.available(), 70);
}

#[tokio::test]
async fn overdrawing_stock_is_a_conflict_and_changes_nothing() {
    let store = Store::open_in_memory().unwrap();
    let r = store.create_resource(&rice(10)).await.unwrap();
    store.create_distribution(&hand_out(r.id, 8), None).await.unwrap();

    let err = store
        .create_distribution(&hand_out(r.id, 3), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReliefError::Conflict(ref m) if m.contains("insufficient stock")));

    assert_eq!(store.get_resource(r.id).await.unwrap().distributed, 8);
    let logged = store
        .list_distributions(&DistributionFilter::default())
        .await
        .unwrap();
    assert_eq!(logged.len(), 1);
}

#[tokio::test]
async fn exact_remaining_stock_can_be_distributed() {
    let store = Store::open_in_memory().unwrap();
    let r = store.create_resource(&rice(5)).await.unwrap();
    store.create_distribution(&hand_out(r.id, 5), None).await.unwrap();
    assert_eq!(store.get_resource(r.id).await.unwrap().available(), 0);
}

#[tokio::test]
async fn unknown_resource_or_person_is_not_found() {
    let store = Store::open_in_memory().unwrap();
    let err = store
        .create_distribution(&hand_out(77, 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReliefError::NotFound(ref m) if m == "resource 77 not found"));

    let r = store.create_resource(&rice(5)).await.unwrap();
    let mut to_person = hand_out(r.id, 1);
    to_person.population_id = Some(12);
    let err = store.create_distribution(&to_person, None).await.unwrap_err();
    assert!(matches!(err, ReliefError::NotFound(ref m) if m == "person 12 not found"));
    assert_eq!(store.get_resource(r.id).await.unwrap().distributed, 0);
}

#[tokio::test]
async fn quantity_cannot_drop_below_distributed() {
    let store = Store::open_in_memory().unwrap();
    let r = store.create_resource(&rice(50)).await.unwrap();
    store.create_distribution(&hand_out(r.id, 20), None).await.unwrap();

    let err = store
        .update_resource(
            r.id,
            &ReliefResourcePatch {
                quantity: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReliefError::Conflict(_)));

    let restocked = store
        .update_resource(
            r.id,
            &ReliefResourcePatch {
                quantity: Some(120),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(restocked.quantity, 120);
    assert_eq!(restocked.distributed, 20);
}

#[tokio::test]
async fn distribution_patch_touches_bookkeeping_only() {
    let store = Store::open_in_memory().unwrap();
    let r = store.create_resource(&rice(40)).await.unwrap();
    let d = store.create_distribution(&hand_out(r.id, 4), None).await.unwrap();

    let patched = store
        .update_distribution(
            d.id,
            &DistributionPatch {
                recipient_count: Some(4),
                notes: Some("one family pack each".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.recipient_count, 4);
    assert_eq!(patched.quantity, 4);
    assert_eq!(patched.notes.as_deref(), Some("one family pack each"));
}

#[tokio::test]
async fn distributions_filter_by_resource() {
    let store = Store::open_in_memory().unwrap();
    let a = store.create_resource(&rice(10)).await.unwrap();
    let b = store.create_resource(&rice(10)).await.unwrap();
    store.create_distribution(&hand_out(a.id, 1), None).await.unwrap();
    store.create_distribution(&hand_out(b.id, 2), None).await.unwrap();
    store.create_distribution(&hand_out(b.id, 3), None).await.unwrap();

    let for_b = store
        .list_distributions(&DistributionFilter {
            resource_id: Some(b.id),
            zone_id: None,
        })
        .await
        .unwrap();
    assert_eq!(for_b.len(), 2);
    assert_eq!(for_b[0].quantity, 3);
}
