//! Integration tests for preview cache bounds and pruning through the service.

use tonegrade_color::{GlobalParameters, ToneAdjustment};
use tonegrade_core::limits::MAX_CACHE_ITEMS;
use tonegrade_core::ImageBuffer;
use tonegrade_preview::{PreviewCache, PreviewConfig, PreviewService};
use uuid::Uuid;

fn apply_neutral(service: &PreviewService, owner: Option<&str>, node: &str) -> String {
    let image = ImageBuffer::new(8, 8);
    let params = GlobalParameters::default();
    service
        .apply(&image, owner, node, &ToneAdjustment::NEUTRAL, &params)
        .key()
        .unwrap()
        .to_string()
}

#[test]
fn eleventh_distinct_node_evicts_the_oldest() {
    let config = PreviewConfig::default();
    let service = PreviewService::new(PreviewCache::new(&config).shared(), &config);

    let keys: Vec<String> = (0..=MAX_CACHE_ITEMS)
        .map(|n| apply_neutral(&service, Some("W1"), &n.to_string()))
        .collect();

    assert_eq!(service.cache().len(), MAX_CACHE_ITEMS);
    let missing = service
        .render_preview(&keys[0], &ToneAdjustment::NEUTRAL, &GlobalParameters::default())
        .unwrap_err();
    assert!(missing.is_not_found());
    for key in &keys[1..] {
        assert!(service.cache().contains(key));
    }
}

#[test]
fn rerunning_a_node_keeps_one_entry_and_refreshes_it() {
    let service = PreviewService::new(
        PreviewCache::with_capacity(3).shared(),
        &PreviewConfig::default(),
    );
    apply_neutral(&service, Some("W1"), "1");
    apply_neutral(&service, Some("W1"), "2");
    apply_neutral(&service, Some("W1"), "3");

    // Re-running node 1 makes it newest, so node 2 is evicted next.
    apply_neutral(&service, Some("W1"), "1");
    apply_neutral(&service, Some("W1"), "4");

    assert_eq!(
        service.cache().keys(),
        vec!["colorbalance_W1_3", "colorbalance_W1_1", "colorbalance_W1_4"]
    );
}

#[test]
fn owners_are_isolated() {
    let config = PreviewConfig::default();
    let service = PreviewService::new(PreviewCache::new(&config).shared(), &config);
    let alice = Uuid::new_v4().to_string();
    let bob = Uuid::new_v4().to_string();

    apply_neutral(&service, Some(&alice), "1");
    apply_neutral(&service, Some(&alice), "2");
    let bob_key = apply_neutral(&service, Some(&bob), "1");

    assert_eq!(service.cache().prune_owner(&alice), 2);
    assert_eq!(service.cache().keys(), vec![bob_key]);
}

#[test]
fn missing_owner_shares_the_unknown_bucket() {
    let config = PreviewConfig::default();
    let service = PreviewService::new(PreviewCache::new(&config).shared(), &config);

    let a = apply_neutral(&service, None, "7");
    let b = apply_neutral(&service, Some(""), "7");

    assert_eq!(a, "colorbalance_unknown_7");
    assert_eq!(a, b);
    assert_eq!(service.cache().len(), 1);
}

#[test]
fn custom_prefix_flows_into_keys() {
    let config = PreviewConfig::from_json(r#"{"key_prefix": "grade", "max_items": 2}"#).unwrap();
    let service = PreviewService::new(PreviewCache::new(&config).shared(), &config);

    let key = apply_neutral(&service, Some("W1"), "5");
    assert_eq!(key, "grade_W1_5");
    assert_eq!(service.cache().capacity(), 2);
    assert_eq!(service.preview_box(), (512, 512));
}

#[test]
fn owner_ids_containing_underscores_do_not_collide() {
    let config = PreviewConfig::default();
    let service = PreviewService::new(PreviewCache::new(&config).shared(), &config);

    let nested = apply_neutral(&service, Some("W1_5"), "x");
    let plain = apply_neutral(&service, Some("W1"), "5");
    assert!(service.cache().contains(&nested));
    assert!(service.cache().contains(&plain));

    assert_eq!(service.cache().prune_owner("W1"), 1);
    assert!(service.cache().contains(&nested));
}
