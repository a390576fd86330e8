use super::*;

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn test_set_get_delete() {
    let store = LocalKeyValueStore::new();
    store.set_ex("k", b"value".to_vec(), TTL).await.unwrap();

    assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
    assert!(store.delete("k").await.unwrap());
    assert!(!store.delete("k").await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_expiry() {
    let store = LocalKeyValueStore::new();
    store
        .set_ex("k", b"v".to_vec(), Duration::from_secs(2))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(3)).await;

    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_offline_store_fails() {
    let store = LocalKeyValueStore::new();
    store.set_online(false);

    assert!(matches!(store.ping().await, Err(CacheError::Unavailable(_))));
    assert!(store.get("k").await.is_err());
    assert!(store.set_ex("k", vec![], TTL).await.is_err());

    store.set_online(true);
    assert!(store.ping().await.is_ok());
}

#[tokio::test]
async fn test_scan_pages_through_prefix() {
    let store = LocalKeyValueStore::new();
    for i in 0..7 {
        store
            .set_ex(&format!("ns:{}", i), vec![i as u8], TTL)
            .await
            .unwrap();
    }
    store.set_ex("other:1", vec![], TTL).await.unwrap();

    let mut cursor = 0;
    let mut seen = Vec::new();
    let mut pages = 0;
    loop {
        let page = store.scan(cursor, "ns:*", 3).await.unwrap();
        assert!(page.keys.len() <= 3);
        seen.extend(page.keys);
        pages += 1;
        cursor = page.cursor;
        if cursor == 0 {
            break;
        }
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 7);
    assert!(seen.iter().all(|k| k.starts_with("ns:")));
}

#[tokio::test]
async fn test_scan_survives_deletes_between_pages() {
    let store = LocalKeyValueStore::new();
    for i in 0..10 {
        store.set_ex(&format!("ns:{}", i), vec![], TTL).await.unwrap();
    }

    let mut cursor = 0;
    loop {
        let page = store.scan(cursor, "ns:*", 4).await.unwrap();
        store.delete_many(&page.keys).await.unwrap();
        cursor = page.cursor;
        if cursor == 0 {
            break;
        }
    }

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_delete_many_counts_existing() {
    let store = LocalKeyValueStore::new();
    store.set_ex("a", vec![], TTL).await.unwrap();
    store.set_ex("b", vec![], TTL).await.unwrap();

    let removed = store
        .delete_many(&["a".to_string(), "b".to_string(), "c".to_string()])
        .await
        .unwrap();
    assert_eq!(removed, 2);
}

#[test]
fn test_matches_pattern() {
    assert!(matches_pattern("ns:abc", "ns:*"));
    assert!(!matches_pattern("other:abc", "ns:*"));
    assert!(matches_pattern("exact", "exact"));
    assert!(!matches_pattern("exact2", "exact"));
}
