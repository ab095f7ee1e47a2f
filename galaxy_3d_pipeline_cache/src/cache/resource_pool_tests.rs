/// Tests for ResourcePool

use super::*;

#[test]
fn test_is_expired_is_strict() {
    // last_used + max_age < epoch
    assert!(!is_expired(0, 10, 10));
    assert!(is_expired(0, 11, 10));
    assert!(!is_expired(5, 15, 10));
    assert!(is_expired(5, 16, 10));
}

#[test]
fn test_is_expired_saturates() {
    assert!(!is_expired(u64::MAX, u64::MAX, 10));
    assert!(!is_expired(1, 5, u64::MAX));
}

#[test]
fn test_insert_and_touch() {
    let mut pool: ResourcePool<u32, &str> = ResourcePool::new();
    assert!(pool.is_empty());

    pool.insert(1, "a", 0);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.get(&1).map(|e| e.last_used), Some(0));

    assert_eq!(pool.touch(&1, 7).map(|v| *v), Some("a"));
    assert_eq!(pool.get(&1).map(|e| e.last_used), Some(7));

    assert!(pool.touch(&2, 7).is_none());
}

#[test]
fn test_evict_expired_only_removes_old_entries() {
    let mut pool: ResourcePool<u32, u32> = ResourcePool::new();
    pool.insert(1, 100, 0);
    pool.insert(2, 200, 3);
    pool.insert(3, 300, 5);

    assert!(!pool.has_expired(10, 10));
    assert!(pool.evict_expired(10, 10).is_empty());

    assert!(pool.has_expired(14, 10));
    let mut evicted = pool.evict_expired(14, 10);
    evicted.sort_by_key(|(key, _)| *key);

    assert_eq!(evicted.len(), 2);
    assert_eq!(evicted[0].0, 1);
    assert_eq!(evicted[0].1.value, 100);
    assert_eq!(evicted[1].0, 2);
    assert_eq!(pool.len(), 1);
    assert!(pool.contains(&3));
}

#[test]
fn test_max_last_used() {
    let mut pool: ResourcePool<u32, ()> = ResourcePool::new();
    assert_eq!(pool.max_last_used(), None);
    pool.insert(1, (), 4);
    pool.insert(2, (), 9);
    pool.insert(3, (), 2);
    assert_eq!(pool.max_last_used(), Some(9));
}

#[test]
fn test_drain_empties_pool() {
    let mut pool: ResourcePool<u32, u32> = ResourcePool::new();
    pool.insert(1, 10, 0);
    pool.insert(2, 20, 0);

    let drained: Vec<_> = pool.drain().collect();
    assert_eq!(drained.len(), 2);
    assert!(pool.is_empty());
}
