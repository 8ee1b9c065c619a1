//! End-to-end versions of the concrete scenarios this engine is specified
//! against: buffer-pool replacement, dirty write-back, tuple round-trips,
//! predicate scans, and B+-tree structural behavior under insert/delete.

use anyhow::Result;
use pagestore::buffer_pool::{BufferPoolManager, ReplacementStrategy};
use pagestore::btree::BTree;
use pagestore::disk_manager::DiskManager;
use pagestore::pages::PageId;
use pagestore::table::Table;
use pagestore::tuple::schema::{Attribute, Schema};
use pagestore::tuple::types::Value;
use pagestore::tuple::Record;
use uuid::Uuid;

fn temp_path(tag: &str) -> String {
    format!("data/test/{tag}_{}.db", Uuid::new_v4())
}

#[test]
fn fifo_replacement_keeps_load_order() -> Result<()> {
    let path = temp_path("fifo");
    let mut disk = DiskManager::create(&path)?;
    disk.ensure_capacity(4)?; // pages 0..=4 exist on disk

    let mut bpm = BufferPoolManager::new(3, disk, ReplacementStrategy::Fifo);
    for page in [1, 2, 3] {
        bpm.pin(page)?;
        bpm.unpin(page)?;
    }
    bpm.pin(4)?;
    bpm.unpin(4)?;

    assert_eq!(bpm.frame_contents(), vec![4 as PageId, 2, 3]);
    assert_eq!(bpm.num_read_io(), 4);
    assert_eq!(bpm.num_write_io(), 0);
    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn lru_replacement_evicts_least_recently_used() -> Result<()> {
    let path = temp_path("lru");
    let mut disk = DiskManager::create(&path)?;
    disk.ensure_capacity(4)?;

    let mut bpm = BufferPoolManager::new(3, disk, ReplacementStrategy::Lru);
    for page in [1, 2, 3, 1, 4] {
        bpm.pin(page)?;
        bpm.unpin(page)?;
    }

    assert_eq!(bpm.frame_contents(), vec![1 as PageId, 4, 3]);
    assert_eq!(bpm.num_read_io(), 4);
    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn dirty_page_survives_flush_and_reopen() -> Result<()> {
    let path = temp_path("flush");
    let mut disk = DiskManager::create(&path)?;
    disk.ensure_capacity(2)?;

    let mut bpm = BufferPoolManager::new(2, disk, ReplacementStrategy::Lru);
    bpm.pin(2)?;
    bpm.page_mut(2)?.write_bytes(0, 4, b"beef");
    bpm.mark_dirty(2)?;
    bpm.unpin(2)?;
    bpm.flush_all()?;
    assert_eq!(bpm.num_write_io(), 1);
    bpm.shutdown()?;

    let mut reopened = DiskManager::open(&path)?;
    let mut page = pagestore::pages::Page::new();
    reopened.read_page(2, &mut page)?;
    assert_eq!(page.read_bytes(0, 4), b"beef");

    std::fs::remove_file(&path).ok();
    Ok(())
}

fn user_schema() -> Schema {
    Schema::new(vec![Attribute::int("a"), Attribute::string("b", 4), Attribute::int("c")])
}

#[test]
fn record_round_trip() -> Result<()> {
    let path = temp_path("tbl_roundtrip");
    let mut table = Table::create(&path, user_schema(), 8, ReplacementStrategy::Lru)?;

    let r1 = Record::new(vec![Value::Int(1), Value::Str("aaaa".into()), Value::Int(3)]);
    let r2 = Record::new(vec![Value::Int(2), Value::Str("bbbb".into()), Value::Int(4)]);
    let rid1 = table.insert(&r1)?;
    let rid2 = table.insert(&r2)?;

    assert_eq!(table.get_num_tuples()?, 2);
    assert_eq!(table.get(rid1)?, r1);
    assert_eq!(table.get(rid2)?, r2);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn scan_with_equality_predicate() -> Result<()> {
    let path = temp_path("tbl_scan");
    let mut table = Table::create(&path, user_schema(), 8, ReplacementStrategy::Lru)?;

    let r1 = Record::new(vec![Value::Int(1), Value::Str("aaaa".into()), Value::Int(3)]);
    let r2 = Record::new(vec![Value::Int(2), Value::Str("bbbb".into()), Value::Int(4)]);
    let r3 = Record::new(vec![Value::Int(3), Value::Str("cccc".into()), Value::Int(5)]);
    table.insert(&r1)?;
    let rid2 = table.insert(&r2)?;
    table.insert(&r3)?;

    let predicate = pagestore::expr::Expr::Op(
        pagestore::expr::OpKind::Eq,
        vec![pagestore::expr::Expr::AttrRef(0), pagestore::expr::Expr::Const(Value::Int(2))],
    );
    let mut scan = table.scan(Some(predicate))?;

    let (rid, record) = scan.next()?;
    assert_eq!(rid, rid2);
    assert_eq!(record, r2);
    assert!(scan.next().is_err());

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn btree_insert_lookup_and_delete() -> Result<()> {
    let path = temp_path("idx_stress");
    let mut tree = BTree::create(&path, 3)?;

    for k in [10, 20, 30, 40, 50] {
        tree.insert_key(k, pagestore::tuple::Rid::new(k, 0))?;
    }

    let mut scan = tree.scan();
    let mut seen = Vec::new();
    while let Ok((k, _)) = scan.next() {
        seen.push(k);
    }
    assert_eq!(seen, vec![10, 20, 30, 40, 50]);

    assert!(tree.find_key(30).is_ok());
    assert!(tree.find_key(25).is_err());

    tree.delete_key(20)?;
    let mut scan = tree.scan();
    let mut seen = Vec::new();
    while let Ok((k, _)) = scan.next() {
        seen.push(k);
    }
    assert_eq!(seen, vec![10, 30, 40, 50]);
    assert_eq!(tree.get_num_entries(), 4);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn btree_holds_up_under_shuffled_insert_and_delete() -> Result<()> {
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    let path = temp_path("idx_shuffle");
    let mut tree = BTree::create(&path, 5)?;

    let mut keys: Vec<i64> = (1..=200).collect();
    keys.shuffle(&mut thread_rng());
    for &k in &keys {
        tree.insert_key(k, pagestore::tuple::Rid::new(k, (k % 1000) as u16))?;
    }
    assert_eq!(tree.get_num_entries(), 200);

    let mut to_delete = keys.clone();
    to_delete.shuffle(&mut thread_rng());
    to_delete.truncate(120);
    for &k in &to_delete {
        tree.delete_key(k)?;
    }
    assert_eq!(tree.get_num_entries(), 80);

    let mut remaining: Vec<i64> =
        keys.iter().copied().filter(|k| !to_delete.contains(k)).collect();
    remaining.sort();

    let mut scan = tree.scan();
    let mut seen = Vec::new();
    while let Ok((k, rid)) = scan.next() {
        assert_eq!(rid, pagestore::tuple::Rid::new(k, (k % 1000) as u16));
        seen.push(k);
    }
    assert_eq!(seen, remaining);

    std::fs::remove_file(&path).ok();
    Ok(())
}
