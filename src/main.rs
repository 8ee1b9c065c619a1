use anyhow::Result;
use pagestore::btree::BTree;
use pagestore::buffer_pool::ReplacementStrategy;
use pagestore::table::Table;
use pagestore::tuple::schema::{Attribute, Schema};
use pagestore::tuple::types::Value;
use pagestore::tuple::Record;

/// Minimal driver: creates a table and a secondary index over it,
/// inserts a few tuples, scans both back. Not a shell — just enough to
/// exercise the public API end to end.
fn main() -> Result<()> {
    let table_path = "data/users.tbl";
    let index_path = "data/users.idx";

    let schema = Schema::new(vec![Attribute::int("id"), Attribute::string("name", 16)]);
    let mut table = Table::create(table_path, schema, 16, ReplacementStrategy::Lru)?;
    let mut index = BTree::create(index_path, 4)?;

    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        let record = Record::new(vec![Value::Int(id), Value::Str(name.to_string())]);
        let rid = table.insert(&record)?;
        index.insert_key(id as i64, rid)?;
    }

    println!("tuples: {}", table.get_num_tuples()?);

    let mut scan = index.scan();
    while let Ok((key, rid)) = scan.next() {
        let record = table.get(rid)?;
        println!("{key} -> {record:?}");
    }

    table.close()?;
    index.close()?;
    Ok(())
}
