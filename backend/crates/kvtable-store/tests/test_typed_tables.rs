//! Typed tables layered over the canonical string table.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use kvtable_commons::{FnMarshaller, IdentityMarshaller, ParseMarshaller};
use kvtable_store::{
    json_table, CollectionAnyExt, CollectionView, InMemoryTableService, MapView, StringTable,
    Table, TableAnyExt, TableError, TimedTable, TimingSink, TransformingTable,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

fn strings(name: &str) -> StringTable {
    StringTable::new(Arc::new(InMemoryTableService::new()), name)
}

fn numeric(inner: &StringTable) -> TransformingTable<f32, i64, i32> {
    TransformingTable::new(
        Arc::new(inner.clone()),
        Arc::new(ParseMarshaller::<f32>::new()),
        Arc::new(ParseMarshaller::<i64>::new()),
        Arc::new(ParseMarshaller::<i32>::new()),
    )
}

#[test]
fn test_numeric_table_round_trip() {
    let canonical = strings("numeric");
    let typed = numeric(&canonical);

    typed.put(0.5, 23, 1).unwrap();
    assert_eq!(typed.get(&0.5, &23).unwrap(), Some(1));
    assert!(typed.contains_value(&1).unwrap());
    assert!(!typed.contains_any(&0.5_f32, &"wrong-type-object").unwrap());

    // the canonical table sees the marshalled strings
    assert_eq!(
        canonical.get(&"0.5".to_string(), &"23".to_string()).unwrap(),
        Some("1".to_string())
    );

    let row = typed.row(0.5).unwrap();
    assert_eq!(row.get(&23).unwrap(), Some(1));
    assert_eq!(typed.column_key_set().to_vec().unwrap(), vec![23]);
    assert!(typed.values().contains_any(&1_i32).unwrap());
    assert!(!typed.values().contains_any(&1_u8).unwrap());
}

#[test]
fn test_typed_views_are_live() {
    let canonical = strings("typed_live");
    let typed = numeric(&canonical);
    let rows = typed.row_key_set();
    assert!(rows.is_empty().unwrap());

    canonical
        .put("2.5".to_string(), "7".to_string(), "70".to_string())
        .unwrap();
    assert_eq!(rows.to_vec().unwrap(), vec![2.5]);
    assert_eq!(typed.row_map().get(&2.5).unwrap().unwrap().get(&7).unwrap(), Some(70));
}

#[test]
fn test_custom_marshaller() {
    let canonical = strings("custom");
    let upper = FnMarshaller::new(
        |s: &String| Ok(s.to_uppercase()),
        |s: &String| Ok(s.to_lowercase()),
    );
    let table: TransformingTable<String, String, String> = TransformingTable::new(
        Arc::new(canonical.clone()),
        Arc::new(upper),
        Arc::new(IdentityMarshaller),
        Arc::new(IdentityMarshaller),
    );
    table
        .put("alice".to_string(), "age".to_string(), "30".to_string())
        .unwrap();
    assert!(canonical.contains_row(&"ALICE".to_string()).unwrap());
    assert_eq!(
        table.row_key_set().to_vec().unwrap(),
        vec!["alice".to_string()]
    );
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct Sku {
    vendor: String,
    code: u32,
}

#[test]
fn test_json_table_with_structured_keys() {
    let canonical = strings("inventory");
    let stock = json_table::<Sku, String, BTreeMap<String, u32>>(Arc::new(canonical.clone()));
    let sku = Sku {
        vendor: "acme/west".to_string(),
        code: 7,
    };

    let mut levels = BTreeMap::new();
    levels.insert("shelf".to_string(), 4);
    stock
        .put(sku.clone(), "2026-10".to_string(), levels.clone())
        .unwrap();

    assert_eq!(
        stock.get(&sku, &"2026-10".to_string()).unwrap(),
        Some(levels)
    );
    let raw_row = serde_json::to_value(&sku).unwrap().to_string();
    assert!(canonical.contains_row(&raw_row).unwrap());
    assert!(matches!(
        stock.put(sku, "2026-11".to_string(), BTreeMap::new()),
        Ok(None)
    ));
}

#[test]
fn test_json_table_rejects_null() {
    let stock = json_table::<String, String, Option<String>>(Arc::new(strings("nulls")));
    let err = stock
        .put("r".to_string(), "c".to_string(), None)
        .unwrap_err();
    assert!(matches!(err, TableError::InvalidArgument(_)));
}

#[derive(Default)]
struct Counting {
    ops: Mutex<Vec<&'static str>>,
}

impl TimingSink for Counting {
    fn record(&self, operation: &'static str, _elapsed: Duration, _succeeded: bool) {
        self.ops.lock().push(operation);
    }
}

#[test]
fn test_timed_typed_table() {
    let sink = Arc::new(Counting::default());
    let timed = TimedTable::new(numeric(&strings("timed")), sink.clone());

    timed.put(1.5, 1, 10).unwrap();
    assert_eq!(timed.get(&1.5, &1).unwrap(), Some(10));
    assert_eq!(timed.remove(&1.5, &1).unwrap(), Some(10));
    assert_eq!(*sink.ops.lock(), vec!["put", "get", "remove"]);
}
