//! Property-based tests for storage reconciliation.
//!
//! Reconciling twice in a row must yield the same report, and the report
//! must describe exactly the downloads whose files are on disk.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use classroom_offline::database::Database;
use classroom_offline::managers::download_index::{DownloadIndex, DownloadIndexTrait};
use classroom_offline::services::storage_reconciler::{StorageReconciler, StorageReconcilerTrait};
use classroom_offline::types::download::DownloadRecord;
use proptest::prelude::*;
use tempfile::TempDir;

/// id -> (file size, file still on disk)
fn arb_downloads() -> impl Strategy<Value = BTreeMap<String, (usize, bool)>> {
    prop::collection::btree_map("[a-z0-9_-]{1,12}", (0usize..4096, any::<bool>()), 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn reconcile_is_idempotent(downloads in arb_downloads()) {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Database::open_in_memory().unwrap());
        let index = Arc::new(DownloadIndex::new(db, dir.path().join("downloads")));
        fs::create_dir_all(index.downloads_dir()).unwrap();
        let reconciler = StorageReconciler::new(index.clone());

        for (id, (size, _)) in &downloads {
            let path = index.file_path_for(id);
            fs::write(&path, vec![0u8; *size]).unwrap();
            index.upsert_completed(DownloadRecord::recording(id, id, path)).unwrap();
        }
        for (id, (_, on_disk)) in &downloads {
            if !on_disk {
                fs::remove_file(index.file_path_for(id)).unwrap();
            }
        }

        let first = reconciler.reconcile();
        let second = reconciler.reconcile();
        prop_assert_eq!(&first, &second);

        // Newest first: insertion order was ascending id order.
        let expected_ids: Vec<String> = downloads
            .iter()
            .filter(|(_, (_, on_disk))| *on_disk)
            .map(|(id, _)| id.clone())
            .rev()
            .collect();
        let ids: Vec<String> = first.records.iter().map(|r| r.id.clone()).collect();
        prop_assert_eq!(ids, expected_ids);

        let expected_total: u64 = downloads
            .values()
            .filter(|(_, on_disk)| *on_disk)
            .map(|(size, _)| *size as u64)
            .sum();
        prop_assert_eq!(first.total_bytes, expected_total);

        for (id, (_, on_disk)) in &downloads {
            prop_assert_eq!(index.get_completed(id).is_some(), *on_disk);
        }
    }
}
