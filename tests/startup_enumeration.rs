// tests/startup_enumeration.rs

mod common;
use crate::common::builders::{account, cache_entry, local_path, CoreBuilder};
use crate::common::init_tracing;

use anyhow::anyhow;
use autoupdate::engine::{AutoUpdateEvent, ChangeOutcome, CoreCommand};
use autoupdate::store::{AccountRegistry, CacheStore, MemoryCacheStore};
use autoupdate::types::CacheEntry;

struct BrokenStore;

impl CacheStore for BrokenStore {
    fn list_all_cached_files(&self) -> anyhow::Result<Vec<CacheEntry>> {
        Err(anyhow!("database is locked"))
    }
}

#[test]
fn startup_watches_existing_cached_files() {
    init_tracing();
    let alice = account("alice");
    let accounts = AccountRegistry::new();
    accounts.add(alice.clone());
    let store = MemoryCacheStore::with_entries(vec![cache_entry(&alice, "R1", "/docs/x.txt")]);
    let (mut core, _fs, _repos) = CoreBuilder::new().with_file("R1", "/docs/x.txt").build();

    let report = core.start(&store, &accounts);

    let path = local_path("R1", "/docs/x.txt");
    assert_eq!(path.to_string_lossy().replace('\\', "/"), "/cache/R1/docs/x.txt");
    assert_eq!(report.commands, vec![CoreCommand::Watch(path.clone())]);
    assert_eq!(report.watched, 1);
    assert!(!report.aborted);

    // Scenario: repo not fully local, no recent image open -> one upload.
    let step = core.step(AutoUpdateEvent::FileChanged { path });
    assert_eq!(step.outcome, Some(ChangeOutcome::UploadStarted));
    let uploads: Vec<_> = step
        .commands
        .iter()
        .filter_map(|c| match c {
            CoreCommand::StartUpload(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].overwrite);
}

#[test]
fn startup_counts_missing_local_files() {
    init_tracing();
    let alice = account("alice");
    let accounts = AccountRegistry::new();
    accounts.add(alice.clone());
    let store = MemoryCacheStore::with_entries(vec![
        cache_entry(&alice, "R1", "/gone.txt"),
        cache_entry(&alice, "R1", "/here.txt"),
    ]);
    let (mut core, _fs, _repos) = CoreBuilder::new().with_file("R1", "/here.txt").build();

    let report = core.start(&store, &accounts);

    assert_eq!(report.watched, 1);
    assert_eq!(report.missing_files, 1);
    assert!(core.watch_set().contains(&local_path("R1", "/here.txt")));
    assert!(!core.watch_set().contains(&local_path("R1", "/gone.txt")));
}

#[test]
fn missing_account_stops_enumeration_by_default() {
    init_tracing();
    let alice = account("alice");
    let bob = account("bob");
    let accounts = AccountRegistry::new();
    accounts.add(alice.clone());
    let store = MemoryCacheStore::with_entries(vec![
        cache_entry(&alice, "R1", "/first.txt"),
        cache_entry(&bob, "R2", "/orphan.txt"),
        cache_entry(&alice, "R1", "/never.txt"),
    ]);
    let (mut core, _fs, _repos) = CoreBuilder::new()
        .with_file("R1", "/first.txt")
        .with_file("R2", "/orphan.txt")
        .with_file("R1", "/never.txt")
        .build();

    let report = core.start(&store, &accounts);

    assert!(report.aborted);
    assert_eq!(report.watched, 1);
    assert_eq!(report.missing_accounts, 1);
    assert!(core.watch_set().contains(&local_path("R1", "/first.txt")));
    assert!(!core.watch_set().contains(&local_path("R1", "/never.txt")));
}

#[test]
fn missing_account_skips_only_that_entry_when_configured() {
    init_tracing();
    let alice = account("alice");
    let bob = account("bob");
    let accounts = AccountRegistry::new();
    accounts.add(alice.clone());
    let store = MemoryCacheStore::with_entries(vec![
        cache_entry(&bob, "R2", "/orphan.txt"),
        cache_entry(&alice, "R1", "/kept.txt"),
    ]);
    let (mut core, _fs, _repos) = CoreBuilder::new()
        .with_file("R2", "/orphan.txt")
        .with_file("R1", "/kept.txt")
        .skip_missing_accounts(true)
        .build();

    let report = core.start(&store, &accounts);

    assert!(!report.aborted);
    assert_eq!(report.watched, 1);
    assert_eq!(report.missing_accounts, 1);
    assert!(core.watch_set().contains(&local_path("R1", "/kept.txt")));
    assert!(!core.watch_set().contains(&local_path("R2", "/orphan.txt")));
}

#[test]
fn unreadable_cache_store_yields_empty_startup() {
    init_tracing();
    let accounts = AccountRegistry::new();
    let (mut core, _fs, _repos) = CoreBuilder::new().build();

    let report = core.start(&BrokenStore, &accounts);

    assert!(report.commands.is_empty());
    assert_eq!(report.watched, 0);
    assert!(core.watch_set().is_empty());
}

#[test]
fn account_deleted_after_caching_is_treated_as_missing() {
    init_tracing();
    let alice = account("alice");
    let accounts = AccountRegistry::new();
    accounts.add(alice.clone());
    let store = MemoryCacheStore::new();
    store.push(cache_entry(&alice, "R1", "/a.txt"));
    assert!(accounts.remove(&alice.signature).is_some());
    let (mut core, _fs, _repos) = CoreBuilder::new().with_file("R1", "/a.txt").build();

    let report = core.start(&store, &accounts);

    assert!(report.aborted);
    assert_eq!(report.missing_accounts, 1);
    assert!(core.watch_set().is_empty());
}
