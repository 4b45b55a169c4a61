// tests/notify_notifier.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use notify::event::{AccessKind, AccessMode, DataChange, ModifyKind};
use notify::{Event, EventKind};
use tempfile::tempdir;
use tokio::sync::mpsc;

use autoupdate::engine::AutoUpdateEvent;
use autoupdate::watch::notifier::changed_paths;
use autoupdate::watch::{Notifier, NotifyNotifier};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn access_events_are_not_changes() {
    let path = PathBuf::from("/cache/R1/a.txt");

    let access = Event::new(EventKind::Access(AccessKind::Close(AccessMode::Read)))
        .add_path(path.clone());
    assert!(changed_paths(access).is_empty());

    let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(path.clone());
    assert_eq!(changed_paths(modify), vec![path]);
}

#[tokio::test]
async fn watching_a_missing_file_fails() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let (tx, _rx) = mpsc::channel::<AutoUpdateEvent>(8);
    let mut notifier = NotifyNotifier::spawn(tx)?;

    assert!(notifier.watch(&dir.path().join("missing.txt")).is_err());
    Ok(())
}

#[tokio::test]
async fn writes_to_a_watched_file_are_reported() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let file = dir.path().join("x.txt");
    fs::write(&file, "v1")?;

    let (tx, mut rx) = mpsc::channel::<AutoUpdateEvent>(8);
    let mut notifier = NotifyNotifier::spawn(tx)?;
    notifier.watch(&file)?;

    fs::write(&file, "v2")?;

    let reported = with_timeout(async {
        loop {
            match rx.recv().await {
                Some(AutoUpdateEvent::FileChanged { path }) => break Some(path),
                Some(_) => continue,
                None => break None,
            }
        }
    })
    .await;
    assert_eq!(reported, Some(file.clone()));

    notifier.unwatch(&file)?;
    Ok(())
}
