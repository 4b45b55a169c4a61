// tests/runtime_fake_upload.rs

mod common;
use crate::common::builders::{account, cache_entry, local_path, CoreBuilder};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};

use autoupdate::engine::{AutoUpdateEvent, Runtime};
use autoupdate::store::{AccountRegistry, MemoryCacheStore};
use autoupdate::types::FileUpdated;
use autoupdate_test_utils::fake_notifier::{NotifierCall, RecordingNotifier};
use autoupdate_test_utils::fake_upload::{FakeUploadBackend, FakeUploadMode};

type TestResult = Result<(), Box<dyn Error>>;

struct Harness {
    runtime: Runtime<RecordingNotifier, FakeUploadBackend>,
    tx: mpsc::Sender<AutoUpdateEvent>,
    notifier: RecordingNotifier,
    started: Arc<Mutex<Vec<autoupdate::upload::UploadTask>>>,
    updates: broadcast::Receiver<FileUpdated>,
}

fn harness(builder: CoreBuilder, mode: FakeUploadMode) -> Harness {
    let (core, _fs, _repos) = builder.build();
    let (tx, rx) = mpsc::channel::<AutoUpdateEvent>(16);
    let (updates_tx, updates) = broadcast::channel(16);
    let notifier = RecordingNotifier::new();
    let started = Arc::new(Mutex::new(Vec::new()));
    let uploads = FakeUploadBackend::new(tx.clone(), started.clone(), mode);

    Harness {
        runtime: Runtime::new(core, rx, notifier.clone(), uploads, updates_tx),
        tx,
        notifier,
        started,
        updates,
    }
}

#[tokio::test]
async fn change_uploads_and_rearms_on_success() -> TestResult {
    init_tracing();
    let alice = account("alice");
    let accounts = AccountRegistry::new();
    accounts.add(alice.clone());
    let store = MemoryCacheStore::with_entries(vec![cache_entry(&alice, "R1", "/docs/x.txt")]);
    let path = local_path("R1", "/docs/x.txt");

    let mut h = harness(
        CoreBuilder::new().with_file("R1", "/docs/x.txt"),
        FakeUploadMode::Succeed,
    );

    let report = h.runtime.start(&store, &accounts).await?;
    assert_eq!(report.watched, 1);
    assert!(h.notifier.is_registered(&path));

    h.tx.send(AutoUpdateEvent::FileChanged { path: path.clone() }).await?;

    let runtime = h.runtime;
    let run = tokio::spawn(async move { runtime.run().await });

    let update = with_timeout(h.updates.recv()).await?;
    assert_eq!(
        update,
        FileUpdated {
            repo_id: "R1".to_string(),
            path_in_repo: "/docs/x.txt".to_string(),
        }
    );

    h.tx.send(AutoUpdateEvent::ShutdownRequested).await?;
    let runtime = with_timeout(run).await??;

    assert_eq!(h.started.lock().unwrap().len(), 1);
    assert_eq!(
        h.notifier.calls(),
        vec![
            NotifierCall::Watch(path.clone()),
            NotifierCall::Unwatch(path.clone()),
            NotifierCall::Watch(path.clone()),
        ]
    );
    assert!(h.notifier.is_registered(&path));
    assert!(!runtime.core().info(&path).unwrap().uploading);

    Ok(())
}

#[tokio::test]
async fn failed_upload_drops_the_watch() -> TestResult {
    init_tracing();
    let path = local_path("R1", "/a.txt");
    let h = harness(CoreBuilder::new().with_file("R1", "/a.txt"), FakeUploadMode::Fail);

    h.tx.send(AutoUpdateEvent::FileCached {
        account: account("alice"),
        repo_id: "R1".to_string(),
        path_in_repo: "/a.txt".to_string(),
    })
    .await?;
    h.tx.send(AutoUpdateEvent::FileChanged { path: path.clone() }).await?;

    let runtime = h.runtime;
    let run = tokio::spawn(async move { runtime.run().await });

    // The fake queues the failure as soon as it records the task, so the
    // shutdown below lands behind it.
    with_timeout(async {
        while h.started.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
    })
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    h.tx.send(AutoUpdateEvent::ShutdownRequested).await?;
    let runtime = with_timeout(run).await??;

    assert!(runtime.core().watch_set().is_empty());
    assert!(!h.notifier.is_registered(&path));

    Ok(())
}

#[tokio::test]
async fn refused_upload_is_treated_as_failure() -> TestResult {
    init_tracing();
    let path = local_path("R1", "/a.txt");
    let h = harness(CoreBuilder::new().with_file("R1", "/a.txt"), FakeUploadMode::Refuse);

    h.tx.send(AutoUpdateEvent::FileCached {
        account: account("alice"),
        repo_id: "R1".to_string(),
        path_in_repo: "/a.txt".to_string(),
    })
    .await?;
    h.tx.send(AutoUpdateEvent::FileChanged { path: path.clone() }).await?;
    h.tx.send(AutoUpdateEvent::ShutdownRequested).await?;

    let runtime = with_timeout(h.runtime.run()).await?;

    assert!(h.started.lock().unwrap().is_empty());
    assert!(runtime.core().watch_set().is_empty());

    Ok(())
}

#[tokio::test]
async fn fully_local_repo_leaves_path_unregistered() -> TestResult {
    init_tracing();
    let path = local_path("R1", "/docs/x.txt");
    let builder = CoreBuilder::new().with_file("R1", "/docs/x.txt");
    builder.repos.mark_local("R1");
    let h = harness(builder, FakeUploadMode::Succeed);

    h.tx.send(AutoUpdateEvent::FileCached {
        account: account("alice"),
        repo_id: "R1".to_string(),
        path_in_repo: "/docs/x.txt".to_string(),
    })
    .await?;
    h.tx.send(AutoUpdateEvent::FileChanged { path: path.clone() }).await?;
    h.tx.send(AutoUpdateEvent::ShutdownRequested).await?;

    let runtime = with_timeout(h.runtime.run()).await?;

    assert!(h.started.lock().unwrap().is_empty());
    assert!(runtime.core().watch_set().contains(&path));
    assert!(!h.notifier.is_registered(&path));

    Ok(())
}

#[tokio::test]
async fn refused_registration_drops_the_entry() -> TestResult {
    init_tracing();
    let path = local_path("R1", "/a.txt");
    let h = harness(CoreBuilder::new().with_file("R1", "/a.txt"), FakeUploadMode::Succeed);
    h.notifier.refuse(path.clone());

    h.tx.send(AutoUpdateEvent::FileCached {
        account: account("alice"),
        repo_id: "R1".to_string(),
        path_in_repo: "/a.txt".to_string(),
    })
    .await?;
    h.tx.send(AutoUpdateEvent::ShutdownRequested).await?;

    let runtime = with_timeout(h.runtime.run()).await?;

    assert!(runtime.core().watch_set().is_empty());
    assert_eq!(h.notifier.watch_count(&path), 1);

    Ok(())
}
