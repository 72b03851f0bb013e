use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use record_store::prelude::*;
use tokio::time::timeout;

/// Backend that records calls and fails on demand.
#[derive(Default)]
struct ScriptedBackend {
    fail_begin: AtomicBool,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
    begin_delay_ms: AtomicU64,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn fail(&self, flag: &AtomicBool, what: &str) -> Result<(), DataAccessError> {
        if flag.load(Ordering::SeqCst) {
            Err(DataAccessError::ExecutionError(format!("scripted {what} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    async fn query(&self, sql: &str, _params: &BoundParams) -> Result<ResultSet, DataAccessError> {
        self.log(format!("query {sql}"));
        Ok(ResultSet::default())
    }

    async fn execute(&self, sql: &str, params: &BoundParams) -> Result<usize, DataAccessError> {
        self.log(format!("execute {sql} [{}]", params.len()));
        Ok(1)
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), DataAccessError> {
        self.log(format!("batch {sql}"));
        Ok(())
    }

    async fn begin(&self) -> Result<(), DataAccessError> {
        self.log("begin");
        let delay = self.begin_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.fail(&self.fail_begin, "begin")
    }

    async fn commit(&self) -> Result<(), DataAccessError> {
        self.log("commit");
        self.fail(&self.fail_commit, "commit")
    }

    async fn rollback(&self) -> Result<(), DataAccessError> {
        self.log("rollback");
        self.fail(&self.fail_rollback, "rollback")
    }

    async fn create_database(&self, name: &str) -> Result<bool, DataAccessError> {
        self.log(format!("create {name}"));
        Ok(true)
    }

    async fn drop_database(&self, name: &str) -> Result<bool, DataAccessError> {
        self.log(format!("drop {name}"));
        Ok(true)
    }

    async fn database_exists(&self, name: &str) -> Result<bool, DataAccessError> {
        Ok(name == "present")
    }

    async fn close(&self) -> Result<bool, DataAccessError> {
        self.log("close");
        Ok(true)
    }
}

fn scripted() -> (Arc<ScriptedBackend>, Database) {
    let backend = Arc::new(ScriptedBackend::default());
    let db = Database::with_backend(Arc::clone(&backend) as Arc<dyn Backend>);
    (backend, db)
}

#[test]
fn failed_begin_releases_the_lock() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (backend, db) = scripted();
        backend.fail_begin.store(true, Ordering::SeqCst);

        let outcome = db.begin_transaction().await;
        assert!(matches!(
            outcome.error(),
            Some(DataAccessError::ExecutionError(msg)) if msg.contains("begin")
        ));
        assert!(!db.transaction_lock_status());
        assert!(db.commit().await.is_noop());

        backend.fail_begin.store(false, Ordering::SeqCst);
        timeout(Duration::from_secs(1), db.begin_transaction())
            .await?
            .into_result()?;
        db.commit().await.into_result()?;
        assert_eq!(backend.calls(), vec!["begin", "begin", "commit"]);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn failed_commit_rolls_back_and_unlocks() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (backend, db) = scripted();
        backend.fail_commit.store(true, Ordering::SeqCst);

        db.begin_transaction().await.into_result()?;
        let outcome = db.commit().await;
        assert!(!outcome.is_success());
        assert!(!db.transaction_lock_status());
        assert_eq!(backend.calls(), vec!["begin", "commit", "rollback"]);

        timeout(Duration::from_secs(1), db.begin_transaction())
            .await?
            .into_result()?;
        assert!(db.transaction_lock_status());
        db.rollback().await.into_result()?;
        assert!(!db.transaction_lock_status());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[tokio::test]
async fn second_begin_waits_for_the_first() -> Result<(), Box<dyn std::error::Error>> {
    let (_backend, db) = scripted();
    db.begin_transaction().await.into_result()?;

    let blocked = timeout(Duration::from_millis(50), db.begin_transaction()).await;
    assert!(blocked.is_err(), "nested begin must wait");
    assert!(db.transaction_lock_status());

    db.commit().await.into_result()?;
    timeout(Duration::from_secs(1), db.begin_transaction())
        .await?
        .into_result()?;
    db.commit().await.into_result()?;
    Ok(())
}

#[tokio::test]
async fn server_ddl_goes_to_the_backend() -> Result<(), Box<dyn std::error::Error>> {
    let (backend, db) = scripted();
    assert!(matches!(db.create_database("sales").await, Outcome::Succeeded));
    assert!(matches!(db.drop_database("sales").await, Outcome::Succeeded));
    assert!(db.check_database_exists("present").await?);
    assert!(!db.check_database_exists("absent").await?);
    assert_eq!(db.database_directory(), None);
    assert_eq!(backend.calls(), vec!["create sales", "drop sales"]);
    Ok(())
}

#[tokio::test]
async fn builders_feed_the_backend() -> Result<(), Box<dyn std::error::Error>> {
    let (backend, db) = scripted();
    let mut person = Record::new();
    person.insert("Name", "Alice").insert("_Age", "integer").insert("Age", "30");

    db.insert_record("people", &person).await.into_result()?;
    db.clear_table("people").await.into_result()?;

    assert_eq!(
        backend.calls(),
        vec![
            "execute INSERT INTO people([Name],[Age]) VALUES(@value0, CAST(@value1 AS INTEGER)); [2]",
            "execute DELETE FROM people; [0]",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn close_rolls_back_then_closes_once() -> Result<(), Box<dyn std::error::Error>> {
    let (backend, db) = scripted();
    db.begin_transaction().await.into_result()?;
    assert!(matches!(db.close().await, Outcome::Succeeded));
    assert!(db.close().await.is_noop());
    assert!(!db.transaction_lock_status());
    assert_eq!(backend.calls(), vec!["begin", "rollback", "close"]);

    let err = db.execute_non_query("DELETE FROM t").await.unwrap_err();
    assert_eq!(err.to_string(), "Connection error: connection is closed");
    Ok(())
}

#[tokio::test]
async fn failed_rollback_still_unlocks() -> Result<(), Box<dyn std::error::Error>> {
    let (backend, db) = scripted();
    backend.fail_rollback.store(true, Ordering::SeqCst);

    db.begin_transaction().await.into_result()?;
    let outcome = db.rollback().await;
    assert!(matches!(
        outcome,
        Outcome::Failed(DataAccessError::ExecutionError(ref msg)) if msg.contains("rollback")
    ));
    assert!(!db.transaction_lock_status());

    backend.fail_rollback.store(false, Ordering::SeqCst);
    timeout(Duration::from_secs(1), db.begin_transaction())
        .await?
        .into_result()?;
    db.commit().await.into_result()?;
    assert_eq!(backend.calls(), vec!["begin", "rollback", "begin", "commit"]);
    Ok(())
}

#[tokio::test]
async fn cancelled_begin_keeps_the_lock_until_finished() -> Result<(), Box<dyn std::error::Error>> {
    let (backend, db) = scripted();
    backend.begin_delay_ms.store(200, Ordering::SeqCst);

    let cancelled = timeout(Duration::from_millis(20), db.begin_transaction()).await;
    assert!(cancelled.is_err());
    assert!(db.transaction_lock_status());

    let blocked = timeout(Duration::from_millis(50), db.begin_transaction()).await;
    assert!(blocked.is_err(), "lock must stay held after a cancelled begin");

    db.rollback().await.into_result()?;
    assert!(!db.transaction_lock_status());

    backend.begin_delay_ms.store(0, Ordering::SeqCst);
    timeout(Duration::from_secs(1), db.begin_transaction())
        .await?
        .into_result()?;
    db.commit().await.into_result()?;
    assert_eq!(backend.calls(), vec!["begin", "rollback", "begin", "commit"]);
    Ok(())
}
