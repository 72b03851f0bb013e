use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::DataAccessError;

/// The one `rusqlite` connection behind a backend; `None` once closed.
pub(crate) type SharedSqliteConnection = Arc<Mutex<Option<rusqlite::Connection>>>;

/// Run blocking `SQLite` work on the blocking pool while holding the connection.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, DataAccessError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, DataAccessError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        let connection = guard.as_mut().ok_or_else(DataAccessError::closed)?;
        func(connection)
    })
    .await
    .map_err(|e| DataAccessError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}

/// Open the connection off the async runtime.
pub(crate) async fn open(db_path: String) -> Result<SharedSqliteConnection, DataAccessError> {
    let conn = tokio::task::spawn_blocking(move || rusqlite::Connection::open(db_path))
        .await
        .map_err(|e| {
            DataAccessError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
        })?
        .map_err(DataAccessError::SqliteError)?;
    Ok(Arc::new(Mutex::new(Some(conn))))
}

/// Close the connection. Returns `Ok(false)` if it was already closed.
///
/// When `SQLite` refuses to close, the connection is put back so the caller can retry.
pub(crate) async fn close(conn: SharedSqliteConnection) -> Result<bool, DataAccessError> {
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        let Some(connection) = guard.take() else {
            return Ok(false);
        };
        match connection.close() {
            Ok(()) => Ok(true),
            Err((connection, err)) => {
                *guard = Some(connection);
                Err(DataAccessError::SqliteError(err))
            }
        }
    })
    .await
    .map_err(|e| DataAccessError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
