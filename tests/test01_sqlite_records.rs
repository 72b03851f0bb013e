#![cfg(feature = "sqlite")]

use record_store::prelude::*;
use tempfile::tempdir;

async fn people_db() -> Result<Database, DataAccessError> {
    let db = Database::sqlite_builder(":memory:").build().await?;
    db.execute_non_query("CREATE TABLE people (id INTEGER, Name TEXT, Age INTEGER)")
        .await?;
    Ok(db)
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}

#[tokio::test]
async fn inserted_record_reads_back() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    let person = record(&[("id", "1"), ("Name", "Alice"), ("_Age", "integer"), ("Age", "30")]);

    db.insert_record("people", &person).await.into_result()?;

    let rs = db.execute("SELECT id, Name, Age FROM people").await?;
    assert_eq!(rs.len(), 1);
    let row = &rs.results[0];
    assert_eq!(row.get("Age"), Some(&RowValues::Int(30)));
    let back = row.to_record();
    for entry in person.entries() {
        if let RecordEntry::Column { key, value } = entry {
            assert_eq!(back.get(key).as_deref(), Some(value.as_str()), "column {key}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn update_binds_raw_where_parameter() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    db.insert_record("people", &record(&[("id", "7"), ("Name", "Alice")]))
        .await
        .into_result()?;
    db.insert_record("people", &record(&[("id", "8"), ("Name", "Carol")]))
        .await
        .into_result()?;

    let outcome = db
        .update_record("people", &record(&[("*id", "7"), ("Name", "Bob")]), "id=@id")
        .await;
    assert!(outcome.is_success(), "{outcome:?}");

    let rs = db.execute("SELECT Name FROM people ORDER BY id").await?;
    let names: Vec<_> = rs
        .results
        .iter()
        .map(|row| row.get("Name").and_then(RowValues::as_text).map(str::to_owned))
        .collect();
    assert_eq!(names, vec![Some("Bob".to_string()), Some("Carol".to_string())]);
    Ok(())
}

#[tokio::test]
async fn update_without_columns_fails() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    let outcome = db
        .update_record("people", &record(&[("*id", "7")]), "id=@id")
        .await;
    assert!(matches!(
        outcome.error(),
        Some(DataAccessError::ExecutionError(msg)) if msg.contains("no columns")
    ));
    Ok(())
}

#[tokio::test]
async fn column_key_with_closing_bracket_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    let outcome = db
        .insert_record("people", &record(&[("Name", "a"), ("odd]name", "b")]))
        .await;
    assert!(matches!(
        outcome.error(),
        Some(DataAccessError::ParameterError(msg)) if msg.contains("odd]name")
    ));

    let outcome = db
        .update_record("people", &record(&[("odd]name", "b")]), "")
        .await;
    assert!(matches!(outcome.error(), Some(DataAccessError::ParameterError(_))));
    assert_eq!(
        db.execute_scalar("SELECT COUNT(*) FROM people").await?,
        Some(RowValues::Int(0))
    );
    Ok(())
}

#[tokio::test]
async fn raw_parameter_does_not_shadow_generated_placeholder()
-> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    db.insert_record("people", &record(&[("Name", "Alice"), ("*value0", "raw")]))
        .await
        .into_result()?;
    assert_eq!(
        db.execute_scalar("SELECT Name FROM people").await?,
        Some(RowValues::Text("Alice".into()))
    );
    Ok(())
}

#[tokio::test]
async fn delete_with_empty_clause_removes_everything() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    for (id, name) in [("1", "a"), ("2", "b"), ("3", "c")] {
        db.insert_record("people", &record(&[("id", id), ("Name", name)]))
            .await
            .into_result()?;
    }

    assert!(
        db.delete_record("people", &record(&[("*id", "2")]), "id = @id")
            .await
            .is_success()
    );
    assert_eq!(
        db.execute_scalar("SELECT COUNT(*) FROM people").await?,
        Some(RowValues::Int(2))
    );

    assert!(db.delete_record("people", &Record::new(), "").await.is_success());
    assert_eq!(
        db.execute_scalar("SELECT COUNT(*) FROM people").await?,
        Some(RowValues::Int(0))
    );
    Ok(())
}

#[tokio::test]
async fn clear_table_and_missing_table() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    db.insert_record("people", &record(&[("Name", "a")]))
        .await
        .into_result()?;
    assert!(db.clear_table("people").await.is_success());
    assert!(db.execute("SELECT * FROM people").await?.is_empty());

    let outcome = db.clear_table("ghosts").await;
    assert!(!outcome.is_success());
    assert!(outcome.error().is_some_and(|e| e.to_string().contains("ghosts")));
    Ok(())
}

#[tokio::test]
async fn read_paths_surface_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    let err = db.execute("SELECT * FROM ghosts").await.unwrap_err();
    assert!(err.to_string().contains("ghosts"));

    let err = db
        .execute_dynamic("SELECT * FROM people WHERE id = @id", &Record::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DataAccessError::ParameterError(_)));
    Ok(())
}

#[tokio::test]
async fn scalar_with_record_and_dynamic_query() -> Result<(), Box<dyn std::error::Error>> {
    let db = people_db().await?;
    db.insert_record("people", &record(&[("id", "1"), ("Name", "Alice")]))
        .await
        .into_result()?;

    let count = db
        .execute_scalar_with_record(
            "SELECT COUNT(*) FROM people WHERE Name = @Name",
            &record(&[("Name", "Alice")]),
        )
        .await?;
    assert_eq!(count, Some(RowValues::Int(1)));

    let none = db
        .execute_scalar_with_record(
            "SELECT Name FROM people WHERE Name = :who",
            &record(&[("*who", "nobody")]),
        )
        .await?;
    assert_eq!(none, None);

    let rs = db
        .execute_dynamic(
            "SELECT Name FROM people WHERE id = $id",
            &record(&[("*id", "1"), ("*unused", "x")]),
        )
        .await?;
    assert_eq!(rs.scalar(), Some(&RowValues::Text("Alice".into())));
    Ok(())
}

#[tokio::test]
async fn blob_is_bound_after_record_values() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::sqlite_builder(":memory:").build().await?;
    db.execute_non_query("CREATE TABLE files (name TEXT, data BLOB)")
        .await?;
    let payload = vec![0u8, 159, 146, 150, 255];

    db.execute_dynamic_with_blob(
        "INSERT INTO files (name, data) VALUES (@name, @data)",
        &record(&[("name", "a.bin")]),
        "data",
        payload.clone(),
    )
    .await?;

    let rs = db
        .execute_dynamic(
            "SELECT data FROM files WHERE name = @name",
            &record(&[("name", "a.bin")]),
        )
        .await?;
    assert_eq!(rs.scalar().and_then(RowValues::as_blob), Some(payload.as_slice()));
    Ok(())
}

#[tokio::test]
async fn insert_document_types_integers() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::sqlite_builder(":memory:").build().await?;
    db.execute_non_query(
        "CREATE TABLE documents (Received, Label TEXT, Category TEXT, Metadata TEXT, ID, Document TEXT)",
    )
    .await?;
    let row = DocumentRow {
        received: 1_700_000_000,
        label: "inbox".into(),
        category: "mail".into(),
        metadata: "{\"from\":\"a\"}".into(),
        id: 42,
        document: "hello".into(),
    };

    assert!(db.insert_document(&row).await.is_success());

    let rs = db
        .execute("SELECT typeof(Received), typeof(ID), Label FROM documents")
        .await?;
    let row = &rs.results[0];
    assert_eq!(row.get_by_index(0), Some(&RowValues::Text("integer".into())));
    assert_eq!(row.get_by_index(1), Some(&RowValues::Text("integer".into())));
    assert_eq!(row.get("Label"), Some(&RowValues::Text("inbox".into())));
    Ok(())
}

#[test]
fn file_database_reports_its_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("store.db");
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let db = Database::sqlite_builder(path.to_string_lossy()).build().await?;
        assert_eq!(db.database_type(), DatabaseType::Sqlite);
        assert_eq!(db.database_directory(), Some(dir.path().to_path_buf()));

        assert!(db.create_database("anything").await.is_noop());
        assert!(db.drop_database("anything").await.is_noop());
        assert!(db.check_database_exists("anything").await?);

        db.execute_non_query("CREATE TABLE t (v TEXT)").await?;
        db.insert_record("t", &record(&[("v", "kept")]))
            .await
            .into_result()?;
        db.close().await.into_result()?;

        let reopened = Database::sqlite_builder(path.to_string_lossy()).build().await?;
        assert_eq!(
            reopened.execute_scalar("SELECT v FROM t").await?,
            Some(RowValues::Text("kept".into()))
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn close_is_final() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let db = people_db().await?;
        assert!(matches!(db.close().await, Outcome::Succeeded));
        assert!(db.close().await.is_noop());

        let err = db.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, DataAccessError::ConnectionError(msg) if msg == "connection is closed"));
        assert!(!db.begin_transaction().await.is_success());
        assert!(!db.transaction_lock_status());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn connect_from_json_config() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let config = DatabaseConfig::from_json(
            r#"{ "engine": "sqlite", "revision": 4, "sqlite": { "db_path": ":memory:" } }"#,
        )?;
        let db = Database::connect(config).await?;
        assert_eq!(db.revision(), 4);
        assert_eq!(db.database_directory(), None);
        assert_eq!(db.execute_scalar("SELECT 1").await?, Some(RowValues::Int(1)));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
