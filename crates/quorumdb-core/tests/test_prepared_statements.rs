//! Prepared statement lifecycle: handles, cross-session sharing, keyspace
//! capture at prepare time and invalidation on schema change.

mod common;

use common::{
    bootstrap_keyspace, executor, executor_with_parts, executor_with_storage, run, CountingStorage,
};
use quorumdb_commons::{
    ConsistencyLevel, CqlType, CqlValue, KeyspaceName, PreparedId, QualifiedTable, QueryError,
    TableName,
};
use quorumdb_core::{ExecutorConfig, SchemaRegistry};
use quorumdb_session::Session;
use std::sync::Arc;

#[tokio::test]
async fn test_prepared_insert_and_select_per_keyspace() {
    let executor = executor();

    let session1 = Session::default();
    bootstrap_keyspace(&executor, &session1, "keyspace1").await;
    let session2 = Session::default();
    bootstrap_keyspace(&executor, &session2, "keyspace2").await;

    let insert1 = executor
        .prepare_query(&session1, "INSERT INTO test (id, num) VALUES (?, ?)")
        .unwrap();
    let insert2 = executor
        .prepare_query(&session2, "INSERT INTO test (id, num) VALUES (?, ?)")
        .unwrap();
    assert_eq!(insert1.bind_types, vec![CqlType::Text, CqlType::Int]);

    executor
        .execute_prepared(
            &session1,
            insert1.id,
            &[b"k1".to_vec(), 1i32.to_be_bytes().to_vec()],
            ConsistencyLevel::Quorum,
        )
        .await
        .unwrap();
    for (key, num) in [("k1", 1i32), ("k2", 2i32)] {
        executor
            .execute_prepared(
                &session2,
                insert2.id,
                &[key.as_bytes().to_vec(), num.to_be_bytes().to_vec()],
                ConsistencyLevel::Quorum,
            )
            .await
            .unwrap();
    }

    let select1 = executor.prepare_query(&session1, "SELECT * FROM test").unwrap();
    let select2 = executor.prepare_query(&session2, "SELECT * FROM test").unwrap();
    assert_eq!(select1.result_metadata.len(), 2);

    let r1 = executor
        .execute_prepared(&session1, select1.id, &[], ConsistencyLevel::One)
        .await
        .unwrap();
    let r2 = executor
        .execute_prepared(&session2, select2.id, &[], ConsistencyLevel::One)
        .await
        .unwrap();
    assert_eq!(r1.rows().len(), 1);
    assert_eq!(r2.rows().len(), 2);
}

#[tokio::test]
async fn test_prepare_gzip_payload() {
    let executor = executor();
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let packed =
        quorumdb_core::compression::compress(b"SELECT * FROM test WHERE id = ?").unwrap();
    let prepared = executor.prepare_payload(&session, &packed).unwrap();
    assert_eq!(prepared.bind_types, vec![CqlType::Text]);

    let result = executor
        .execute_prepared(
            &session,
            prepared.id,
            &[b"missing".to_vec()],
            ConsistencyLevel::One,
        )
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_unknown_handle_is_not_prepared() {
    let executor = executor();
    let session = Session::default();

    let bogus = PreparedId::new(424_242);
    let err = executor
        .execute_prepared(&session, bogus, &[], ConsistencyLevel::One)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::NotPrepared(bogus));
}

#[tokio::test]
async fn test_arity_mismatch_never_reaches_storage() {
    let storage = Arc::new(CountingStorage::new());
    let executor = executor_with_storage(storage.clone(), ExecutorConfig::default());
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let prepared = executor
        .prepare_query(&session, "INSERT INTO test (id, num) VALUES (?, ?)")
        .unwrap();

    let err = executor
        .execute_prepared(
            &session,
            prepared.id,
            &[b"only-one".to_vec()],
            ConsistencyLevel::One,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidRequest(_)));
    assert_eq!(storage.operations(), 0);
}

#[tokio::test]
async fn test_prepared_keeps_keyspace_captured_at_prepare_time() {
    let executor = executor();
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let insert = executor
        .prepare_query(&session, "INSERT INTO test (id) VALUES (?)")
        .unwrap();

    // Rebinding the session does not retarget the handle.
    bootstrap_keyspace(&executor, &session, "keyspace2").await;
    executor
        .execute_prepared(
            &session,
            insert.id,
            &[b"captured".to_vec()],
            ConsistencyLevel::One,
        )
        .await
        .unwrap();

    let r1 = run(&executor, &session, "SELECT * FROM keyspace1.test").await;
    let r2 = run(&executor, &session, "SELECT * FROM keyspace2.test").await;
    assert_eq!(r1.rows().len(), 1);
    assert!(r2.is_empty());
}

#[tokio::test]
async fn test_prepared_handle_shared_across_sessions() {
    let executor = executor();
    let preparer = Session::default();
    bootstrap_keyspace(&executor, &preparer, "keyspace1").await;

    let insert = executor
        .prepare_query(&preparer, "INSERT INTO test (id, num) VALUES (?, ?)")
        .unwrap();

    // Another session with no keyspace bound can execute the handle; the
    // statement resolved at prepare time.
    let other = Session::default();
    executor
        .execute_prepared(
            &other,
            insert.id,
            &[b"k".to_vec(), 5i32.to_be_bytes().to_vec()],
            ConsistencyLevel::One,
        )
        .await
        .unwrap();

    let result = run(&executor, &preparer, "SELECT * FROM test").await;
    assert_eq!(result.rows().len(), 1);
    assert_eq!(result.value(0, "num"), Some(&CqlValue::Int(5)));
}

#[tokio::test]
async fn test_drop_table_invalidates_prepared() {
    let executor = executor();
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let select = executor.prepare_query(&session, "SELECT * FROM test").unwrap();
    run(&executor, &session, "DROP TABLE test").await;

    let err = executor
        .execute_prepared(&session, select.id, &[], ConsistencyLevel::One)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::NotPrepared(select.id));

    // Recreating the table does not resurrect the stale handle.
    run(
        &executor,
        &session,
        "CREATE TABLE test (id text PRIMARY KEY, num int)",
    )
    .await;
    let err = executor
        .execute_prepared(&session, select.id, &[], ConsistencyLevel::One)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::NotPrepared(select.id));
}

#[tokio::test]
async fn test_live_handle_with_vanished_table_is_invalid_request() {
    let storage = Arc::new(CountingStorage::new());
    let (executor, registry) = executor_with_parts(storage.clone(), ExecutorConfig::default());
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let select = executor.prepare_query(&session, "SELECT * FROM test").unwrap();

    // Remove the table from the registry directly; the cache entry stays
    // live, so this is not the invalidation path.
    let table = QualifiedTable::new(KeyspaceName::new("keyspace1"), TableName::new("test"));
    registry.drop_table(&table).unwrap();

    let err = executor
        .execute_prepared(&session, select.id, &[], ConsistencyLevel::One)
        .await
        .unwrap_err();
    assert!(
        matches!(err, QueryError::InvalidRequest(ref msg) if msg.contains("unknown table")),
        "expected InvalidRequest, got {:?}",
        err
    );
    assert_eq!(storage.operations(), 0);
}

#[tokio::test]
async fn test_drop_keyspace_invalidates_prepared() {
    let executor = executor();
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;
    let other = Session::default();
    bootstrap_keyspace(&executor, &other, "keyspace2").await;

    let doomed = executor.prepare_query(&session, "SELECT * FROM test").unwrap();
    let survivor = executor.prepare_query(&other, "SELECT * FROM test").unwrap();

    run(&executor, &session, "DROP KEYSPACE keyspace1").await;

    let err = executor
        .execute_prepared(&session, doomed.id, &[], ConsistencyLevel::One)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::NotPrepared(doomed.id));
    assert!(executor
        .execute_prepared(&other, survivor.id, &[], ConsistencyLevel::One)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_undecodable_bind_value() {
    let executor = executor();
    let session = Session::default();
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let insert = executor
        .prepare_query(&session, "INSERT INTO test (id, num) VALUES (?, ?)")
        .unwrap();

    // num is an int; 3 bytes cannot decode.
    let err = executor
        .execute_prepared(
            &session,
            insert.id,
            &[b"k".to_vec(), vec![1, 2, 3]],
            ConsistencyLevel::One,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidRequest(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_prepares_get_unique_handles() {
    let executor = executor();
    let session = Arc::new(Session::default());
    bootstrap_keyspace(&executor, &session, "keyspace1").await;

    let mut handles = Vec::new();
    for _ in 0..32 {
        let executor = Arc::clone(&executor);
        let session = Arc::clone(&session);
        handles.push(tokio::spawn(async move {
            executor
                .prepare_query(&session, "SELECT * FROM test WHERE id = ?")
                .unwrap()
                .id
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 32);
}
