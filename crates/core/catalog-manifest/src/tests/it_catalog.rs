//! Integration tests for manifest resolution against a real Postgres catalog
//!
//! Append-optimized tables are emulated: the segment and visimap relations are ordinary tables
//! linked to their base table through the `pg_appendonly` stand-in installed by
//! [`TempCatalogDb`].

use crate::{
    AuxiliaryKind, Connection, Error, KEEP_TEMP_DIRS, Manifest, Oid, TableName, TempCatalogDb,
    manifest, resolve_manifest,
};

async fn temp_catalog_db() -> TempCatalogDb {
    TempCatalogDb::new(*KEEP_TEMP_DIRS)
        .await
        .expect("Failed to start temp catalog db")
}

async fn exec(conn: &mut Connection, sql: &str) {
    sqlx::raw_sql(sql)
        .execute(&mut **conn)
        .await
        .expect("Failed to run fixture SQL");
}

/// Creates `name` with a segment table, a visimap table and a visimap index, all linked in
/// `pg_appendonly`.
async fn create_ao_table(conn: &mut Connection, name: &str) {
    let sql = format!(
        "CREATE TABLE {name} (id int);
         CREATE TABLE pg_aoseg_{name} (segno int, eof bigint);
         CREATE TABLE pg_aovisimap_{name} (segno int, first_row_no bigint);
         CREATE INDEX pg_aovisimap_{name}_index ON pg_aovisimap_{name} (segno, first_row_no);
         INSERT INTO pg_appendonly (relid, segrelid, visimaprelid)
         VALUES ('{name}'::regclass, 'pg_aoseg_{name}'::regclass, 'pg_aovisimap_{name}'::regclass);"
    );
    exec(conn, &sql).await;
}

async fn relation_oid(conn: &mut Connection, name: &str) -> Oid {
    sqlx::query_scalar("SELECT oid FROM pg_class WHERE relname = $1")
        .bind(name)
        .fetch_one(&mut **conn)
        .await
        .expect("Failed to look up relation oid")
}

fn names(names: &[&str]) -> Vec<TableName> {
    names
        .iter()
        .map(|name| TableName::new(*name).expect("valid table name"))
        .collect()
}

fn relnames(manifest: &Manifest) -> Vec<&str> {
    manifest
        .tables
        .iter()
        .map(|entry| entry.name.as_str())
        .collect()
}

#[tokio::test]
async fn heap_table_reports_rewritten_relfilenode() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    exec(&mut conn, "CREATE TABLE heap_t (id int); TRUNCATE heap_t;").await;
    let oid = relation_oid(&mut conn, "heap_t").await;

    //* When
    let manifest = db
        .manifest(&names(&["heap_t"]))
        .await
        .expect("Failed to resolve manifest");

    //* Then
    assert_eq!(relnames(&manifest), ["heap_t"]);
    assert_eq!(manifest.tables[0].oid, oid);
    assert_ne!(
        manifest.tables[0].relfilenode, oid,
        "TRUNCATE should have assigned a new relfilenode"
    );
}

#[tokio::test]
async fn ao_table_lists_auxiliary_relations_in_order() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    create_ao_table(&mut conn, "ao_t").await;

    //* When
    let manifest = db
        .manifest(&names(&["ao_t"]))
        .await
        .expect("Failed to resolve manifest");

    //* Then
    assert_eq!(
        relnames(&manifest),
        [
            "ao_t",
            "pg_aoseg_ao_t",
            "pg_aovisimap_ao_t",
            "pg_aovisimap_ao_t_index"
        ]
    );
}

#[tokio::test]
async fn two_ao_tables_follow_call_order() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    create_ao_table(&mut conn, "ao_a").await;
    create_ao_table(&mut conn, "ao_b").await;

    //* When
    let manifest = db
        .manifest(&names(&["ao_b", "ao_a"]))
        .await
        .expect("Failed to resolve manifest");

    //* Then
    assert_eq!(manifest.tables.len(), 8);
    assert_eq!(manifest.tables[0].name, "ao_b");
    assert_eq!(manifest.tables[4].name, "ao_a");
    assert_eq!(manifest.tables[7].name, "pg_aovisimap_ao_a_index");
}

#[tokio::test]
async fn unknown_table_yields_current_database_and_no_tables() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    let (current, db_oid): (String, Oid) = sqlx::query_as(
        "SELECT datname, oid FROM pg_database WHERE datname = current_database()",
    )
    .fetch_one(&mut *conn)
    .await
    .expect("Failed to query current database");

    //* When
    let json = db
        .manifest(&names(&["no_such_table"]))
        .await
        .expect("Failed to resolve manifest")
        .to_json()
        .expect("Failed to serialize manifest");

    //* Then
    let parsed = manifest::from_json(&json).expect("Failed to parse manifest");
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].database.name, current);
    assert_eq!(parsed[0].database.oid, db_oid);
    assert!(parsed[0].tables.is_empty());
}

#[tokio::test]
async fn only_user_ordinary_and_partitioned_tables_are_base_tables() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    exec(
        &mut conn,
        "CREATE TABLE parted_t (id int) PARTITION BY RANGE (id);
         CREATE TABLE heap_t (id int);
         CREATE INDEX heap_t_idx ON heap_t (id);
         CREATE VIEW view_t AS SELECT id FROM heap_t;
         CREATE SEQUENCE seq_t;",
    )
    .await;
    let parted_oid = relation_oid(&mut conn, "parted_t").await;

    //* When
    let manifest = db
        .manifest(&names(&["pg_class", "view_t", "heap_t_idx", "seq_t", "parted_t"]))
        .await
        .expect("Failed to resolve manifest");

    //* Then
    assert_eq!(relnames(&manifest), ["parted_t"]);
    assert_eq!(manifest.tables[0].oid, parted_oid);
    assert_eq!(manifest.tables[0].relfilenode, Oid::INVALID);
}

#[tokio::test]
async fn table_with_two_parents_is_listed_once_per_parent() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    exec(
        &mut conn,
        "CREATE TABLE parent_a (id int);
         CREATE TABLE parent_b (id int);
         CREATE TABLE child_t () INHERITS (parent_a, parent_b);",
    )
    .await;

    //* When
    let manifest = db
        .manifest(&names(&["child_t", "parent_a"]))
        .await
        .expect("Failed to resolve manifest");

    //* Then
    assert_eq!(relnames(&manifest), ["child_t", "child_t", "parent_a"]);
}

#[tokio::test]
async fn resolve_within_caller_snapshot() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    create_ao_table(&mut conn, "ao_t").await;
    let mut tx = db
        .begin_snapshot()
        .await
        .expect("Failed to begin snapshot");

    //* When
    let first = resolve_manifest(&mut tx, &names(&["ao_t"]))
        .await
        .expect("Failed to resolve manifest");
    exec(&mut conn, "TRUNCATE ao_t;").await;
    let second = resolve_manifest(&mut tx, &names(&["ao_t"]))
        .await
        .expect("Failed to resolve manifest");
    tx.rollback().await.expect("Failed to roll back snapshot");

    //* Then
    assert_eq!(first.tables.len(), 4);
    assert_eq!(first, second, "a snapshot must not observe concurrent rewrites");
}

#[tokio::test]
async fn table_names_are_bound_not_interpolated() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    exec(&mut conn, "CREATE TABLE heap_t (id int);").await;

    //* When
    let manifest = db
        .manifest(&names(&["x') OR ('1' = '1", "heap_t"]))
        .await
        .expect("Failed to resolve manifest");

    //* Then
    assert_eq!(relnames(&manifest), ["heap_t"]);
}

#[tokio::test]
async fn visimap_without_index_is_reported() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    create_ao_table(&mut conn, "ao_t").await;
    exec(&mut conn, "DROP INDEX pg_aovisimap_ao_t_index;").await;

    //* When
    let result = db.manifest(&names(&["ao_t"])).await;

    //* Then
    assert!(matches!(result, Err(Error::VisimapIndexNotFound { .. })));
}

#[tokio::test]
async fn dropped_segment_table_is_reported() {
    //* Given
    let db = temp_catalog_db().await;
    let mut conn = db.connect().await.expect("Failed to connect");
    create_ao_table(&mut conn, "ao_t").await;
    exec(&mut conn, "DROP TABLE pg_aoseg_ao_t;").await;

    //* When
    let result = db.manifest(&names(&["ao_t"])).await;

    //* Then
    assert!(matches!(
        result,
        Err(Error::AuxiliaryRelationNotFound {
            kind: AuxiliaryKind::Segment,
            ..
        })
    ));
}

#[tokio::test]
async fn snapshot_transaction_is_read_only() {
    //* Given
    let db = temp_catalog_db().await;
    let mut tx = db
        .begin_snapshot()
        .await
        .expect("Failed to begin snapshot");

    //* When
    let result = sqlx::query("CREATE TABLE should_fail (id int)")
        .execute(&mut tx)
        .await;

    //* Then
    match result {
        Err(sqlx::Error::Database(err)) => {
            assert_eq!(err.code().as_deref(), Some("25006"));
        }
        other => panic!("expected read-only violation, got {other:?}"),
    }
}
