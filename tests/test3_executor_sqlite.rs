#![cfg(feature = "sqlite")]

use sql_mapper::prelude::*;

fn setup() -> Result<(tempfile::TempDir, ExecutionContext), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("executor.db");
    let engine = Engine::new(SqliteFactory::new(path.to_string_lossy()));
    let mut ctx = ExecutionContext::new(engine);
    execute(
        &mut ctx,
        "create table event (id bigint not null, label text, weight real, primary key(id))",
        &[],
    )?;
    Ok((dir, ctx))
}

#[test]
fn select_one_on_no_match_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    let row = select_one(&mut ctx, "select * from event where id=?", &[RowValues::Int(1)])?;
    assert!(row.is_none());
    Ok(())
}

#[test]
fn select_all_on_no_match_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    let rows = select_all(&mut ctx, "select * from event", &[])?;
    assert!(rows.is_empty());
    Ok(())
}

#[test]
fn mutations_auto_commit_and_persist_across_scopes() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    let affected = execute(
        &mut ctx,
        "insert into event (id, label, weight) values (?, ?, ?)",
        &[
            RowValues::Int(1),
            RowValues::Text("boot".into()),
            RowValues::Float(0.5),
        ],
    )?;
    assert_eq!(affected, 1);
    // The executor closed its own scope; a fresh connection must see the row.
    assert!(!ctx.is_init());
    let row = select_one(&mut ctx, "select * from event where id=?", &[RowValues::Int(1)])?
        .expect("row should have been committed");
    assert_eq!(row.get("label")?.as_text(), Some("boot"));
    assert_eq!(row.get("weight")?.as_float(), Some(0.5));
    Ok(())
}

#[test]
fn rolled_back_transaction_leaves_no_rows() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    let result: Result<(), SqlMapperError> = with_transaction(&mut ctx, |ctx| {
        execute(
            ctx,
            "insert into event (id) values (?)",
            &[RowValues::Int(10)],
        )?;
        execute(
            ctx,
            "insert into event (id) values (?)",
            &[RowValues::Int(11)],
        )?;
        Err(SqlMapperError::ExecutionError("abort".into()))
    });
    assert!(result.is_err());
    let count = select_scalar(&mut ctx, "select count(id) from event", &[])?;
    assert_eq!(count.as_int(), Some(&0));
    Ok(())
}

#[test]
fn committed_transaction_keeps_all_rows() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    with_transaction(&mut ctx, |ctx| {
        execute(ctx, "insert into event (id) values (?)", &[RowValues::Int(1)])?;
        with_transaction(ctx, |ctx| {
            execute(ctx, "insert into event (id) values (?)", &[RowValues::Int(2)])
        })?;
        Ok(())
    })?;
    let count = select_scalar(&mut ctx, "select count(id) from event", &[])?;
    assert_eq!(count.as_int(), Some(&2));
    Ok(())
}

#[test]
fn select_scalar_rejects_multi_column_rows() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    execute(
        &mut ctx,
        "insert into event (id, label) values (?, ?)",
        &[RowValues::Int(1), RowValues::Text("x".into())],
    )?;
    match select_scalar(&mut ctx, "select id, label from event", &[]) {
        Err(SqlMapperError::MultiColumn(n)) => assert_eq!(n, 2),
        other => panic!("expected MultiColumn, got {other:?}"),
    }
    let one = select_scalar(&mut ctx, "select label from event", &[])?;
    assert_eq!(one.as_text(), Some("x"));
    Ok(())
}

#[test]
fn placeholders_translate_against_a_real_driver() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    for id in 1..=3 {
        execute(
            &mut ctx,
            "insert into event (id, label) values (?, ?)",
            &[RowValues::Int(id), RowValues::Text(format!("e{id}"))],
        )?;
    }
    let rows = select_all(
        &mut ctx,
        "select * from event where id>? and label<>? order by id",
        &[RowValues::Int(1), RowValues::Text("none".into())],
    )?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id")?.as_int(), Some(&2));
    Ok(())
}

#[test]
fn null_column_reads_as_null_not_missing() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx) = setup()?;
    execute(
        &mut ctx,
        "insert into event (id, label) values (?, ?)",
        &[RowValues::Int(1), RowValues::Null],
    )?;
    let row = select_one(&mut ctx, "select * from event", &[])?.expect("one row");
    assert!(row.get("label")?.is_null());
    assert!(matches!(
        row.get("no_such_column"),
        Err(SqlMapperError::MissingColumn(_))
    ));
    Ok(())
}
