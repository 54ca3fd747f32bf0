#![cfg(feature = "sqlite")]

use std::sync::atomic::{AtomicI64, Ordering};

use sql_mapper::prelude::*;

static STAMP: AtomicI64 = AtomicI64::new(100);

fn user_mapping() -> Result<Mapping, SqlMapperError> {
    Mapping::builder("User")
        .field("id", Field::integer().primary_key())
        .field("name", Field::string())
        .field("email", Field::string().not_updatable())
        .field("passwd", Field::string().default_value(RowValues::Text("123456".into())))
        .field(
            "last_modified",
            Field::integer().default_fn(|| RowValues::Int(STAMP.fetch_add(1, Ordering::SeqCst))),
        )
        .field("notes", Field::text().nullable().not_insertable())
        .build()
}

fn setup() -> Result<(tempfile::TempDir, ExecutionContext, Mapping), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("crud.db");
    let engine = Engine::new(SqliteFactory::new(path.to_string_lossy()));
    let mut ctx = ExecutionContext::new(engine);
    let mapping = user_mapping()?;
    execute(&mut ctx, mapping.ddl(), &[])?;
    Ok((dir, ctx, mapping))
}

fn new_user(mapping: &Mapping, id: i64, name: &str) -> Result<Record, SqlMapperError> {
    let mut record = mapping.new_record();
    record.set("id", RowValues::Int(id))?;
    record.set("name", RowValues::Text(name.into()))?;
    record.set("email", RowValues::Text(format!("{name}@example.org")))?;
    Ok(record)
}

#[test]
fn insert_then_get_round_trips_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    let mut user = new_user(&mapping, 1, "alice")?;
    assert_eq!(user.insert(&mut ctx)?, 1);

    let fetched = mapping
        .get(&mut ctx, RowValues::Int(1))?
        .expect("row must exist");
    assert_eq!(fetched.get("id"), Some(&RowValues::Int(1)));
    assert_eq!(fetched.get("name"), Some(&RowValues::Text("alice".into())));
    // Unset insertable fields were filled from their defaults, both on the
    // record and in storage.
    assert_eq!(user.get("passwd"), Some(&RowValues::Text("123456".into())));
    assert_eq!(fetched.get("passwd"), Some(&RowValues::Text("123456".into())));
    assert_eq!(fetched.get("last_modified"), user.get("last_modified"));
    Ok(())
}

#[test]
fn get_on_missing_primary_key_is_none() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    assert!(mapping.get(&mut ctx, RowValues::Int(404))?.is_none());
    Ok(())
}

#[test]
fn default_producer_yields_fresh_values_per_insert() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    let mut a = new_user(&mapping, 1, "a")?;
    let mut b = new_user(&mapping, 2, "b")?;
    a.insert(&mut ctx)?;
    b.insert(&mut ctx)?;
    let stamp_a = a.get("last_modified").cloned().expect("default filled");
    let stamp_b = b.get("last_modified").cloned().expect("default filled");
    assert_ne!(stamp_a, stamp_b);
    Ok(())
}

#[test]
fn non_insertable_fields_are_stripped_before_insert() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    let mut user = new_user(&mapping, 1, "alice")?;
    user.set("notes", RowValues::Text("scratch".into()))?;
    user.insert(&mut ctx)?;
    assert!(user.get("notes").is_none());
    let fetched = mapping
        .get(&mut ctx, RowValues::Int(1))?
        .expect("row must exist");
    assert!(fetched.get("notes").expect("column present").is_null());
    Ok(())
}

#[test]
fn update_changes_only_updatable_fields() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    let mut user = new_user(&mapping, 1, "alice")?;
    user.insert(&mut ctx)?;

    let mut loaded = mapping
        .get(&mut ctx, RowValues::Int(1))?
        .expect("row must exist");
    loaded.set("name", RowValues::Text("alicia".into()))?;
    // Changed on the instance, but excluded from UPDATE by updatable=false.
    loaded.set("email", RowValues::Text("new@example.org".into()))?;
    assert_eq!(loaded.update(&mut ctx)?, 1);

    let fetched = mapping
        .get(&mut ctx, RowValues::Int(1))?
        .expect("row must exist");
    assert_eq!(fetched.get("name"), Some(&RowValues::Text("alicia".into())));
    assert_eq!(
        fetched.get("email"),
        Some(&RowValues::Text("alice@example.org".into()))
    );
    Ok(())
}

#[test]
fn update_on_missing_row_falls_back_to_insert() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    let mut ghost = new_user(&mapping, 9, "ghost")?;
    assert_eq!(ghost.update(&mut ctx)?, 1);
    assert!(mapping.get(&mut ctx, RowValues::Int(9))?.is_some());
    Ok(())
}

#[test]
fn delete_returns_zero_when_row_already_absent() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    let mut user = new_user(&mapping, 1, "alice")?;
    user.insert(&mut ctx)?;
    assert_eq!(user.delete(&mut ctx)?, 1);
    assert_eq!(user.delete(&mut ctx)?, 0);
    assert!(mapping.get(&mut ctx, RowValues::Int(1))?.is_none());
    Ok(())
}

#[test]
fn finders_and_counts() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, mut ctx, mapping) = setup()?;
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        new_user(&mapping, id, name)?.insert(&mut ctx)?;
    }

    assert_eq!(mapping.count_all(&mut ctx)?, 3);
    assert_eq!(
        mapping.count_by(&mut ctx, "where id>?", &[RowValues::Int(1)])?,
        2
    );

    let all = mapping.find_all(&mut ctx)?;
    assert_eq!(all.len(), 3);

    let first = mapping
        .find_first(&mut ctx, "where id>? order by id", &[RowValues::Int(1)])?
        .expect("match exists");
    assert_eq!(first.get("name"), Some(&RowValues::Text("bob".into())));

    let none = mapping.find_by(&mut ctx, "where name=?", &[RowValues::Text("zed".into())])?;
    assert!(none.is_empty());
    Ok(())
}

#[test]
fn pre_insert_hook_runs_and_absent_hooks_are_noops() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hooks.db");
    let engine = Engine::new(SqliteFactory::new(path.to_string_lossy()));
    let mut ctx = ExecutionContext::new(engine);

    let mapping = Mapping::builder("Audit")
        .field("id", Field::integer().primary_key())
        .field("touched", Field::boolean())
        .pre_insert(|record| record.set("touched", RowValues::Bool(true)))
        .build()?;
    execute(&mut ctx, mapping.ddl(), &[])?;

    let mut entry = mapping.new_record();
    entry.set("id", RowValues::Int(1))?;
    entry.insert(&mut ctx)?;

    let fetched = mapping
        .get(&mut ctx, RowValues::Int(1))?
        .expect("row must exist");
    assert_eq!(fetched.get("touched").expect("set by hook").as_bool(), Some(&true));

    // No pre-update/pre-delete hooks registered: both operations still work.
    let mut loaded = fetched;
    assert_eq!(loaded.update(&mut ctx)?, 1);
    assert_eq!(loaded.delete(&mut ctx)?, 1);
    Ok(())
}

#[test]
fn unknown_field_is_rejected_on_set() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, _ctx, mapping) = setup()?;
    let mut record = mapping.new_record();
    assert!(matches!(
        record.set("bogus", RowValues::Int(1)),
        Err(SqlMapperError::UnknownField(_))
    ));
    Ok(())
}
