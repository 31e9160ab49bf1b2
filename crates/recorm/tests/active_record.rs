#![allow(dead_code)]

use recorm::mock::MockDatabase;
use recorm::prelude::*;
use recorm::{CountStrategy, SqlLogLevel};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[orm(table = "users", pk = "id", ai = "id")]
struct User {
    id: Option<i64>,
    #[orm(column = "user_name")]
    name: String,
    email: Option<String>,
    age: i32,
    active: bool,
    #[orm(skip)]
    display_label: String,
}

#[derive(Debug, Clone, Default, Entity)]
#[orm(table = "order_items", pk = "order_id, line_no")]
struct OrderItem {
    order_id: i64,
    line_no: i32,
    sku: String,
    quantity: u32,
}

#[derive(Debug, Clone, Default, Entity)]
#[orm(table = "bad table", pk = "id;drop", refs = "owner_id:users")]
struct Sloppy {
    id: i64,
    owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Entity)]
#[orm(table = "widgets", pk = "uid")]
struct Misdeclared {
    id: i64,
}

fn setup() -> (Arc<MockDatabase>, Db) {
    let mock = Arc::new(MockDatabase::new());
    let db = Db::from_arc(mock.clone());
    (mock, db)
}

#[test]
fn derived_schema_registers_columns() {
    let schema = User::schema();
    assert_eq!(schema.type_name, "User");
    assert_eq!(schema.table, Some("users"));
    assert_eq!(schema.columns, &["id", "user_name", "email", "age", "active"]);

    let user = User {
        name: "Alice".into(),
        display_label: "ignored".into(),
        ..Default::default()
    };
    assert_eq!(user.column("user_name").unwrap(), Value::from("Alice"));
    assert!(user.column("display_label").unwrap_err().is_unknown_field());
}

#[test]
fn save_twice_inserts_once_then_updates() {
    let (mock, db) = setup();
    mock.set_insert_id(42);

    let mut user = Model::new(
        &db,
        User {
            name: "Bob".into(),
            email: Some("bob@example.com".into()),
            age: 30,
            active: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(user.save(), SaveResult::InsertId(42));
    assert_eq!(user.id, Some(42));

    user.age = 31;
    mock.push_count(1);
    assert_eq!(user.save(), SaveResult::Saved);

    let statements = mock.statements();
    assert_eq!(statements.len(), 3);
    assert_eq!(
        statements[0],
        "INSERT INTO users (id, user_name, email, age, active) VALUES (NULL, 'Bob', 'bob@example.com', 30, 1)"
    );
    assert_eq!(
        statements[2],
        "UPDATE users SET id = 42, user_name = 'Bob', email = 'bob@example.com', age = 31, active = 1 WHERE id = 42"
    );
    assert_eq!(
        statements.iter().filter(|s| s.starts_with("INSERT")).count(),
        1
    );
}

#[test]
fn find_always_starts_from_default_state() {
    let (mock, db) = setup();
    let mut users = Model::<User>::blank(&db).unwrap();

    users.where_("age > ?", params![18]).unwrap();
    users.find(FindOptions::default());
    users.find(FindOptions::default());

    assert_eq!(
        mock.statements(),
        vec!["SELECT * FROM users WHERE age > 18", "SELECT * FROM users"]
    );
}

#[test]
fn find_decodes_lenient_values() {
    let (mock, db) = setup();
    mock.push_rows(vec![Row::from_pairs([
        ("id", Value::from("7")),
        ("user_name", Value::from("Alice")),
        ("email", Value::Null),
        ("age", Value::from("29")),
        ("active", Value::Int(1)),
    ])]);

    let mut users = Model::<User>::blank(&db).unwrap();
    let alice = users
        .find_one(FindOptions::default())
        .and_then(Fetched::into_entity)
        .unwrap();
    assert_eq!(alice.id, Some(7));
    assert_eq!(alice.age, 29);
    assert!(alice.active);
    assert_eq!(alice.email, None);
}

#[test]
fn find_one_on_no_rows_is_none() {
    let (_mock, db) = setup();
    let mut users = Model::<User>::blank(&db).unwrap();
    users.where_("user_name = ?", params!["nobody"]).unwrap();
    assert!(users.find_one(FindOptions::default()).is_none());
}

#[test]
fn where_marker_mismatch_is_rejected() {
    let (_mock, db) = setup();
    let mut users = Model::<User>::blank(&db).unwrap();

    assert!(users.where_("age > ? and user_name = ?", params![18]).unwrap_err().is_argument());
    assert!(users.where_("age > ?", params![18, 19]).unwrap_err().is_argument());
    assert!(users.where_("age > ?", params![vec![18, 19]]).unwrap_err().is_argument());
    assert!(users.select(&[]).unwrap_err().is_argument());
    assert!(users.limit(-1, None).unwrap_err().is_argument());
}

#[test]
fn where_escapes_strings() {
    let (mock, db) = setup();
    let mut users = Model::<User>::blank(&db).unwrap();

    users
        .where_("user_name = ? and email = ?", params!["O'Brien", Option::<String>::None])
        .unwrap()
        .find(FindOptions::default());
    assert_eq!(
        mock.last_statement().unwrap(),
        r"SELECT * FROM users WHERE user_name = 'O\'Brien' and email = NULL"
    );
}

#[test]
fn delete_with_composite_key_matches_both_columns() {
    let (mock, db) = setup();
    let mut item = Model::new(
        &db,
        OrderItem {
            order_id: 10,
            line_no: 2,
            sku: "A-1".into(),
            quantity: 3,
        },
    )
    .unwrap();

    assert!(item.delete(&[]));
    assert_eq!(
        mock.last_statement().unwrap(),
        "DELETE FROM order_items WHERE order_id = 10 AND line_no = 2"
    );
}

#[test]
fn composite_key_with_zero_component_inserts() {
    let (mock, db) = setup();
    let mut item = Model::new(
        &db,
        OrderItem {
            order_id: 10,
            line_no: 0,
            sku: "A-1".into(),
            quantity: 1,
        },
    )
    .unwrap();

    assert_eq!(item.save(), SaveResult::Saved);
    assert_eq!(
        mock.statements(),
        vec!["INSERT INTO order_items (order_id, line_no, sku, quantity) VALUES (10, 0, 'A-1', 1)"]
    );
}

#[test]
fn malformed_optional_metadata_degrades() {
    let (mock, db) = setup();
    let mut sloppy = Model::new(
        &db,
        Sloppy {
            id: 1,
            owner_id: Some(2),
        },
    )
    .unwrap();

    assert_eq!(sloppy.table(), "Sloppy");
    assert!(sloppy.metadata().primary_key.is_empty());
    assert!(!sloppy.load_references(&Registry::new()));

    // Without a usable key save always inserts.
    assert_eq!(sloppy.save(), SaveResult::Saved);
    assert_eq!(
        mock.last_statement().unwrap(),
        "INSERT INTO Sloppy (id, owner_id) VALUES (1, 2)"
    );
}

#[test]
fn misdeclared_key_is_a_configuration_error() {
    let (_mock, db) = setup();
    let err = Model::<Misdeclared>::blank(&db).unwrap_err();
    assert!(err.is_configuration());
    assert!(upsert_many(&db, &[Misdeclared::default()]).unwrap_err().is_configuration());
}

#[test]
fn bulk_upsert_updates_non_key_columns() {
    let (mock, db) = setup();
    let items = vec![
        OrderItem {
            order_id: 1,
            line_no: 1,
            sku: "A".into(),
            quantity: 2,
        },
        OrderItem {
            order_id: 1,
            line_no: 2,
            sku: "B".into(),
            quantity: 5,
        },
    ];

    assert!(upsert_many(&db, &items).unwrap());
    assert_eq!(
        mock.last_statement().unwrap(),
        "INSERT INTO order_items (order_id, line_no, sku, quantity) VALUES (1, 1, 'A', 2), (1, 2, 'B', 5) \
         ON DUPLICATE KEY UPDATE sku = VALUES(sku), quantity = VALUES(quantity)"
    );
}

#[test]
fn transaction_commits_and_rolls_back() {
    let (mock, db) = setup();
    mock.set_insert_id(1);

    let id = transaction(&db, |db| {
        let mut user = Model::new(
            db,
            User {
                name: "Tx".into(),
                ..Default::default()
            },
        )?;
        user.save()
            .insert_id()
            .ok_or_else(|| OrmError::persistence("no id"))
    })
    .unwrap();
    assert_eq!(id, 1);

    let result: OrmResult<()> = transaction(&db, |_| Err(OrmError::persistence("abort")));
    assert!(result.is_err());
    assert_eq!(
        mock.transaction_log(),
        vec!["begin", "commit", "begin", "rollback"]
    );
}

#[test]
fn config_from_toml_drives_count() {
    let config = ModelConfig::from_toml_str(
        r#"
        count_strategy = "materialize"
        sql_log_level = "trace"
        max_sql_length = 80
        "#,
    )
    .unwrap();
    assert_eq!(config.count_strategy, CountStrategy::Materialize);
    assert_eq!(config.sql_log_level, SqlLogLevel::Trace);

    let mock = Arc::new(MockDatabase::new());
    let db = Db::with_config(mock.clone(), config);
    mock.push_rows(vec![Row::new(), Row::new(), Row::new()]);

    let mut users = Model::<User>::blank(&db).unwrap();
    assert_eq!(users.count(), 3);
    assert_eq!(mock.last_statement().unwrap(), "SELECT * FROM users");
}
