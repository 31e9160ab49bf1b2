#![allow(dead_code)]

use recorm::mock::MockDatabase;
use recorm::prelude::*;
use recorm::Repository;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Entity)]
#[orm(table = "authors", pk = "id", ai = "id")]
struct Author {
    id: Option<i64>,
    name: String,
}

#[derive(Debug, Clone, Default, Entity)]
#[orm(table = "publishers", pk = "code")]
struct Publisher {
    code: String,
    title: String,
}

#[derive(Debug, Clone, Default, Entity)]
#[orm(
    table = "books",
    pk = "id",
    ai = "id",
    refs = "author_id:authors.id, publisher_code:publishers.code"
)]
struct Book {
    id: Option<i64>,
    title: String,
    author_id: Option<i64>,
    publisher_code: Option<String>,
}

fn setup() -> (Arc<MockDatabase>, Db) {
    let mock = Arc::new(MockDatabase::new());
    let db = Db::from_arc(mock.clone());
    (mock, db)
}

fn author_row(id: i64, name: &str) -> Row {
    Row::from_pairs([("id", Value::Int(id)), ("name", Value::from(name))])
}

#[test]
fn discover_registers_derived_entities() {
    let (_mock, db) = setup();
    let registry = Registry::discover(&db);

    for table in ["authors", "publishers", "books"] {
        assert!(registry.contains(table), "{table} not registered");
    }
    assert!(registry.resolve("missing").is_none());
}

#[test]
fn references_load_one_query_each() {
    let (mock, db) = setup();
    let registry = Registry::discover(&db);

    let mut book = Model::new(
        &db,
        Book {
            id: Some(1),
            title: "Dune".into(),
            author_id: Some(7),
            publisher_code: Some("CHL".into()),
        },
    )
    .unwrap();

    mock.push_rows(vec![author_row(7, "Frank Herbert")]);
    mock.push_rows(vec![Row::from_pairs([
        ("code", Value::from("CHL")),
        ("title", Value::from("Chilton")),
    ])]);

    assert!(book.load_references(&registry));
    assert_eq!(
        mock.statements(),
        vec![
            "SELECT * FROM authors WHERE id = 7",
            "SELECT * FROM publishers WHERE code = 'CHL'",
        ]
    );

    let author: Author = book
        .reference_at("author_id:authors", 0)
        .unwrap()
        .cast()
        .unwrap();
    assert_eq!(author.name, "Frank Herbert");
    assert_eq!(
        book.reference("publisher_code:publishers").unwrap()[0].table,
        "publishers"
    );

    // Casting into the wrong entity type is refused.
    let record = book.reference_at("author_id:authors", 0).unwrap();
    assert!(record.cast::<Publisher>().unwrap_err().is_configuration());
}

#[test]
fn reloading_replaces_previous_references() {
    let (mock, db) = setup();
    let registry = Registry::discover(&db);

    let mut book = Model::new(
        &db,
        Book {
            author_id: Some(7),
            ..Default::default()
        },
    )
    .unwrap();

    mock.push_rows(vec![author_row(7, "First")]);
    book.load_references(&registry);
    assert_eq!(book.references().len(), 1);

    book.author_id = None;
    book.load_references(&registry);
    assert!(book.references().is_empty());
}

#[test]
fn find_with_references_and_export() {
    let (mock, db) = setup();
    let registry = Registry::discover(&db);

    mock.push_rows(vec![Row::from_pairs([
        ("id", Value::Int(1)),
        ("title", Value::from("Dune")),
        ("author_id", Value::Int(7)),
        ("publisher_code", Value::Null),
    ])]);
    mock.push_rows(vec![author_row(7, "Frank Herbert")]);

    let mut books = Model::<Book>::blank(&db).unwrap();
    let found = books.find(FindOptions::new().with_references(&registry));
    let dune = found.into_iter().next().and_then(Fetched::into_model).unwrap();

    let json = dune.to_json().unwrap();
    assert_eq!(json["title"], "Dune");
    assert_eq!(
        json["references"]["author_id:authors"][0]["fields"]["name"],
        "Frank Herbert"
    );
    assert_eq!(mock.statements().len(), 2);
}

#[test]
fn repository_counts_through_a_fresh_model() {
    let (mock, db) = setup();
    let registry = Registry::discover(&db);
    let authors = registry.resolve("authors").unwrap();

    mock.push_count(2);
    assert_eq!(authors.count_by("name", &Value::from("Anon")), 2);
    assert_eq!(
        mock.last_statement().unwrap(),
        "SELECT COUNT(*) AS count FROM authors WHERE name = 'Anon'"
    );
    assert_eq!(authors.table(), "authors");
}
