use booktrack_core::db::migrations::latest_version;
use booktrack_core::db::open_db_in_memory;
use booktrack_core::{
    BookIdentity, BookListQuery, BookPatch, BookRecord, BookRepository, DuplicateKey,
    ReadingState, RepoError, SqliteBookRepository,
};
use rusqlite::Connection;

fn isbn(value: &str) -> BookIdentity {
    BookIdentity::Isbn {
        value: value.to_string(),
    }
}

fn pair(title: &str, author: &str) -> BookIdentity {
    BookIdentity::TitleAuthor {
        title: title.to_string(),
        author: author.to_string(),
    }
}

fn dune() -> BookRecord {
    BookRecord {
        isbn: Some("9780441013593".to_string()),
        author: "frank herbert".to_string(),
        title: "dune".to_string(),
        series: Some("Dune Chronicles".to_string()),
        state: ReadingState::Reading,
        started_at: Some(1_700_000_000),
        finished_at: None,
        genres: vec!["sci-fi, space".to_string(), "classic".to_string()],
    }
}

#[test]
fn insert_and_find_by_isbn_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let id = repo.insert_book(&dune()).unwrap();

    let loaded = repo.find_by_isbn("9780441013593").unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.book, dune());
}

#[test]
fn find_by_title_author_is_case_insensitive_on_input() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();

    let loaded = repo
        .find_by_title_author("DUNE", "Frank Herbert")
        .unwrap()
        .unwrap();
    assert_eq!(loaded.book.isbn.as_deref(), Some("9780441013593"));
    assert!(repo.find_by_title_author("dune", "someone else").unwrap().is_none());
}

#[test]
fn genres_with_delimiters_survive_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();

    let raw: String = conn
        .query_row("SELECT genres FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(raw, r"sci-fi\, space,classic");

    let loaded = repo.find_by_isbn("9780441013593").unwrap().unwrap();
    assert_eq!(loaded.book.genres, vec!["sci-fi, space", "classic"]);
}

#[test]
fn state_is_persisted_as_frozen_ordinal() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let mut book = dune();
    book.state = ReadingState::Tbr;
    repo.insert_book(&book).unwrap();

    let status: i64 = conn
        .query_row("SELECT status FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, 3);
}

#[test]
fn duplicate_isbn_insert_is_reported_as_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();

    let mut other = dune();
    other.title = "another title".to_string();
    let err = repo.insert_book(&other).unwrap_err();
    assert!(
        matches!(err, RepoError::Duplicate { key: DuplicateKey::Isbn, .. }),
        "{err}"
    );
}

#[test]
fn duplicate_title_author_insert_is_reported_as_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();

    let mut other = dune();
    other.isbn = None;
    other.title = "Dune".to_string();
    let err = repo.insert_book(&other).unwrap_err();
    assert!(
        matches!(
            err,
            RepoError::Duplicate {
                key: DuplicateKey::TitleAuthor,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn isbn_only_records_do_not_collide_on_empty_title_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    repo.insert_book(&BookRecord::for_identity(&isbn("9780306406157")))
        .unwrap();
    repo.insert_book(&BookRecord::for_identity(&isbn("0306406152")))
        .unwrap();

    let all = repo.list_books(&BookListQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn update_applies_only_patched_columns() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();

    let patch = BookPatch {
        state: Some(ReadingState::Finished),
        finished_at: Some(1_700_086_400),
        series: Some(String::new()),
        ..BookPatch::default()
    };
    repo.update_book(&pair("dune", "frank herbert"), &patch)
        .unwrap();

    let loaded = repo.find_by_isbn("9780441013593").unwrap().unwrap();
    assert_eq!(loaded.book.state, ReadingState::Finished);
    assert_eq!(loaded.book.finished_at, Some(1_700_086_400));
    assert_eq!(loaded.book.started_at, Some(1_700_000_000));
    assert_eq!(loaded.book.series, None);
    assert_eq!(loaded.book.genres, dune().genres);

    let mut expected = dune();
    patch.apply_to(&mut expected);
    assert_eq!(loaded.book, expected);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let patch = BookPatch {
        state: Some(ReadingState::Dnf),
        ..BookPatch::default()
    };
    let err = repo.update_book(&isbn("0306406152"), &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(identity) if identity == isbn("0306406152")));

    let err = repo
        .update_book(&isbn("0306406152"), &BookPatch::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn remove_deletes_row_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();

    repo.remove_book(&isbn("9780441013593")).unwrap();
    assert!(repo.find_by_isbn("9780441013593").unwrap().is_none());

    let err = repo.remove_book(&isbn("9780441013593")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn list_filters_by_state_and_paginates_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    for (title, state) in [
        ("a", ReadingState::Reading),
        ("b", ReadingState::Tbr),
        ("c", ReadingState::Reading),
        ("d", ReadingState::Reading),
    ] {
        let mut book = BookRecord::for_identity(&pair(title, "author"));
        book.state = state;
        repo.insert_book(&book).unwrap();
    }

    let reading = repo
        .list_books(&BookListQuery {
            state: Some(ReadingState::Reading),
            ..BookListQuery::default()
        })
        .unwrap();
    let titles: Vec<_> = reading.iter().map(|b| b.book.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "c", "d"]);

    let page = repo
        .list_books(&BookListQuery {
            limit: Some(2),
            offset: 1,
            ..BookListQuery::default()
        })
        .unwrap();
    let titles: Vec<_> = page.iter().map(|b| b.book.title.as_str()).collect();
    assert_eq!(titles, vec!["b", "c"]);

    let tail = repo
        .list_books(&BookListQuery {
            offset: 3,
            ..BookListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].book.title, "d");
}

#[test]
fn read_rejects_invalid_persisted_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.insert_book(&dune()).unwrap();
    // Bypass the CHECK constraint to simulate a corrupted row.
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE books SET status = 7;",
    )
    .unwrap();

    let err = repo.find_by_isbn("9780441013593").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "{err}");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_books_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("books"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE books (
            id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            isbn TEXT,
            author TEXT NOT NULL,
            title TEXT NOT NULL,
            series TEXT,
            date_started INTEGER,
            status INTEGER NOT NULL DEFAULT 0,
            genres TEXT
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteBookRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "books",
            column: "date_finished"
        })
    ));
}
