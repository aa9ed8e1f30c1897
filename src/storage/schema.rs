//! Database schema definitions

/// SQL to create the book table
pub const CREATE_BOOK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS book (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    press TEXT NOT NULL,
    category TEXT NOT NULL,
    year INTEGER NOT NULL,
    price REAL NOT NULL,
    total INTEGER NOT NULL,
    stock INTEGER NOT NULL,
    CHECK (stock >= 0 AND stock <= total)
)
"#;

/// SQL to create the card table
pub const CREATE_CARD_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS card (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT,
    type TEXT NOT NULL CHECK (type IN ('Teacher', 'Student'))
)
"#;

/// SQL to create the manager table
pub const CREATE_MANAGER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS manager (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
)
"#;

/// SQL to create the borrow table.
/// One row per open loan; the primary key forbids a card holding two copies of a book.
pub const CREATE_BORROW_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS borrow (
    book_id INTEGER NOT NULL,
    card_id INTEGER NOT NULL,
    borrow_date TEXT NOT NULL,
    due_date TEXT NOT NULL,
    manager_id INTEGER,
    PRIMARY KEY (book_id, card_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_book_title ON book(title)",
    "CREATE INDEX IF NOT EXISTS idx_borrow_card ON borrow(card_id)",
    "CREATE INDEX IF NOT EXISTS idx_borrow_due ON borrow(book_id, due_date)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_BOOK_TABLE,
        CREATE_CARD_TABLE,
        CREATE_MANAGER_TABLE,
        CREATE_BORROW_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Column list matching `row_to_book`
pub const BOOK_COLUMNS: &str = "id, title, author, press, category, year, price, total, stock";
