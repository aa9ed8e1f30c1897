use tabled::{settings::Style, Table, Tabled};
use crate::book::Book;
use crate::card::Card;

#[derive(Tabled)]
struct BookRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Press")]
    press: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Year")]
    year: i64,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: String,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            press: book.press.clone(),
            category: book.category.clone(),
            year: book.year,
            price: format!("{:.2}", book.price),
            stock: format!("{}/{}", book.stock, book.total),
        }
    }
}

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Type")]
    card_type: String,
}

impl From<&Card> for CardRow {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            name: card.name.clone(),
            address: card.address.clone().unwrap_or_default(),
            card_type: card.card_type.to_string(),
        }
    }
}

/// Render books as a rounded table; empty input renders nothing
pub fn book_table(books: &[Book]) -> String {
    if books.is_empty() {
        return String::new();
    }
    let rows: Vec<BookRow> = books.iter().map(BookRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn card_table(cards: &[Card]) -> String {
    if cards.is_empty() {
        return String::new();
    }
    let rows: Vec<CardRow> = cards.iter().map(CardRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
