//! Terminal rendering for books and notices.

use crate::domain::Book;
use crate::session::{Notice, NoticeLevel};

const ID_WIDTH: usize = 6;
const TITLE_WIDTH: usize = 36;
const AUTHOR_WIDTH: usize = 24;
const YEAR_WIDTH: usize = 6;
const GENRE_WIDTH: usize = 20;

/// Columns plus one separating space between each pair
const TABLE_WIDTH: usize = ID_WIDTH + TITLE_WIDTH + AUTHOR_WIDTH + YEAR_WIDTH + GENRE_WIDTH + 4;

/// Print books as a fixed-width table
pub fn print_book_table(books: &[&Book]) {
    println!("{}", header_row());
    println!("{}", "-".repeat(TABLE_WIDTH));

    for book in books {
        println!("{}", table_row(book));
    }
}

fn header_row() -> String {
    format_row("ID", "TITLE", "AUTHOR", "YEAR", "GENRE")
}

fn table_row(book: &Book) -> String {
    format_row(
        &book.id.to_string(),
        &truncate(&book.title, TITLE_WIDTH),
        &truncate(&book.author, AUTHOR_WIDTH),
        &book.publication_year.to_string(),
        &truncate(book.genre.as_deref().unwrap_or("-"), GENRE_WIDTH),
    )
}

fn format_row(id: &str, title: &str, author: &str, year: &str, genre: &str) -> String {
    format!(
        "{id:<iw$} {title:<tw$} {author:<aw$} {year:<yw$} {genre:<gw$}",
        iw = ID_WIDTH,
        tw = TITLE_WIDTH,
        aw = AUTHOR_WIDTH,
        yw = YEAR_WIDTH,
        gw = GENRE_WIDTH,
    )
}

/// Print all fields of one book
pub fn print_book_details(book: &Book) {
    println!("  ID:          {}", book.id);
    println!("  Title:       {}", book.title);
    println!("  Author:      {}", book.author);
    println!("  ISBN:        {}", book.isbn);
    println!("  Year:        {}", book.publication_year);
    if let Some(genre) = &book.genre {
        println!("  Genre:       {}", genre);
    }
    if let Some(description) = &book.description {
        println!("  Description: {}", description);
    }
    println!("  Created:     {}", book.created_at);
    println!("  Updated:     {}", book.updated_at);
}

/// Print notices to stderr
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{}", notice_line(notice));
    }
}

fn notice_line(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Info => "✅",
        NoticeLevel::Error => "❌",
    };
    format!("{} {}: {}", marker, notice.title, notice.description)
}

/// Shorten to `width` characters, marking the cut with "..."
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
