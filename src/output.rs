//! Output formatting for search results and catalog listings.

use crate::catalog::types::Book;
use crate::search::types::{
    GenreCount, LanguageCount, MatchType, SearchResponse, SeriesCount,
};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print a page of search hits with scores and match types.
pub fn print_search_results(response: &SearchResponse, offset: usize, color: bool) -> io::Result<()> {
    let mut stdout = stream(color);

    if response.hits.is_empty() {
        writeln!(stdout, "No results.")?;
        return Ok(());
    }

    for hit in &response.hits {
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "{}", hit.book.title)?;
        stdout.reset()?;

        let authors: Vec<String> = hit.book.authors.iter().map(|a| a.full_name()).collect();
        if !authors.is_empty() {
            write!(stdout, " — {}", authors.join(", "))?;
        }
        writeln!(stdout)?;

        stdout.set_color(ColorSpec::new().set_fg(Some(match_color(hit.match_type))))?;
        write!(stdout, "  {:?}", hit.match_type)?;
        stdout.reset()?;
        write!(stdout, "  score {:.2}  id {}", hit.score, hit.book.id)?;
        if let Some(series) = &hit.book.series {
            write!(stdout, "  [{}", series)?;
            if let Some(num) = hit.book.series_num {
                write!(stdout, " #{}", num)?;
            }
            write!(stdout, "]")?;
        }
        writeln!(stdout)?;
    }

    let shown_to = offset + response.hits.len();
    writeln!(stdout)?;
    writeln!(
        stdout,
        "{}-{} of {} results",
        offset + 1,
        shown_to,
        response.total
    )?;
    Ok(())
}

/// Print a plain book listing (series, author, random, top-rated views).
pub fn print_books(books: &[Book], color: bool) -> io::Result<()> {
    let mut stdout = stream(color);

    if books.is_empty() {
        writeln!(stdout, "No books.")?;
        return Ok(());
    }

    for book in books {
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "{}", book.title)?;
        stdout.reset()?;

        let authors: Vec<String> = book.authors.iter().map(|a| a.full_name()).collect();
        if !authors.is_empty() {
            write!(stdout, " — {}", authors.join(", "))?;
        }
        write!(stdout, "  (id {}", book.id)?;
        if let Some(rating) = book.rating {
            write!(stdout, ", rating {}", rating)?;
        }
        if let Some(num) = book.series_num {
            write!(stdout, ", #{}", num)?;
        }
        writeln!(stdout, ")")?;
    }
    Ok(())
}

pub fn print_genres(rows: &[GenreCount]) -> io::Result<()> {
    let mut stdout = io::stdout();
    for row in rows {
        writeln!(stdout, "{:8} {}", row.count, row.genre)?;
    }
    Ok(())
}

pub fn print_languages(rows: &[LanguageCount]) -> io::Result<()> {
    let mut stdout = io::stdout();
    for row in rows {
        writeln!(stdout, "{:8} {}", row.count, row.language)?;
    }
    Ok(())
}

pub fn print_series(rows: &[SeriesCount]) -> io::Result<()> {
    let mut stdout = io::stdout();
    for row in rows {
        writeln!(stdout, "{:8} {}", row.count, row.series)?;
    }
    Ok(())
}

fn stream(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn match_color(match_type: MatchType) -> Color {
    match match_type {
        MatchType::Exact => Color::Green,
        MatchType::Fuzzy => Color::Yellow,
        MatchType::Partial => Color::Cyan,
    }
}
