//! Book loans.
//!
//! [`Library`] keeps its patrons and books in keyed registries and reports
//! every successful action to an optional [`AuditSink`]. The sink is borrowed,
//! so its owner decides when it is closed.

use std::{collections::BTreeMap, fmt, io};

/// Errors raised by library operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("a patron with id {0} already exists")]
    DuplicatePatron(String),

    #[error("a book with code {0} already exists")]
    DuplicateBook(String),

    #[error("patron {0} is not registered")]
    UnknownPatron(String),

    #[error("book {0} not found")]
    UnknownBook(String),

    #[error("book {0} is already on loan")]
    AlreadyLent(String),

    #[error("book {0} was not on loan")]
    NotLent(String),
}

/// Somewhere to record what the library did.
pub trait AuditSink {
    /// Records one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line could not be recorded.
    fn record(&mut self, line: &str) -> io::Result<()>;
}

impl AuditSink for Vec<String> {
    fn record(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// A book in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    available: bool,
}

impl Book {
    /// A book that is on the shelf.
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            available: true,
        }
    }

    /// Whether the book can be lent.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.available { "available" } else { "on loan" };
        write!(f, "\"{}\" by {} ({state})", self.title, self.author)
    }
}

/// A registered borrower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patron {
    /// Unique identifier.
    pub id: String,
    /// Full name.
    pub name: String,
}

impl Patron {
    /// Creates a patron.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Patrons, books, and the loans between them.
#[derive(Default)]
pub struct Library<'a> {
    patrons: BTreeMap<String, Patron>,
    books: BTreeMap<String, Book>,
    audit: Option<&'a mut dyn AuditSink>,
}

impl fmt::Debug for Library<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("patrons", &self.patrons)
            .field("books", &self.books)
            .field("audited", &self.audit.is_some())
            .finish()
    }
}

impl<'a> Library<'a> {
    /// An empty library that records nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty library that reports to `sink`.
    #[must_use]
    pub fn with_audit(sink: &'a mut dyn AuditSink) -> Self {
        Self {
            audit: Some(sink),
            ..Self::default()
        }
    }

    fn audit(&mut self, line: &str) {
        if let Some(sink) = self.audit.as_deref_mut() {
            if let Err(e) = sink.record(line) {
                tracing::warn!("failed to record audit line: {e}");
            }
        }
    }

    /// Registers a patron.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DuplicatePatron`] if the id is taken.
    pub fn register_patron(&mut self, patron: Patron) -> Result<(), LibraryError> {
        if self.patrons.contains_key(&patron.id) {
            return Err(LibraryError::DuplicatePatron(patron.id));
        }
        self.audit(&format!("[PATRON] registered: {patron}"));
        self.patrons.insert(patron.id.clone(), patron);
        Ok(())
    }

    /// Adds a book to the catalogue under `code`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DuplicateBook`] if the code is taken.
    pub fn register_book(&mut self, code: impl Into<String>, book: Book) -> Result<(), LibraryError> {
        let code = code.into();
        if self.books.contains_key(&code) {
            return Err(LibraryError::DuplicateBook(code));
        }
        self.audit(&format!("[BOOK] registered: code={code}, {book}"));
        self.books.insert(code, book);
        Ok(())
    }

    /// Looks up a book by code.
    #[must_use]
    pub fn book(&self, code: &str) -> Option<&Book> {
        self.books.get(code)
    }

    /// Lends a book to a patron.
    ///
    /// # Errors
    ///
    /// Fails if the patron or book is unknown or the book is already lent.
    pub fn lend(&mut self, code: &str, patron_id: &str) -> Result<(), LibraryError> {
        if !self.patrons.contains_key(patron_id) {
            return Err(LibraryError::UnknownPatron(patron_id.to_string()));
        }
        let book = self
            .books
            .get_mut(code)
            .ok_or_else(|| LibraryError::UnknownBook(code.to_string()))?;
        if !book.available {
            return Err(LibraryError::AlreadyLent(code.to_string()));
        }
        book.available = false;
        self.audit(&format!("[LOAN] book {code} lent to patron {patron_id}"));
        Ok(())
    }

    /// Takes a lent book back.
    ///
    /// # Errors
    ///
    /// Fails if the book is unknown or was not on loan.
    pub fn give_back(&mut self, code: &str) -> Result<(), LibraryError> {
        let book = self
            .books
            .get_mut(code)
            .ok_or_else(|| LibraryError::UnknownBook(code.to_string()))?;
        if book.available {
            return Err(LibraryError::NotLent(code.to_string()));
        }
        book.available = true;
        self.audit(&format!("[RETURN] book {code} returned and available"));
        Ok(())
    }

    /// Every book with its code, ordered by code.
    pub fn books(&self) -> impl Iterator<Item = (&str, &Book)> {
        self.books.iter().map(|(code, book)| (code.as_str(), book))
    }

    /// Every patron, ordered by id.
    pub fn patrons(&self) -> impl Iterator<Item = &Patron> {
        self.patrons.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn record(&mut self, _line: &str) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    fn stocked(library: &mut Library<'_>) {
        library
            .register_patron(Patron::new("2402", "Adriel Sánchez"))
            .unwrap();
        library
            .register_book("L001", Book::new("El Principito", "Antoine de Saint-Exupéry"))
            .unwrap();
    }

    #[test]
    fn lend_and_give_back() {
        let mut library = Library::new();
        stocked(&mut library);

        library.lend("L001", "2402").unwrap();
        assert!(!library.book("L001").unwrap().is_available());
        assert_eq!(
            library.lend("L001", "2402"),
            Err(LibraryError::AlreadyLent("L001".to_string()))
        );

        library.give_back("L001").unwrap();
        assert!(library.book("L001").unwrap().is_available());
        assert_eq!(
            library.give_back("L001"),
            Err(LibraryError::NotLent("L001".to_string()))
        );
    }

    #[test]
    fn unknown_patron_and_book() {
        let mut library = Library::new();
        stocked(&mut library);

        assert_eq!(
            library.lend("L001", "0000"),
            Err(LibraryError::UnknownPatron("0000".to_string()))
        );
        assert_eq!(
            library.lend("L999", "2402"),
            Err(LibraryError::UnknownBook("L999".to_string()))
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut library = Library::new();
        stocked(&mut library);

        assert!(matches!(
            library.register_patron(Patron::new("2402", "Someone")),
            Err(LibraryError::DuplicatePatron(_))
        ));
        assert!(matches!(
            library.register_book("L001", Book::new("Other", "Author")),
            Err(LibraryError::DuplicateBook(_))
        ));
    }

    #[test]
    fn successful_actions_are_audited() {
        let mut lines = Vec::new();
        {
            let mut library = Library::with_audit(&mut lines);
            stocked(&mut library);
            library.lend("L001", "2402").unwrap();
            let _ = library.lend("L001", "2402");
            library.give_back("L001").unwrap();
        }

        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("[LOAN]"));
        assert!(lines[3].starts_with("[RETURN]"));
    }

    #[test]
    fn failing_sink_does_not_abort_actions() {
        let mut sink = BrokenSink;
        let mut library = Library::with_audit(&mut sink);
        stocked(&mut library);

        library.lend("L001", "2402").unwrap();

        assert!(!library.book("L001").unwrap().is_available());
    }
}
