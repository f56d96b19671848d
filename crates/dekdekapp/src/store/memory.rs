use super::mem_backend::MemBackend;
use super::record_store::RecordStore;

pub type InMemoryStore = RecordStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        RecordStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{Book, Collection, Quote, Record};

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        /// Store whose collections already exist but hold no records.
        pub fn new() -> Self {
            let store = InMemoryStore::new();
            for collection in Collection::ALL {
                store.backend().put_raw(collection, "[]");
            }
            Self { store }
        }

        /// Store with nothing persisted yet, so the first load seeds.
        pub fn unseeded() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_quotes(self, texts: &[&str]) -> Self {
            let mut quotes: Vec<Quote> = self.store.load();
            for text in texts {
                let id = self.store.next_id(&quotes).unwrap();
                let mut quote = Quote::seed().remove(0);
                quote.id = id;
                quote.text = Some(text.to_string());
                quotes.push(quote);
            }
            assert!(self.store.save(&quotes));
            self
        }

        pub fn with_books(self, titles: &[&str]) -> Self {
            let mut books: Vec<Book> = self.store.load();
            for title in titles {
                let id = self.store.next_id(&books).unwrap();
                let mut book = Book::seed().remove(0);
                book.id = id;
                book.title = Some(title.to_string());
                books.push(book);
            }
            assert!(self.store.save(&books));
            self
        }
    }
}
