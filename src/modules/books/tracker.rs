//! Book availability tracking.
//!
//! A book with copies on the shelf is simply lent out. Once the shelf is empty
//! the book carries a countdown (`days_available`) that is advanced lazily: a
//! day comes off only when someone asks for the book and at least
//! [`REARM_WINDOW_HOURS`] have passed since the countdown was last armed.
//! There is no background job; an unrequested book never ticks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use bookbank_db::RecordStore;
use bookbank_kernel::Clock;
use chrono::{DateTime, TimeDelta, Utc};

use super::error::LendingError;
use super::models::{Book, NewCopies, DEFAULT_DAYS_AVAILABLE};

/// Length of one countdown step.
pub const REARM_WINDOW_HOURS: i64 = 24;

/// Fractional hours from `since` to `now`; negative when the clock went backwards.
pub fn hours_between(now: DateTime<Utc>, since: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(since);
    elapsed.num_milliseconds() as f64 / 3_600_000.0
}

/// Whether a full countdown window has passed. Exactly 24h counts.
pub fn window_elapsed(now: DateTime<Utc>, armed_at: DateTime<Utc>) -> bool {
    now.signed_duration_since(armed_at) >= TimeDelta::hours(REARM_WINDOW_HOURS)
}

/// Where a book sits in its lending lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Copies on the shelf
    InStock,
    /// No copies and the countdown was never armed
    Unarmed,
    /// No copies, countdown armed less than a window ago
    Fresh,
    /// No copies, a full window has passed since the countdown was armed
    Ticking,
}

impl Availability {
    pub fn of(book: &Book, now: DateTime<Utc>) -> Self {
        match (book.copies, book.requested_at) {
            (1.., _) => Self::InStock,
            (0, None) => Self::Unarmed,
            (0, Some(armed_at)) if window_elapsed(now, armed_at) => Self::Ticking,
            (0, Some(_)) => Self::Fresh,
        }
    }

    /// The single transition a request triggers from this state
    pub fn on_request(self) -> Transition {
        match self {
            Self::InStock => Transition::Checkout,
            Self::Unarmed => Transition::Arm,
            Self::Ticking => Transition::Tick,
            Self::Fresh => Transition::Hold,
        }
    }
}

/// Effect of one request on a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Lend a copy
    Checkout,
    /// Start the countdown at its default length
    Arm,
    /// Take a day off the countdown and restart the window
    Tick,
    /// Nothing changes
    Hold,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Checkout => "checkout",
            Self::Arm => "arm",
            Self::Tick => "tick",
            Self::Hold => "hold",
        };
        f.write_str(name)
    }
}

impl Transition {
    /// Mutate `book` for this transition. Returns whether anything changed.
    pub fn apply(self, book: &mut Book, now: DateTime<Utc>) -> bool {
        match self {
            Self::Checkout => {
                book.copies = book.copies.saturating_sub(1);
                if book.copies == 0 && book.requested_at.is_none() {
                    arm(book, now);
                }
                true
            }
            Self::Arm => {
                arm(book, now);
                true
            }
            Self::Tick => {
                book.days_available = book.days_available.saturating_sub(1);
                book.requested_at = Some(now);
                true
            }
            Self::Hold => false,
        }
    }
}

fn arm(book: &mut Book, now: DateTime<Utc>) {
    book.requested_at = Some(now);
    book.days_available = DEFAULT_DAYS_AVAILABLE;
}

/// Result of a request for a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub transition: Transition,
    pub message: String,
    /// The updated record, present only when a copy was lent
    pub book: Option<Book>,
}

/// Result of adding stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// True when the title was new to the catalog
    pub created: bool,
    pub message: String,
    pub book: Book,
}

fn wait_message(book: &Book) -> String {
    format!(
        "Your book \"{}\" will be available in {} days.",
        book.title, book.days_available
    )
}

fn checkout_message(book: &Book) -> String {
    if book.copies == 0 {
        format!(
            "You have successfully requested \"{}\". That was the last copy; it will be available again in {} days.",
            book.title, book.days_available
        )
    } else {
        format!("You have successfully requested \"{}\".", book.title)
    }
}

/// Per-title async mutexes serializing read-modify-write cycles.
///
/// An entry lives only while some task holds or waits on it.
#[derive(Default)]
struct TitleLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TitleLocks {
    async fn acquire(&self, title: &str) -> TitleGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(title.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        TitleGuard {
            locks: self,
            title: title.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held lock on one title; removes the map entry when nobody else needs it.
struct TitleGuard<'a> {
    locks: &'a TitleLocks,
    title: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for TitleGuard<'_> {
    fn drop(&mut self) {
        // Release first so our own Arc no longer counts.
        self.guard.take();

        let mut locks = self
            .locks
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.title)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.title);
        }
    }
}

/// Owns the lending rules for every book in a [`RecordStore`].
pub struct AvailabilityTracker {
    store: Arc<dyn RecordStore<Book>>,
    clock: Arc<dyn Clock>,
    locks: TitleLocks,
}

impl AvailabilityTracker {
    pub fn new(store: Arc<dyn RecordStore<Book>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            locks: TitleLocks::default(),
        }
    }

    /// Ask to borrow a book.
    ///
    /// Lends a copy when one is on the shelf. Otherwise reports how many days
    /// remain, arming or advancing the countdown as described in the module docs.
    pub async fn request_book(&self, title: &str) -> Result<RequestOutcome, LendingError> {
        let _guard = self.locks.acquire(title).await;

        let mut book = self
            .store
            .find(title)
            .await?
            .ok_or_else(|| LendingError::not_found(title))?;

        let now = self.clock.now();
        let state = Availability::of(&book, now);
        let transition = state.on_request();

        if transition.apply(&mut book, now) {
            self.store.save(book.clone()).await?;
            tracing::info!(
                title = %book.title,
                %transition,
                copies = book.copies,
                days_available = book.days_available,
                "book requested"
            );
        } else {
            tracing::debug!(
                title = %book.title,
                %transition,
                hours_since_armed = book.requested_at.map(|at| hours_between(now, at)),
                days_available = book.days_available,
                "countdown window still open"
            );
        }

        let outcome = match transition {
            Transition::Checkout => RequestOutcome {
                transition,
                message: checkout_message(&book),
                book: Some(book),
            },
            Transition::Arm | Transition::Tick | Transition::Hold => RequestOutcome {
                transition,
                message: wait_message(&book),
                book: None,
            },
        };
        Ok(outcome)
    }

    /// Add copies to an existing title or create it.
    ///
    /// Restocking leaves any countdown state on the record as it was.
    pub async fn add_copies(&self, input: NewCopies) -> Result<AddOutcome, LendingError> {
        let _guard = self.locks.acquire(&input.title).await;

        let outcome = match self.store.find(&input.title).await? {
            Some(mut book) => {
                book.copies = book.copies.checked_add(input.copies).ok_or_else(|| {
                    LendingError::validation("copies", "copies exceed the supported maximum")
                })?;
                AddOutcome {
                    created: false,
                    message: "Book copies updated successfully".to_string(),
                    book,
                }
            }
            None => AddOutcome {
                created: true,
                message: "Book added successfully".to_string(),
                book: input.into_book(),
            },
        };

        self.store.save(outcome.book.clone()).await?;
        tracing::info!(
            title = %outcome.book.title,
            created = outcome.created,
            copies = outcome.book.copies,
            "book stock added"
        );
        Ok(outcome)
    }

    /// Every book in the catalog, ordered by title
    pub async fn catalog(&self) -> Result<Vec<Book>, LendingError> {
        Ok(self.store.list().await?)
    }

    pub async fn find(&self, title: &str) -> Result<Book, LendingError> {
        self.store
            .find(title)
            .await?
            .ok_or_else(|| LendingError::not_found(title))
    }

    /// Insert the given books whose titles are not in the catalog yet.
    /// Existing titles are left alone. Returns how many were inserted.
    pub async fn seed(
        &self,
        books: impl IntoIterator<Item = NewCopies>,
    ) -> Result<usize, LendingError> {
        let mut inserted = 0;
        for entry in books {
            let _guard = self.locks.acquire(&entry.title).await;

            if self.store.find(&entry.title).await?.is_none() {
                tracing::debug!(title = %entry.title, "seeding book");
                self.store.save(entry.into_book()).await?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
