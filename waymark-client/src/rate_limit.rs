//! Sliding-window request throttle shared by every caller of one client.
//!
//! A pool of `N` tickets each records when it was last returned. Taking a
//! ticket that was returned less than a second ago blocks the calling thread
//! for the remainder of that second, so no more than `N` requests start in
//! any one-second window. Callers block on the pool while all tickets are
//! out.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::trace;

const WINDOW: Duration = Duration::from_secs(1);

/// Blocking throttle capping requests per second.
#[derive(Debug, Default)]
pub struct RateLimiter {
    pool: Option<TicketPool>,
}

#[derive(Debug)]
struct TicketPool {
    /// `None` marks a ticket that has never been used.
    tickets: Mutex<VecDeque<Option<Instant>>>,
    returned: Condvar,
}

impl RateLimiter {
    /// A limiter that never blocks.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { pool: None }
    }

    /// A limiter allowing `queries_per_second` request starts per second.
    #[must_use]
    pub fn per_second(queries_per_second: NonZeroUsize) -> Self {
        let tickets = std::iter::repeat_n(None, queries_per_second.get()).collect();
        Self {
            pool: Some(TicketPool {
                tickets: Mutex::new(tickets),
                returned: Condvar::new(),
            }),
        }
    }

    /// Block until a request may start.
    ///
    /// The returned [`Ticket`] goes back to the pool, stamped with the
    /// current time, when dropped.
    pub fn acquire(&self) -> Ticket<'_> {
        let Some(pool) = &self.pool else {
            return Ticket { pool: None };
        };
        let last_used = pool.take();
        if let Some(wait) = last_used.and_then(|at| WINDOW.checked_sub(at.elapsed())) {
            trace!("rate limit reached; waiting {wait:?}");
            std::thread::sleep(wait);
        }
        Ticket { pool: Some(pool) }
    }
}

impl TicketPool {
    fn take(&self) -> Option<Instant> {
        let guard = self
            .tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut tickets = self
            .returned
            .wait_while(guard, |tickets| tickets.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        tickets.pop_front().flatten()
    }

    fn give_back(&self) {
        self.tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Some(Instant::now()));
        self.returned.notify_one();
    }
}

/// Permission to issue one request. Returned to the pool on drop.
#[derive(Debug)]
#[must_use = "dropping the ticket immediately returns it to the pool"]
pub struct Ticket<'a> {
    pool: Option<&'a TicketPool>,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool {
            pool.give_back();
        }
    }
}
