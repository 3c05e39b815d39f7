//! Ordered, keyed middleware container.
//!
//! One `VecDeque` of `(key, unit)` pairs backs both access styles, so keyed
//! lookup and positional FIFO never disagree. Keyed operations are O(n) over
//! the entries; `push`, `pop` are O(1); `shift` and `unshift` are O(n)
//! because they renumber integer keys.
//!
//! # Key numbering
//!
//! Integer keys behave like the implicit indices of a list:
//!
//! | Operation | Effect on integer keys |
//! |---|---|
//! | `push` | takes the next free index |
//! | `set(k, …)` | `k` is used as is; later pushes continue after the largest `k` |
//! | `pop` | releases the index if it was the most recently assigned one |
//! | `shift` / `unshift` | renumbers every integer key `0..` in positional order |
//! | `remove` | leaves all other keys and the next free index untouched |
//! | `clear` | starts over at `0` |
//!
//! String keys are never renumbered. Once `i64::MAX` has been handed out
//! there is no next free index, and `push` is refused with a warning until
//! `pop`, `shift`, `unshift` or `clear` frees one.

use std::collections::vec_deque::{self, VecDeque};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::{BoxedMiddleware, Middleware};

// ── Key ───────────────────────────────────────────────────────────────────────

/// Key of an entry: an integer index or an explicit name.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl From<i64> for Key {
    fn from(index: i64) -> Self { Self::Index(index) }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self { Self::Index(index.into()) }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self { Self::Index(i64::try_from(index).unwrap_or(i64::MAX)) }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self { Self::Name(name.to_owned()) }
}

impl From<String> for Key {
    fn from(name: String) -> Self { Self::Name(name) }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

// ── MiddlewareCollection ──────────────────────────────────────────────────────

/// A mutable, ordered, keyed collection of middlewares.
///
/// Absent values are `None`, never errors: `get` on a missing key, `pop` and
/// `shift` on an empty collection.
///
/// ```rust
/// use mwqueue::{MiddlewareCollection, RequestHandler, middleware_fn};
///
/// type Next<'a> = &'a dyn RequestHandler<u32, u32>;
///
/// let mut chain = MiddlewareCollection::<u32, u32>::new();
/// chain
///     .push(middleware_fn(|n, next: Next<'_>| next.handle(n + 1)))
///     .set("double", middleware_fn(|n, next: Next<'_>| next.handle(n * 2)));
///
/// assert_eq!(chain.len(), 2);
/// assert!(chain.exists(0));
/// assert!(chain.exists("double"));
/// ```
pub struct MiddlewareCollection<Req, Res> {
    entries: VecDeque<(Key, BoxedMiddleware<Req, Res>)>,
    /// `None` once `i64::MAX` is taken.
    next_index: Option<i64>,
}

impl<Req, Res> MiddlewareCollection<Req, Res> {
    pub fn new() -> Self {
        Self { entries: VecDeque::new(), next_index: Some(0) }
    }

    /// Returns the middleware stored under `key`.
    pub fn get(&self, key: impl Into<Key>) -> Option<&BoxedMiddleware<Req, Res>> {
        let pos = self.position(&key.into())?;
        Some(&self.entries[pos].1)
    }

    /// Stores `middleware` under `key`.
    ///
    /// An existing entry is overwritten in place; a new key is appended at
    /// the back. No other entry moves.
    pub fn set<M>(&mut self, key: impl Into<Key>, middleware: M) -> &mut Self
    where
        M: Middleware<Req, Res> + Send + Sync + 'static,
    {
        let key = key.into();
        let middleware: BoxedMiddleware<Req, Res> = Arc::new(middleware);

        match self.position(&key) {
            Some(pos) => self.entries[pos].1 = middleware,
            None => {
                if let (Key::Index(index), Some(next)) = (&key, self.next_index) {
                    if *index >= next {
                        self.next_index = index.checked_add(1);
                    }
                }
                self.entries.push_back((key, middleware));
            }
        }
        self
    }

    /// Appends `middleware` under the next free integer key.
    ///
    /// When no free index is left the collection is unchanged.
    pub fn push<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<Req, Res> + Send + Sync + 'static,
    {
        let Some(index) = self.next_index else {
            warn!(middleware = middleware.name(), "no free integer key left, push ignored");
            return self;
        };
        self.next_index = index.checked_add(1);
        self.entries.push_back((Key::Index(index), Arc::new(middleware)));
        self
    }

    /// Removes and returns the last middleware.
    pub fn pop(&mut self) -> Option<BoxedMiddleware<Req, Res>> {
        let (key, middleware) = self.entries.pop_back()?;
        if let Key::Index(index) = key {
            let last_assigned = self.next_index.map_or(i64::MAX, |next| next - 1);
            if self.next_index != Some(0) && index == last_assigned {
                self.next_index = Some(index);
            }
        }
        Some(middleware)
    }

    /// Removes and returns the first middleware.
    pub fn shift(&mut self) -> Option<BoxedMiddleware<Req, Res>> {
        let (_, middleware) = self.entries.pop_front()?;
        self.renumber();
        Some(middleware)
    }

    /// Inserts `middleware` at the front, under integer key `0`.
    pub fn unshift<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware<Req, Res> + Send + Sync + 'static,
    {
        self.entries.push_front((Key::Index(0), Arc::new(middleware)));
        self.renumber();
        self
    }

    /// Removes the entry under `key`. Missing keys are ignored.
    pub fn remove(&mut self, key: impl Into<Key>) -> &mut Self {
        if let Some(pos) = self.position(&key.into()) {
            self.entries.remove(pos);
        }
        self
    }

    pub fn exists(&self, key: impl Into<Key>) -> bool {
        self.position(&key.into()).is_some()
    }

    /// Snapshot of every middleware in positional order.
    ///
    /// Later mutations of the collection do not affect the returned list.
    pub fn all(&self) -> Vec<BoxedMiddleware<Req, Res>> {
        self.iter().cloned().collect()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self.next_index = Some(0);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of middlewares in the collection.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the middlewares in positional order.
    ///
    /// Each call starts over from the current front.
    pub fn iter(&self) -> Iter<'_, Req, Res> {
        Iter(self.entries.iter())
    }

    /// Iterates `(key, middleware)` pairs in positional order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (&Key, &BoxedMiddleware<Req, Res>)> {
        self.entries.iter().map(|(k, m)| (k, m))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn renumber(&mut self) {
        let mut next = 0;
        for (key, _) in &mut self.entries {
            if let Key::Index(index) = key {
                *index = next;
                next += 1;
            }
        }
        self.next_index = Some(next);
    }
}

impl<Req, Res> Default for MiddlewareCollection<Req, Res> {
    fn default() -> Self { Self::new() }
}

/// Clones share the middlewares but not the list: a clone can be drained by
/// one [`MiddlewareQueue`](super::MiddlewareQueue) while the source stays
/// populated.
impl<Req, Res> Clone for MiddlewareCollection<Req, Res> {
    fn clone(&self) -> Self {
        Self { entries: self.entries.clone(), next_index: self.next_index }
    }
}

impl<Req, Res> fmt::Debug for MiddlewareCollection<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, m)| (k, m.name())))
            .finish()
    }
}

// ── Iteration ─────────────────────────────────────────────────────────────────

/// Borrowing iterator returned by [`MiddlewareCollection::iter`].
pub struct Iter<'a, Req, Res>(vec_deque::Iter<'a, (Key, BoxedMiddleware<Req, Res>)>);

impl<'a, Req, Res> Iterator for Iter<'a, Req, Res> {
    type Item = &'a BoxedMiddleware<Req, Res>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, m)| m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<Req, Res> DoubleEndedIterator for Iter<'_, Req, Res> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, m)| m)
    }
}

impl<Req, Res> ExactSizeIterator for Iter<'_, Req, Res> {}

impl<'a, Req, Res> IntoIterator for &'a MiddlewareCollection<Req, Res> {
    type Item = &'a BoxedMiddleware<Req, Res>;
    type IntoIter = Iter<'a, Req, Res>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

type Entry<Req, Res> = (Key, BoxedMiddleware<Req, Res>);

impl<Req, Res> IntoIterator for MiddlewareCollection<Req, Res> {
    type Item = BoxedMiddleware<Req, Res>;
    type IntoIter = std::iter::Map<vec_deque::IntoIter<Entry<Req, Res>>, fn(Entry<Req, Res>) -> BoxedMiddleware<Req, Res>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter().map(unit as fn(_) -> _)
    }
}

fn unit<Req, Res>((_, middleware): Entry<Req, Res>) -> BoxedMiddleware<Req, Res> {
    middleware
}
