//! Single-threaded reference implementations.
//!
//! These are the public serial API and the building blocks the parallel
//! operations use for trivial inputs and per-chunk work.

/// Apply `transform` to each element in order, collecting the results.
pub fn map<C, E, R, F>(items: C, mut transform: F) -> Vec<R>
where
    C: IntoIterator<Item = E>,
    F: FnMut(E) -> R,
{
    let items = items.into_iter();
    let mut result = Vec::with_capacity(items.size_hint().0);
    for item in items {
        result.push(transform(item));
    }
    result
}

/// Keep the elements for which `keep` returns true, preserving order.
pub fn filter<C, E, F>(items: C, mut keep: F) -> Vec<E>
where
    C: IntoIterator<Item = E>,
    F: FnMut(&E) -> bool,
{
    let mut result = Vec::new();
    for item in items {
        if keep(&item) {
            result.push(item);
        }
    }
    result
}

/// Left-fold the elements pairwise with `merge`, seeded with the first
/// element. Empty input yields `None`; a single element is returned
/// unchanged without calling `merge`.
pub fn reduce<C, E, F>(items: C, mut merge: F) -> Option<E>
where
    C: IntoIterator<Item = E>,
    F: FnMut(E, E) -> E,
{
    let mut items = items.into_iter();
    let mut merged = items.next()?;
    for next in items {
        merged = merge(merged, next);
    }
    Some(merged)
}
