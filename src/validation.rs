//! Non-empty error lists for the validation run variant
//!
//! `run_validation` reports every leaf of a failure cause. A failing cause
//! always holds at least one error, so the projection returns [`NonEmpty`]
//! rather than a `Vec` the caller would have to re-check.

use serde::{Deserialize, Serialize};

use crate::cause::Cause;

/// A vector with at least one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonEmpty<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> NonEmpty<T> {
    /// A one-element list.
    pub fn new(head: T) -> Self {
        NonEmpty {
            head,
            tail: Vec::new(),
        }
    }

    /// Build from explicit head and tail.
    pub fn from_parts(head: T, tail: Vec<T>) -> Self {
        NonEmpty { head, tail }
    }

    /// Build from a vector, returning `None` when it is empty.
    pub fn from_vec(values: Vec<T>) -> Option<Self> {
        let mut values = values.into_iter();
        let head = values.next()?;
        Some(NonEmpty {
            head,
            tail: values.collect(),
        })
    }

    /// The first element.
    pub fn head(&self) -> &T {
        &self.head
    }

    /// Everything after the first element.
    pub fn tail(&self) -> &[T] {
        &self.tail
    }

    /// Total number of elements. Always at least one.
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// A non-empty list is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Append an element.
    pub fn push(&mut self, value: T) {
        self.tail.push(value);
    }

    /// Iterate over all elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Flatten back into a plain vector.
    pub fn into_vec(self) -> Vec<T> {
        let mut values = Vec::with_capacity(1 + self.tail.len());
        values.push(self.head);
        values.extend(self.tail);
        values
    }
}

impl<T> IntoIterator for NonEmpty<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<E> From<Cause<E>> for NonEmpty<E> {
    /// Enumerate a cause's leaves in order. A cause always carries at least
    /// one error, which is what makes this conversion total.
    fn from(cause: Cause<E>) -> Self {
        let mut leaves = cause.into_vec().into_iter();
        let head = leaves
            .next()
            .expect("a cause always carries at least one error");
        NonEmpty {
            head,
            tail: leaves.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_empty_input() {
        assert_eq!(NonEmpty::<i32>::from_vec(Vec::new()), None);
        assert_eq!(
            NonEmpty::from_vec(vec![1, 2]),
            Some(NonEmpty::from_parts(1, vec![2]))
        );
    }

    #[test]
    fn iteration_preserves_order() {
        let mut list = NonEmpty::new("a");
        list.push("b");
        list.push("c");
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(list.into_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn cause_leaves_arrive_in_order() {
        let cause = Cause::then(
            Cause::single(1),
            Cause::both(Cause::single(2), Cause::single(3)),
        );
        let list = NonEmpty::from(cause);
        assert_eq!(*list.head(), 1);
        assert_eq!(list.tail(), &[2, 3]);
    }
}
