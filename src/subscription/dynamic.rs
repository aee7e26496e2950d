use smallvec::SmallVec;

use super::Subscription;

/// Items tracked by a numeric id, e.g. the observers registered on a subject.
///
/// Backed by a `SmallVec`, so zero to two entries need no heap allocation.
/// Ids are never reused.
///
/// ```rust
/// use rxflow::subscription::DynamicSubscriptions;
///
/// let mut subs: DynamicSubscriptions<()> = DynamicSubscriptions::default();
/// let first = subs.add(());
/// let _second = subs.add(());
/// assert!(subs.remove(first).is_some());
/// assert!(subs.remove(first).is_none());
/// assert_eq!(subs.len(), 1);
/// ```
pub struct DynamicSubscriptions<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for DynamicSubscriptions<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> DynamicSubscriptions<U> {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Add an item and return its id.
  #[inline]
  pub fn add(&mut self, item: U) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, item));
    id
  }

  /// Remove an item by id.
  pub fn remove(&mut self, id: usize) -> Option<U> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Remove and yield every item.
  #[inline]
  pub fn drain(&mut self) -> impl Iterator<Item = U> + '_ {
    self.items.drain(..).map(|(_, item)| item)
  }

  /// Iterate over `(id, item)` pairs in insertion order.
  #[inline]
  pub fn entries(&self) -> impl Iterator<Item = (usize, &U)> {
    self.items.iter().map(|(id, item)| (*id, item))
  }
}

impl<U: Subscription> DynamicSubscriptions<U> {
  /// Cancel every item and empty the container.
  pub fn unsubscribe_all(&mut self) {
    for item in self.drain() {
      item.unsubscribe();
    }
  }
}
