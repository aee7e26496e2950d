use super::{ReplayBuffer, Subject, SubjectState};

/// Replay policy holding back the last value until completion.
pub struct LastOnComplete<Item>(Option<Item>);

impl<Item: Clone + Send + 'static> ReplayBuffer<Item> for LastOnComplete<Item> {
  #[inline]
  fn record(&mut self, value: &Item) { self.0 = Some(value.clone()); }

  fn replay(&self, state: SubjectState) -> Vec<Item> {
    match state {
      SubjectState::Completed => self.0.iter().cloned().collect(),
      SubjectState::Active | SubjectState::Erred => Vec::new(),
    }
  }

  #[inline]
  fn forwards_live(&self) -> bool { false }
}

/// Emits exactly the last value, and only on completion. An error
/// suppresses the value entirely.
pub type AsyncSubject<Item, Err> = Subject<Item, Err, LastOnComplete<Item>>;

impl<Item, Err> Subject<Item, Err, LastOnComplete<Item>> {
  pub fn new() -> Self { Self::with_buffer(LastOnComplete(None)) }
}

impl<Item, Err> Default for Subject<Item, Err, LastOnComplete<Item>> {
  fn default() -> Self { Self::new() }
}
