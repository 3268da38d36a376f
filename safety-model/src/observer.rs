use serde::Deserialize;
use serde::Serialize;

/// Callback invoked synchronously on the owner task. Must not block.
pub type Observer<T> = Box<dyn FnMut(&T) + Send>;

/// Handle returned by [`ObserverList::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(u64);

/// Ordered list of observers.
///
/// Observers are notified in registration order. Removal is idempotent.
pub struct ObserverList<T> {
    next_id: u64,
    entries: Vec<(ObserverId, Observer<T>)>,
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, observer: Observer<T>) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    /// Registers `observer`, first replaying `current` to it so no change can
    /// fall between subscribing and the next notification.
    pub fn add_with_replay(
        &mut self,
        mut observer: Observer<T>,
        current: Option<&T>,
    ) -> ObserverId {
        if let Some(value) = current {
            observer(value);
        }
        self.add(observer)
    }

    /// Returns whether an observer was removed.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, value: &T) {
        for (_, observer) in &mut self.entries {
            observer(value);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.entries.len())
            .finish()
    }
}
