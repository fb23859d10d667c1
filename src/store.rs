use std::collections::HashMap;

/// Insertion-ordered record store. Creation is implicit and idempotent per
/// key; records are never removed, and iteration order is first-seen order.
pub struct RecordStore<R> {
    slots: HashMap<String, usize>,
    records: Vec<R>,
}

impl<R> RecordStore<R> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Fetch the record for `key`, creating it with `init` on first sight.
    pub fn get_or_create(&mut self, key: &str, init: impl FnOnce() -> R) -> &mut R {
        let idx = match self.slots.get(key) {
            Some(&i) => i,
            None => {
                self.records.push(init());
                let i = self.records.len() - 1;
                self.slots.insert(key.to_string(), i);
                i
            }
        };
        &mut self.records[idx]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the store, yielding records in first-seen order.
    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
