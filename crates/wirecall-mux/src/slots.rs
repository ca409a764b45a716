use wirecall_proto::CallError;

/// Fused decoder-plus-completion closure stored per slot. Receives the raw
/// result bytes on success or the already-mapped error on failure.
pub(crate) type Completion = Box<dyn FnMut(Result<&[u8], CallError>)>;

pub(crate) struct PendingRequest {
    pub handler: Completion,
    pub is_push: bool,
}

/// Indexed store of in-flight requests with compact, reused integer ids.
///
/// `next_free` always points at the lowest free index (or one past the end
/// when the table is full), so allocation is lowest-free-first and ids stay
/// small. `live` mirrors the number of occupied entries.
pub(crate) struct SlotTable {
    entries: Vec<Option<PendingRequest>>,
    next_free: usize,
    live: usize,
}

impl SlotTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_free: 0,
            live: 0,
        }
    }

    pub fn insert(&mut self, entry: PendingRequest) -> u64 {
        let id = self.next_free;
        if id == self.entries.len() {
            self.entries.push(Some(entry));
            self.next_free = id + 1;
        } else {
            self.entries[id] = Some(entry);
            // Everything below the cursor is occupied, so the next free
            // index can only be above the one just filled.
            self.next_free = self.scan_free_from(id + 1);
        }
        self.live += 1;
        id as u64
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut PendingRequest> {
        self.entries.get_mut(id as usize)?.as_mut()
    }

    pub fn remove(&mut self, id: u64) -> Option<PendingRequest> {
        let index = id as usize;
        let entry = self.entries.get_mut(index)?.take()?;
        self.live -= 1;
        if index < self.next_free {
            self.next_free = index;
        }
        Some(entry)
    }

    /// Take every live entry, leaving the table empty.
    pub fn drain(&mut self) -> Vec<PendingRequest> {
        let drained: Vec<_> = self.entries.drain(..).flatten().collect();
        self.next_free = 0;
        self.live = 0;
        drained
    }

    pub fn live(&self) -> usize {
        self.live
    }

    fn scan_free_from(&self, from: usize) -> usize {
        (from..self.entries.len())
            .find(|&i| self.entries[i].is_none())
            .unwrap_or(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> PendingRequest {
        PendingRequest {
            handler: Box::new(|_| {}),
            is_push: false,
        }
    }

    #[test]
    fn ids_are_reused_lowest_first() {
        let mut table = SlotTable::new();
        assert_eq!(table.insert(entry()), 0);
        assert_eq!(table.insert(entry()), 1);
        assert_eq!(table.insert(entry()), 2);
        assert_eq!(table.live(), 3);

        assert!(table.remove(1).is_some());
        assert_eq!(table.live(), 2);
        assert_eq!(table.insert(entry()), 1);
        assert_eq!(table.live(), 3);

        assert!(table.remove(0).is_some());
        assert!(table.remove(2).is_some());
        assert_eq!(table.live(), 1);
        assert_eq!(table.insert(entry()), 0);
        assert_eq!(table.insert(entry()), 2);
        assert_eq!(table.live(), 3);
    }

    #[test]
    fn remove_unknown_id_is_none() {
        let mut table = SlotTable::new();
        assert!(table.remove(0).is_none());
        table.insert(entry());
        assert!(table.remove(5).is_none());
        assert_eq!(table.live(), 1);
    }

    #[test]
    fn double_remove_is_none() {
        let mut table = SlotTable::new();
        let id = table.insert(entry());
        assert!(table.remove(id).is_some());
        assert!(table.remove(id).is_none());
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn drain_clears_and_resets() {
        let mut table = SlotTable::new();
        table.insert(entry());
        table.insert(entry());
        table.insert(entry());
        table.remove(1);

        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(table.live(), 0);
        assert_eq!(table.insert(entry()), 0);
    }
}
