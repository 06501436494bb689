//! A small bounded object cache, memoizing `content`-format reads for the lifetime of the handle
//! that owns it.
use git_hash::ObjectId;
use git_object::Kind;

const CAPACITY: usize = 1024;

#[derive(Debug, Default)]
pub(crate) struct ObjectCache {
    entries: std::collections::HashMap<ObjectId, (Kind, Vec<u8>)>,
    insertion_order: std::collections::VecDeque<ObjectId>,
}

impl ObjectCache {
    pub(crate) fn get(&self, id: &ObjectId) -> Option<(Kind, Vec<u8>)> {
        self.entries.get(id).cloned()
    }

    pub(crate) fn insert(&mut self, id: ObjectId, kind: Kind, bytes: Vec<u8>) {
        if !self.entries.contains_key(&id) {
            self.insertion_order.push_back(id);
            if self.insertion_order.len() > CAPACITY {
                if let Some(evicted) = self.insertion_order.pop_front() {
                    self.entries.remove(&evicted);
                }
            }
        }
        self.entries.insert(id, (kind, bytes));
    }
}
