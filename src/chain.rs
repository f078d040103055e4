//! Singly linked chains of owned entries, one per bucket.
//!
//! A bucket slot owns its head entry and every entry owns its successor.
//! New entries go to the head, so a chain reads in reverse insertion
//! order. Unlinking hands the removed node back to the caller instead of
//! dropping it in place.

type Link<K, V> = Option<Box<Entry<K, V>>>;

pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Computed once at insertion; rehash never calls `K: Hash` again.
    pub(crate) hash: u64,
    next: Link<K, V>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn boxed(key: K, value: V, hash: u64) -> Box<Self> {
        Box::new(Entry {
            key,
            value,
            hash,
            next: None,
        })
    }

    pub(crate) fn into_pair(self: Box<Self>) -> (K, V) {
        let Entry { key, value, .. } = *self;
        (key, value)
    }
}

pub(crate) struct Chain<K, V> {
    head: Link<K, V>,
}

/// Advance `cur` until it points at the first link whose entry satisfies
/// `pred`, or at the trailing `None`.
fn seek<'a, K, V, F>(mut cur: &'a mut Link<K, V>, pred: &mut F) -> &'a mut Link<K, V>
where
    F: FnMut(&Entry<K, V>) -> bool,
{
    while cur.as_deref().is_some_and(|node| !pred(node)) {
        if let Some(node) = cur {
            cur = &mut node.next;
        }
    }
    cur
}

impl<K, V> Chain<K, V> {
    pub(crate) const fn new() -> Self {
        Chain { head: None }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn push_front(&mut self, mut node: Box<Entry<K, V>>) {
        node.next = self.head.take();
        self.head = Some(node);
    }

    pub(crate) fn pop_front(&mut self) -> Option<Box<Entry<K, V>>> {
        let mut node = self.head.take()?;
        self.head = node.next.take();
        Some(node)
    }

    pub(crate) fn iter(&self) -> ChainIter<'_, K, V> {
        ChainIter {
            next: self.head.as_deref(),
        }
    }

    pub(crate) fn find<F>(&self, pred: F) -> Option<&Entry<K, V>>
    where
        F: FnMut(&&Entry<K, V>) -> bool,
    {
        self.iter().find(pred)
    }

    pub(crate) fn find_mut<F>(&mut self, mut pred: F) -> Option<&mut Entry<K, V>>
    where
        F: FnMut(&Entry<K, V>) -> bool,
    {
        let mut cur = self.head.as_deref_mut();
        while let Some(node) = cur {
            if pred(&*node) {
                return Some(node);
            }
            cur = node.next.as_deref_mut();
        }
        None
    }

    /// Unlink the first entry matching `pred`, relinking its neighbours.
    pub(crate) fn unlink_first<F>(&mut self, mut pred: F) -> Option<Box<Entry<K, V>>>
    where
        F: FnMut(&Entry<K, V>) -> bool,
    {
        let cur = seek(&mut self.head, &mut pred);
        let mut node = cur.take()?;
        *cur = node.next.take();
        Some(node)
    }

    /// Unlink every entry matching `pred` in one pass, pushing the removed
    /// pairs onto `out`. `live` is decremented as each node leaves the
    /// chain, so it stays exact if `pred` panics partway.
    pub(crate) fn unlink_all<F>(&mut self, mut pred: F, out: &mut Vec<(K, V)>, live: &mut usize)
    where
        F: FnMut(&Entry<K, V>) -> bool,
    {
        let mut cur = &mut self.head;
        loop {
            cur = seek(cur, &mut pred);
            match cur.take() {
                Some(mut node) => {
                    *cur = node.next.take();
                    *live -= 1;
                    out.push(node.into_pair());
                }
                None => return,
            }
        }
    }
}

impl<K, V> Default for Chain<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// Iterative so a single very long chain cannot overflow the stack.
impl<K, V> Drop for Chain<K, V> {
    fn drop(&mut self) {
        let mut cur = self.head.take();
        while let Some(mut node) = cur {
            cur = node.next.take();
        }
    }
}

/// Head-to-tail iterator over one chain.
pub(crate) struct ChainIter<'a, K, V> {
    next: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(node)
    }
}
