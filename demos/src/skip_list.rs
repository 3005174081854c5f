//! [`SkipList`] is an insert-only sorted set readable without locks.

use std::fmt::{self, Debug};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Mutex, PoisonError};

use atomic_pointer::{AtomicPointer, PointerCell};
use rand::Rng;

const MAX_HEIGHT: usize = 12;
const BRANCHING: u32 = 4;

struct Node<K> {
    key: K,
    /// `next[level]` links the node to its successor at `level`.
    next: Box<[AtomicPointer<Node<K>>]>,
}

type Links<K> = [AtomicPointer<Node<K>>];

/// [`SkipList`] is a sorted set that never removes keys.
///
/// Writers are serialized by an internal lock, while readers never block: a node is fully built,
/// links included, before it is published through a release store, and readers follow links
/// with acquire loads. Nodes are freed only when the [`SkipList`] is dropped.
pub struct SkipList<K> {
    head: [AtomicPointer<Node<K>>; MAX_HEIGHT],
    height: AtomicUsize,
    len: AtomicUsize,
    writer: Mutex<()>,
    _marker: PhantomData<*const K>,
}

/// An iterator over the keys of a [`SkipList`] in ascending order.
pub struct Iter<'l, K> {
    next: Option<&'l Node<K>>,
}

impl<K: Ord> SkipList<K> {
    /// Inserts a key.
    ///
    /// Returns `false` if the key was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer_demos::SkipList;
    ///
    /// let list: SkipList<u32> = SkipList::default();
    /// assert!(list.insert(3));
    /// assert!(!list.insert(3));
    /// ```
    pub fn insert(&self, key: K) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut prev: [&Links<K>; MAX_HEIGHT] = [&self.head[..]; MAX_HEIGHT];
        if let Some(node) = self.find_greater_or_equal(&key, Some(&mut prev)) {
            if node.key == key {
                return false;
            }
        }

        let height = random_height();
        let current_height = self.height.load(Relaxed);
        if height > current_height {
            // Readers seeing the new height before the node find null links in `head` and move
            // down a level.
            self.height.store(height, Relaxed);
        }

        let node = Box::new(Node {
            key,
            next: (0..height).map(|_| AtomicPointer::null()).collect(),
        });
        for (level, links) in prev.iter().enumerate().take(height) {
            node.next[level].no_barrier_store(links[level].no_barrier_load());
        }
        let node = Box::into_raw(node);
        for (level, links) in prev.iter().enumerate().take(height) {
            links[level].release_store(node);
        }
        self.len.fetch_add(1, Relaxed);
        true
    }

    /// Returns `true` if the key is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer_demos::SkipList;
    ///
    /// let list: SkipList<&str> = SkipList::default();
    /// list.insert("leveldb");
    /// assert!(list.contains(&"leveldb"));
    /// assert!(!list.contains(&"rocksdb"));
    /// ```
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.find_greater_or_equal(key, None)
            .map_or(false, |node| node.key == *key)
    }

    /// Returns the first key not less than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer_demos::SkipList;
    ///
    /// let list: SkipList<u64> = SkipList::default();
    /// list.insert(10);
    /// list.insert(20);
    /// assert_eq!(list.lower_bound(&11), Some(&20));
    /// assert_eq!(list.lower_bound(&21), None);
    /// ```
    #[must_use]
    pub fn lower_bound(&self, key: &K) -> Option<&K> {
        self.find_greater_or_equal(key, None).map(|node| &node.key)
    }

    /// Returns the first node whose key is not less than `key`, recording in `prev` the links
    /// that were followed at each level.
    fn find_greater_or_equal<'l>(
        &'l self,
        key: &K,
        mut prev: Option<&mut [&'l Links<K>; MAX_HEIGHT]>,
    ) -> Option<&'l Node<K>> {
        let mut links: &Links<K> = &self.head;
        let mut level = self.height.load(Relaxed) - 1;
        loop {
            let next = next_node(links, level);
            match next {
                Some(node) if node.key < *key => links = &node.next,
                _ => {
                    if let Some(prev) = prev.as_deref_mut() {
                        prev[level] = links;
                    }
                    if level == 0 {
                        return next;
                    }
                    level -= 1;
                }
            }
        }
    }
}

impl<K> SkipList<K> {
    /// Returns the number of keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer_demos::SkipList;
    ///
    /// let list: SkipList<char> = SkipList::default();
    /// list.insert('a');
    /// assert_eq!(list.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Relaxed)
    }

    /// Returns `true` if the [`SkipList`] has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the keys in ascending order.
    ///
    /// Keys inserted while the iterator is in use may or may not be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use atomic_pointer_demos::SkipList;
    ///
    /// let list: SkipList<i32> = SkipList::default();
    /// for key in [3, 1, 2] {
    ///     list.insert(key);
    /// }
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            next: next_node(&self.head, 0),
        }
    }
}

fn next_node<K>(links: &Links<K>, level: usize) -> Option<&Node<K>> {
    unsafe { links[level].acquire_load().as_ref() }
}

fn random_height() -> usize {
    let mut rng = rand::rng();
    let mut height = 1;
    while height < MAX_HEIGHT && rng.random_ratio(1, BRANCHING) {
        height += 1;
    }
    height
}

impl<K: Debug> Debug for SkipList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Default for SkipList<K> {
    fn default() -> Self {
        Self {
            head: [(); MAX_HEIGHT].map(|()| AtomicPointer::null()),
            height: AtomicUsize::new(1),
            len: AtomicUsize::new(0),
            writer: Mutex::default(),
            _marker: PhantomData,
        }
    }
}

impl<K> Drop for SkipList<K> {
    fn drop(&mut self) {
        let mut next = *self.head[0].get_mut();
        while !next.is_null() {
            let node = unsafe { Box::from_raw(next) };
            next = node.next[0].no_barrier_load();
        }
    }
}

unsafe impl<K: Send> Send for SkipList<K> {}

unsafe impl<K: Send + Sync> Sync for SkipList<K> {}

impl<'l, K> Iterator for Iter<'l, K> {
    type Item = &'l K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = next_node(&node.next, 0);
        Some(&node.key)
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

impl<'l, K> IntoIterator for &'l SkipList<K> {
    type Item = &'l K;
    type IntoIter = Iter<'l, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
