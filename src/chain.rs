//! Singly linked list holding the entries of one bucket of a `ChainedMap`

use std::{borrow::Borrow, fmt};

/// A list node owning the rest of the chain
struct Node<K, V> {
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
    /// The node after this one
    next: Option<Box<Node<K, V>>>,
}

/// A bucket's entries in insertion order
pub(crate) struct Chain<K, V> {
    /// First node, if any
    head: Option<Box<Node<K, V>>>,
    /// Number of nodes
    len: usize,
}

impl<K, V> Chain<K, V> {
    /// Creates an empty chain
    pub(crate) const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Returns the number of entries
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the chain holds no entries
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends an entry at the tail without checking for an existing key
    pub(crate) fn push_back(&mut self, key: K, value: V) {
        let mut link = &mut self.head;
        while let Some(node) = link {
            link = &mut node.next;
        }
        *link = Some(Box::new(Node { key, value, next: None }));
        self.len = self.len.saturating_add(1);
    }

    /// Detaches the first entry
    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        let mut node = self.head.take()?;
        self.head = node.next.take();
        self.len = self.len.saturating_sub(1);
        Some((node.key, node.value))
    }

    /// Returns an iterator over the entries, head first
    pub(crate) fn iter(&self) -> ChainIter<'_, K, V> {
        ChainIter { next: self.head.as_deref() }
    }

    /// Returns the value stored under `key`
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            if node.key.borrow() == key {
                return Some(&node.value);
            }
            cursor = node.next.as_deref();
        }
        None
    }

    /// Returns a mutable reference to the value stored under `key`
    pub(crate) fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut cursor = self.head.as_deref_mut();
        while let Some(node) = cursor {
            if node.key.borrow() == key {
                return Some(&mut node.value);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    /// Unlinks the entry stored under `key`
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut link = &mut self.head;
        while link.as_ref().is_some_and(|node| node.key.borrow() != key) {
            link = &mut link.as_mut()?.next;
        }

        let mut node = link.take()?;
        *link = node.next.take();
        self.len = self.len.saturating_sub(1);
        Some((node.key, node.value))
    }
}

impl<K, V> Default for Chain<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for Chain<K, V> {
    fn clone(&self) -> Self {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Chain<K, V> {
    /// Builds a chain in iteration order, appending through a tail cursor
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut chain = Self::new();
        let mut tail = &mut chain.head;
        for (key, value) in iter {
            let node = tail.insert(Box::new(Node { key, value, next: None }));
            tail = &mut node.next;
            chain.len = chain.len.saturating_add(1);
        }
        chain
    }
}

impl<K, V> Drop for Chain<K, V> {
    // Unlink node by node; the default drop recurses once per node.
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Chain<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over the entries of a [`Chain`]
pub(crate) struct ChainIter<'a, K, V> {
    /// Node to yield next
    next: Option<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some((&node.key, &node.value))
    }
}
