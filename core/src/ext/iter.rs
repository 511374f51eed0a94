use std::collections::HashMap;
use std::hash::Hash;

pub trait IteratorExt: Iterator + Sized {
    /// Maps every item to `f(item)`, keyed by the item. Later duplicates
    /// overwrite earlier ones.
    fn map_hash<V, F>(self, mut f: F) -> HashMap<Self::Item, V>
    where
        Self::Item: Eq + Hash,
        F: FnMut(&Self::Item) -> V,
    {
        self.map(|item| {
            let value = f(&item);
            (item, value)
        })
        .collect()
    }

    /// Counts items per `key(item)`.
    fn count_by<K, F>(self, mut key: F) -> HashMap<K, usize>
    where
        K: Eq + Hash,
        F: FnMut(&Self::Item) -> K,
    {
        let mut counts = HashMap::new();
        for item in self {
            *counts.entry(key(&item)).or_insert(0) += 1;
        }
        counts
    }
}

impl<I: Iterator> IteratorExt for I {}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_hash() {
        let lengths = ["a", "bb", "ccc"].into_iter().map_hash(|s| s.len());
        assert_eq!(lengths.len(), 3);
        assert_eq!(lengths["bb"], 2);
    }

    #[test]
    fn count_by() {
        let counts = [1, 2, 3, 4, 5, 6, 7].into_iter().count_by(|n| n % 3);
        assert_eq!(counts[&0], 2);
        assert_eq!(counts[&1], 3);
        assert_eq!(counts[&2], 2);
    }
}
