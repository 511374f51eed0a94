/// Lazy cartesian product over a list of value sets.
///
/// The first set varies slowest, the last set fastest, so the output follows
/// positional order. An empty list of sets yields a single empty combination;
/// any empty set yields nothing.
#[derive(Debug, Clone)]
pub struct Product<T> {
    sets: Vec<Vec<T>>,
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> Product<T> {
    pub fn new(sets: Vec<Vec<T>>) -> Self {
        let done = sets.iter().any(|set| set.is_empty());
        let indices = vec![0; sets.len()];
        Self {
            sets,
            indices,
            done,
        }
    }

    /// Total number of combinations, saturating at `u128::MAX`.
    pub fn len_hint(&self) -> u128 {
        self.sets
            .iter()
            .fold(1u128, |acc, set| acc.saturating_mul(set.len() as u128))
    }

    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.sets[position].len() {
                return;
            }
            self.indices[position] = 0;
        }
        self.done = true;
    }
}

impl<T: Clone> Iterator for Product<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item: Vec<T> = self
            .indices
            .iter()
            .zip(&self.sets)
            .map(|(&idx, set)| set[idx].clone())
            .collect();

        self.advance();
        Some(item)
    }
}

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
    fn positional_order() {
        let product = Product::new(vec![vec![1, 2], vec![10, 20, 30]]);
        let all: Vec<Vec<i32>> = product.collect();
        assert_eq!(
            all,
            vec![
                vec![1, 10],
                vec![1, 20],
                vec![1, 30],
                vec![2, 10],
                vec![2, 20],
                vec![2, 30],
            ]
        );
    }

    #[test]
    fn empty_set_yields_nothing() {
        let mut product = Product::new(vec![vec![1], Vec::<i32>::new()]);
        assert_eq!(product.next(), None);
    }

    #[test]
    fn no_sets_yields_one_empty_combination() {
        let all: Vec<Vec<u8>> = Product::new(Vec::new()).collect();
        assert_eq!(all, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn len_hint_multiplies() {
        let product = Product::new(vec![vec!['a', 'b'], vec!['c', 'd', 'e']]);
        assert_eq!(product.len_hint(), 6);
    }
}
