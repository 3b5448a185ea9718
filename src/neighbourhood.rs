/**
 * Ordered sequence of `(neighbour, edge)` pairs around one vertex.
 *
 * The order encodes the cyclic adjacency around the vertex, so `next` and
 * `prev` wrap around at the ends. Two positions are tracked alongside the
 * entries: the flagged position, and the cursor of an explicit external loop.
 * Both are kept pointing at the same entry when entries are inserted or
 * removed in front of them.
 */
#[derive(Clone, Debug)]
pub struct Neighbourhood<T, E> {
    entries: Vec<(T, E)>,
    flag: Option<usize>,
    cursor: usize,
}

impl<T, E> Default for Neighbourhood<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Neighbourhood<T, E> {
    pub fn new() -> Self {
        Neighbourhood {
            entries: Vec::new(),
            flag: None,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn neighbours(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(n, _)| n)
    }

    pub fn get(&self, i: usize) -> Option<&(T, E)> {
        self.entries.get(i)
    }

    pub fn front(&self) -> Option<&T> {
        self.entries.first().map(|(n, _)| n)
    }

    /// Index `k` steps after `i`, wrapping around.
    pub fn next_index(&self, i: usize, k: usize) -> usize {
        (i + k) % self.len()
    }

    /// Index `k` steps before `i`, wrapping around.
    pub fn prev_index(&self, i: usize, k: usize) -> usize {
        let n = self.len();
        (i + n - (k % n)) % n
    }

    pub fn edge(&self, i: usize) -> Option<&E> {
        self.entries.get(i).map(|(_, e)| e)
    }

    pub fn edge_mut(&mut self, i: usize) -> Option<&mut E> {
        self.entries.get_mut(i).map(|(_, e)| e)
    }

    pub fn flag_index(&self) -> Option<usize> {
        self.flag
    }

    pub fn flagged(&self) -> Option<&T> {
        self.flag.and_then(|i| self.entries.get(i)).map(|(n, _)| n)
    }

    pub fn clear_flag(&mut self) {
        self.flag = None;
    }

    /// Insert an entry at index `i`, shifting the flag and the loop cursor so
    /// they keep pointing at the same entries.
    pub fn insert_at(&mut self, i: usize, n: T, e: E) {
        self.entries.insert(i, (n, e));
        if let Some(f) = self.flag.as_mut() {
            if i <= *f {
                *f += 1;
            }
        }
        if i <= self.cursor {
            self.cursor += 1;
        }
    }

    pub fn push(&mut self, n: T, e: E) {
        let i = self.len();
        self.insert_at(i, n, e);
    }

    /// Remove the entry at index `i`.
    ///
    /// Removing the flagged entry clears the flag. Removing the entry under
    /// the loop cursor moves the cursor on to the following entry.
    pub fn remove_at(&mut self, i: usize) -> (T, E) {
        let removed = self.entries.remove(i);
        self.flag = match self.flag {
            Some(f) if f == i => None,
            Some(f) if f > i => Some(f - 1),
            other => other,
        };
        if i < self.cursor {
            self.cursor -= 1;
        }
        removed
    }

    /// Swap the neighbour at index `i`, keeping its edge value.
    pub fn replace_at(&mut self, i: usize, n: T) -> T {
        std::mem::replace(&mut self.entries[i].0, n)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.flag = None;
        self.cursor = 0;
    }

    pub fn assign(&mut self, entries: impl IntoIterator<Item = (T, E)>) {
        self.clear();
        self.entries.extend(entries);
    }

    /// Take all entries out, leaving this neighbourhood empty.
    pub fn take_entries(&mut self) -> Vec<(T, E)> {
        self.flag = None;
        self.cursor = 0;
        std::mem::take(&mut self.entries)
    }

    pub fn loop_start(&mut self) {
        self.cursor = 0;
    }

    pub fn loop_not_done(&self) -> bool {
        self.cursor < self.len()
    }

    pub fn loop_next(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor).map(|(n, _)| n)
    }
}

impl<T, E> Neighbourhood<T, E>
where
    T: PartialEq,
{
    /// Index of the first occurrence of `n`.
    pub fn find(&self, n: &T) -> Option<usize> {
        self.entries.iter().position(|(m, _)| m == n)
    }

    pub fn contains(&self, n: &T) -> bool {
        self.find(n).is_some()
    }

    pub fn flag(&mut self, n: &T) -> bool {
        match self.find(n) {
            Some(i) => {
                self.flag = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, n: &T) -> Option<(T, E)> {
        self.find(n).map(|i| self.remove_at(i))
    }

    /// Insert `n` right after `target`, or at the end if `target` is absent.
    pub fn splice_next(&mut self, target: &T, n: T, e: E) {
        match self.find(target) {
            Some(i) => self.insert_at(i + 1, n, e),
            None => self.push(n, e),
        }
    }

    /// Insert `n` right before `target`, or at the end if `target` is absent.
    pub fn splice_prev(&mut self, target: &T, n: T, e: E) {
        match self.find(target) {
            Some(i) => self.insert_at(i, n, e),
            None => self.push(n, e),
        }
    }
}
