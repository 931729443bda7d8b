use rayon::prelude::*;

/// Flat row-major storage for fixed-width records.
///
/// All rows live in one contiguous allocation instead of one heap allocation
/// per row. Rows are addressed by index and handed out as slices, which keeps
/// random access cheap and lets rows be filled in parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatArena<T> {
    items: Vec<T>,
    width: usize,
}

impl<T> FlatArena<T> {
    /// Build an arena from already laid-out items.
    ///
    /// Returns `None` if `items.len()` is not a multiple of `width`, or if
    /// `width` is zero while items are present.
    pub fn from_items(items: Vec<T>, width: usize) -> Option<Self> {
        if width == 0 {
            return items.is_empty().then_some(Self { items, width });
        }
        (items.len() % width == 0).then_some(Self { items, width })
    }

    /// Number of items in each row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.items.len() / self.width
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Access a row by index.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&[T]> {
        if index >= self.rows() {
            return None;
        }
        let start = index * self.width;
        Some(&self.items[start..start + self.width])
    }

    /// Mutably access a row by index.
    #[inline]
    pub fn row_mut(&mut self, index: usize) -> Option<&mut [T]> {
        if index >= self.rows() {
            return None;
        }
        let start = index * self.width;
        Some(&mut self.items[start..start + self.width])
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        // chunks_exact panics on 0, and a zero-width arena has no rows anyway
        self.items.chunks_exact(self.width.max(1))
    }

    /// All items, row after row.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> FlatArena<T> {
    /// Allocate `rows × width` items, each initialized to `fill`.
    pub fn allocate(rows: usize, width: usize, fill: T) -> Self {
        let len = if width == 0 { 0 } else { rows * width };
        Self {
            items: vec![fill; len],
            width,
        }
    }
}

impl<T: Sync> FlatArena<T> {
    /// Parallel iterator over rows.
    pub fn par_iter_rows(&self) -> rayon::slice::ChunksExact<'_, T> {
        self.items.par_chunks_exact(self.width.max(1))
    }
}

impl<T: Send> FlatArena<T> {
    /// Parallel iterator over mutable rows.
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, T> {
        self.items.par_chunks_exact_mut(self.width.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_shape() {
        let arena = FlatArena::allocate(4, 3, 0u8);
        assert_eq!(arena.rows(), 4);
        assert_eq!(arena.width(), 3);
        assert_eq!(arena.items().len(), 12);
    }

    #[test]
    fn test_row_access() {
        let arena = FlatArena::from_items((0..6).collect::<Vec<u32>>(), 2).unwrap();
        assert_eq!(arena.row(0), Some(&[0, 1][..]));
        assert_eq!(arena.row(2), Some(&[4, 5][..]));
        assert_eq!(arena.row(3), None);
    }

    #[test]
    fn test_row_mut() {
        let mut arena = FlatArena::allocate(2, 2, 0u32);
        arena.row_mut(1).unwrap()[0] = 9;
        assert_eq!(arena.items(), &[0, 0, 9, 0]);
    }

    #[test]
    fn test_from_items_rejects_ragged() {
        assert!(FlatArena::from_items(vec![1, 2, 3], 2).is_none());
        assert!(FlatArena::from_items(vec![1], 0).is_none());
        assert!(FlatArena::<u8>::from_items(Vec::new(), 0).is_some());
    }

    #[test]
    fn test_zero_width_has_no_rows() {
        let arena = FlatArena::allocate(5, 0, 1u8);
        assert_eq!(arena.rows(), 0);
        assert_eq!(arena.iter_rows().count(), 0);
    }

    #[test]
    fn test_par_rows_mut() {
        let mut arena = FlatArena::allocate(8, 2, 0usize);
        arena
            .par_rows_mut()
            .enumerate()
            .for_each(|(i, row)| row.iter_mut().for_each(|x| *x = i));
        let rows: Vec<_> = arena.iter_rows().map(|r| r[0]).collect();
        assert_eq!(rows, (0..8).collect::<Vec<_>>());
    }
}
