use serde::{Deserialize, Serialize};

/// Dense row-major matrix. Rows are dimension A terms, columns the other axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    n_rows: usize,
    n_cols: usize,
    values: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub fn filled(n_rows: usize, n_cols: usize, value: T) -> Self {
        Self { n_rows, n_cols, values: vec![value; n_rows * n_cols] }
    }
}

impl<T> Matrix<T> {
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.n_rows && col < self.n_cols {
            self.values.get(row * self.n_cols + col)
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.n_rows && col < self.n_cols, "matrix index out of bounds");
        self.values[row * self.n_cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.values[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &T> + '_ {
        self.values.iter().skip(col).step_by(self.n_cols.max(1))
    }

    pub fn map<U>(&self, f: impl Fn(usize, usize, &T) -> U) -> Matrix<U> {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(idx, v)| f(idx / self.n_cols, idx % self.n_cols, v))
            .collect();
        Matrix { n_rows: self.n_rows, n_cols: self.n_cols, values }
    }
}

impl<T: Copy> Matrix<Option<T>> {
    /// The matrix with every cell filled, or `None` if any cell is missing.
    pub fn complete(&self) -> Option<Matrix<T>> {
        let values = self.values.iter().copied().collect::<Option<Vec<T>>>()?;
        Some(Matrix { n_rows: self.n_rows, n_cols: self.n_cols, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_columns() {
        let mut m = Matrix::filled(2, 3, 0u64);
        m.set(0, 2, 5);
        m.set(1, 0, 7);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.row(0), &[0, 0, 5]);
        assert_eq!(m.column(0).copied().collect::<Vec<_>>(), vec![0, 7]);
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn test_complete_requires_every_cell() {
        let mut m: Matrix<Option<u64>> = Matrix::filled(1, 2, None);
        m.set(0, 0, Some(1));
        assert!(m.complete().is_none());
        m.set(0, 1, Some(2));
        assert_eq!(m.complete().unwrap().row(0), &[1, 2]);
    }
}
