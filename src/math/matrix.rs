use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::error::{NnError, Result};

/// Dense 2-D `f64` matrix.
///
/// Samples are column vectors; a batch is a matrix whose columns are samples.
/// Every binary operation checks shapes and returns `ShapeMismatch` instead of
/// broadcasting, the one exception being `add_column_broadcast` for biases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Builds a matrix from rows. Rejects an empty or ragged row set.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map(|r| r.len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(NnError::shape("Matrix::from_data", (1, 1), (rows, cols)));
        }
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(NnError::shape("Matrix::from_data (ragged row)", (rows, cols), (rows, bad.len())));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// An n×1 column vector.
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Places n×1 columns side by side into an n×k batch.
    pub fn from_columns(columns: &[Matrix]) -> Result<Matrix> {
        let first = columns
            .first()
            .ok_or_else(|| NnError::shape("Matrix::from_columns", (1, 1), (0, 0)))?;
        let rows = first.rows;
        let mut res = Matrix::zeros(rows, columns.len());
        for (j, col) in columns.iter().enumerate() {
            if col.shape() != (rows, 1) {
                return Err(NnError::shape("Matrix::from_columns", (rows, 1), col.shape()));
            }
            for i in 0..rows {
                res.data[i][j] = col.data[i][0];
            }
        }
        Ok(res)
    }

    pub fn column_at(&self, j: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[j]).collect()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    pub(crate) fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // (0, 1] keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Xavier-style initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// Shape: (rows, cols). `cols` is the fan-in, so weights shrink as
    /// 1/sqrt(fan_in) and sigmoid units start away from saturation.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (1.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    /// Matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NnError::shape("Matrix::dot", (self.cols, rhs.cols), rhs.shape()));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        Ok(res)
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "Matrix::add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "Matrix::sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "Matrix::hadamard", |a, b| a * b)
    }

    /// Adds an n×1 column to every column of an n×k matrix.
    pub fn add_column_broadcast(&self, column: &Matrix) -> Result<Matrix> {
        if column.shape() != (self.rows, 1) {
            return Err(NnError::shape("Matrix::add_column_broadcast", (self.rows, 1), column.shape()));
        }
        let mut res = self.clone();
        for (row, bias) in res.data.iter_mut().zip(column.data.iter()) {
            for x in row.iter_mut() {
                *x += bias[0];
            }
        }
        Ok(res)
    }

    /// Sums each row across the columns, giving an n×1 column.
    pub fn row_sums(&self) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: 1,
            data: self.data.iter().map(|row| vec![row.iter().sum()]).collect(),
        }
    }

    /// Index of the maximum entry in every column.
    pub fn argmax_columns(&self) -> Vec<usize> {
        (0..self.cols)
            .map(|j| {
                (0..self.rows)
                    .max_by(|&a, &b| {
                        self.data[a][j]
                            .partial_cmp(&self.data[b][j])
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(0)
            })
            .collect()
    }

    fn zip_with<F>(&self, rhs: &Matrix, context: &str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != rhs.shape() {
            return Err(NnError::shape(context, self.shape(), rhs.shape()));
        }
        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&x, &y)| f(x, y)).collect()
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }
}
