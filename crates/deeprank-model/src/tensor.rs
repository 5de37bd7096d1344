//! Row-major tensor for scorer parameters and feature batches.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A multi-dimensional array of `f32` values in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    /// The shape of the tensor (dimensions).
    shape: Vec<usize>,
    /// The underlying data in row-major order.
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a tensor of the given shape filled with zeros.
    ///
    /// # Example
    ///
    /// ```
    /// use deeprank_model::tensor::Tensor;
    ///
    /// let t = Tensor::zeros(&[2, 3]);
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert_eq!(t.numel(), 6);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        let numel: usize = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data: vec![0.0; numel],
        }
    }

    /// Creates a tensor of the given shape filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        let numel: usize = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data: vec![1.0; numel],
        }
    }

    /// Creates a tensor with the given shape and data.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the shape.
    pub fn from_data(shape: &[usize], data: Vec<f32>) -> Self {
        let numel: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            numel,
            "Data length {} doesn't match shape {:?} (expected {})",
            data.len(),
            shape,
            numel
        );
        Self {
            shape: shape.to_vec(),
            data,
        }
    }

    /// Builds a `[rows, width]` batch tensor from a slice of equal-width
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Shape`] if rows differ in width or the slice is
    /// empty.
    pub fn from_rows(rows: &[Vec<f32>]) -> ModelResult<Self> {
        let Some(first) = rows.first() else {
            return Err(ModelError::Shape {
                message: "cannot build a batch from zero rows".into(),
            });
        };
        let width = first.len();
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in rows {
            if row.len() != width {
                return Err(ModelError::Shape {
                    message: format!("ragged batch: expected width {}, got {}", width, row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_data(&[rows.len(), width], data))
    }

    /// Creates a tensor with values drawn from a normal distribution using a
    /// seeded linear congruential generator and the Box-Muller transform.
    pub fn randn(shape: &[usize], mean: f32, std: f32, seed: u64) -> Self {
        let numel: usize = shape.iter().product();
        let mut state: u64 = if seed == 0 { 42 } else { seed };
        let mut uniform = move || {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            ((state >> 16) & 0x7fff) as f32 / 32768.0
        };
        let data: Vec<f32> = (0..numel)
            .map(|_| {
                let u1 = uniform() + 1e-10;
                let u2 = uniform();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                z * std + mean
            })
            .collect();
        Self {
            shape: shape.to_vec(),
            data,
        }
    }

    /// Returns the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns a mutable reference to the underlying data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns row `i` of a 2-D tensor.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is not 2-D or the row is out of bounds.
    pub fn row(&self, i: usize) -> &[f32] {
        assert_eq!(self.ndim(), 2, "row access requires a 2D tensor");
        let width = self.shape[1];
        &self.data[i * width..(i + 1) * width]
    }

    /// Applies a function element-wise.
    pub fn map<F>(&self, f: F) -> Tensor
    where
        F: Fn(f32) -> f32,
    {
        let data: Vec<f32> = self.data.iter().map(|&x| f(x)).collect();
        Tensor::from_data(&self.shape, data)
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Scales every element by a scalar.
    pub fn scale(&self, scalar: f32) -> Tensor {
        self.map(|x| x * scalar)
    }

    /// Fills the tensor with zeros in place.
    pub fn fill_zero(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_creation() {
        let t = Tensor::zeros(&[2, 3]);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.numel(), 6);
        assert!(t.data().iter().all(|&x| x == 0.0));

        let t = Tensor::ones(&[3, 2]);
        assert!(t.data().iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let t = Tensor::from_rows(&rows).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            Tensor::from_rows(&rows),
            Err(ModelError::Shape { .. })
        ));
    }

    #[test]
    fn test_from_rows_empty() {
        assert!(Tensor::from_rows(&[]).is_err());
    }

    #[test]
    fn test_randn_seed_determinism() {
        let a = Tensor::randn(&[16], 0.0, 0.01, 7);
        let b = Tensor::randn(&[16], 0.0, 0.01, 7);
        let c = Tensor::randn(&[16], 0.0, 0.01, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_randn_scale() {
        let t = Tensor::randn(&[1000], 0.0, 1e-4, 1024);
        assert!(t.data().iter().all(|x| x.abs() < 0.01));
    }

    #[test]
    fn test_map_and_sum() {
        let t = Tensor::from_data(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(t.map(|x| x * 2.0).data(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(t.sum(), 10.0);
        assert_eq!(t.scale(0.5).sum(), 5.0);
    }

    #[test]
    fn test_fill_zero() {
        let mut t = Tensor::ones(&[4]);
        t.fill_zero();
        assert_eq!(t.sum(), 0.0);
    }
}
