//! Exact nearest-neighbor search over an in-memory, append-only vector table.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
	/// Insertion position of the vector, which is also the chunk position in the corpus.
	pub position: usize,
	/// Squared Euclidean distance. Lower is closer.
	pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
	dim: usize,
	values: Vec<f32>,
}
impl FlatIndex {
	pub fn new(dim: usize) -> Result<Self> {
		if dim == 0 {
			return Err(Error::InvalidArgument("Index dimension must be greater than zero.".into()));
		}

		Ok(Self { dim, values: Vec::new() })
	}

	pub fn from_vectors(dim: usize, vectors: &[Vec<f32>]) -> Result<Self> {
		let mut index = Self::new(dim)?;

		index.values.reserve(dim * vectors.len());

		for vector in vectors {
			index.push(vector)?;
		}

		Ok(index)
	}

	/// Appends a vector and returns its position.
	pub fn push(&mut self, vector: &[f32]) -> Result<usize> {
		self.check_dim(vector)?;

		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::InvalidArgument("Vector values must be finite.".into()));
		}

		let position = self.len();

		self.values.extend_from_slice(vector);

		Ok(position)
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	pub fn len(&self) -> usize {
		self.values.len() / self.dim
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns the `k` closest vectors in ascending distance; ties keep insertion order.
	///
	/// `k` larger than the index is capped at the index size.
	pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
		self.check_dim(query)?;

		let mut neighbors: Vec<Neighbor> = self
			.values
			.chunks_exact(self.dim)
			.enumerate()
			.map(|(position, row)| Neighbor { position, distance: squared_l2(query, row) })
			.collect();

		neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
		neighbors.truncate(k);

		Ok(neighbors)
	}

	fn check_dim(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.dim {
			return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
		}

		Ok(())
	}
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn distance_is_squared_euclidean() {
		assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
	}
}
