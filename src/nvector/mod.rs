//! Serial vectors.
//!
//! [`SerialVector`] is the vector container the nonlinear solver works on: a fixed-length,
//! contiguous array of `f64` with the handful of fused operations the Newton iteration and the
//! convergence tests need. Vectors never resize after creation.

use std::fmt;
use std::ops::{Index, IndexMut};

mod format;

pub use format::format_g;

/// Fixed-length serial vector of reals.
#[derive(Clone, Debug, PartialEq)]
pub struct SerialVector {
    data: Vec<f64>,
}

impl SerialVector {
    /// Allocate a zero-filled vector of length `len`.
    ///
    /// Returns `None` for an empty vector or when the storage cannot be reserved.
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, 0.0);
        Some(Self { data })
    }

    /// Allocate a vector holding a copy of `values`.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let mut v = Self::new(values.len())?;
        v.data.copy_from_slice(values);
        Some(v)
    }

    /// Allocate a zero-filled vector with the same length as `self`.
    ///
    /// Returns `None` when the storage cannot be reserved.
    pub fn clone_empty(&self) -> Option<Self> {
        Self::new(self.data.len())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw component access.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw component access.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Set every component to `c`.
    pub fn fill(&mut self, c: f64) {
        self.data.iter_mut().for_each(|zi| *zi = c);
    }

    /// z ← a·x + b·y
    pub fn linear_sum(&mut self, a: f64, x: &SerialVector, b: f64, y: &SerialVector) {
        assert_eq!(x.len(), self.len(), "Vectors must have the same length");
        assert_eq!(y.len(), self.len(), "Vectors must have the same length");
        for ((zi, &xi), &yi) in self.data.iter_mut().zip(&x.data).zip(&y.data) {
            *zi = a * xi + b * yi;
        }
    }

    /// z ← x .* y
    pub fn prod(&mut self, x: &SerialVector, y: &SerialVector) {
        assert_eq!(x.len(), self.len(), "Vectors must have the same length");
        assert_eq!(y.len(), self.len(), "Vectors must have the same length");
        for ((zi, &xi), &yi) in self.data.iter_mut().zip(&x.data).zip(&y.data) {
            *zi = xi * yi;
        }
    }

    /// z ← x ./ y
    pub fn div(&mut self, x: &SerialVector, y: &SerialVector) {
        assert_eq!(x.len(), self.len(), "Vectors must have the same length");
        assert_eq!(y.len(), self.len(), "Vectors must have the same length");
        for ((zi, &xi), &yi) in self.data.iter_mut().zip(&x.data).zip(&y.data) {
            *zi = xi / yi;
        }
    }

    /// z ← c·x
    pub fn scale(&mut self, c: f64, x: &SerialVector) {
        assert_eq!(x.len(), self.len(), "Vectors must have the same length");
        for (zi, &xi) in self.data.iter_mut().zip(&x.data) {
            *zi = c * xi;
        }
    }

    /// In-place z ← c·z
    pub fn scale_in_place(&mut self, c: f64) {
        self.data.iter_mut().for_each(|zi| *zi *= c);
    }

    pub fn dot(&self, other: &SerialVector) -> f64 {
        assert_eq!(other.len(), self.len(), "Vectors must have the same length");
        self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum()
    }

    /// max_i |x_i|
    pub fn max_norm(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
    }

    /// sqrt(sum_i (x_i w_i)^2)
    pub fn wl2_norm(&self, w: &SerialVector) -> f64 {
        assert_eq!(w.len(), self.len(), "Vectors must have the same length");
        self.data
            .iter()
            .zip(&w.data)
            .map(|(x, w)| (x * w) * (x * w))
            .sum::<f64>()
            .sqrt()
    }

    /// sum_i |x_i|
    pub fn l1_norm(&self) -> f64 {
        self.data.iter().map(|x| x.abs()).sum()
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Write the vector to standard output, one component per line.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl Index<usize> for SerialVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl IndexMut<usize> for SerialVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

impl AsRef<[f64]> for SerialVector {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

impl AsMut<[f64]> for SerialVector {
    fn as_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// Takes ownership of `data`; an empty vector is handed back as the error.
impl TryFrom<Vec<f64>> for SerialVector {
    type Error = Vec<f64>;

    fn try_from(data: Vec<f64>) -> Result<Self, Vec<f64>> {
        if data.is_empty() { Err(data) } else { Ok(Self { data }) }
    }
}

/// One `%19.16g` line per component, then a blank line.
impl fmt::Display for SerialVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in &self.data {
            writeln!(f, "{:>19}", format_g(*x, 16))?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn new_rejects_empty() {
        assert!(SerialVector::new(0).is_none());
        let v = SerialVector::new(3).unwrap();
        assert_eq!(v.data(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn fused_ops() {
        let x = SerialVector::from_slice(&[1.0, -2.0]).unwrap();
        let y = SerialVector::from_slice(&[3.0, 4.0]).unwrap();
        let mut z = x.clone_empty().unwrap();
        z.linear_sum(2.0, &x, -1.0, &y);
        assert_eq!(z.data(), &[-1.0, -8.0]);
        z.prod(&x, &y);
        assert_eq!(z.data(), &[3.0, -8.0]);
        z.div(&y, &x);
        assert_eq!(z.data(), &[3.0, -2.0]);
        assert_eq!(x.max_norm(), 2.0);
        assert_eq!(x.l1_norm(), 3.0);
        assert_eq!(x.min(), -2.0);
        assert_abs_diff_eq!(y.wl2_norm(&x), (9.0f64 + 64.0).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn owned_data_must_be_non_empty() {
        assert_eq!(SerialVector::try_from(Vec::new()), Err(Vec::new()));
        let v = SerialVector::try_from(vec![1.0, 2.0]).unwrap();
        assert_eq!(v.len(), 2);
        let e = v.clone_empty().unwrap();
        assert_eq!(e.data(), &[0.0, 0.0]);
    }

    #[test]
    fn display_matches_c_dump() {
        let v = SerialVector::from_slice(&[0.0, -1.5]).unwrap();
        let s = v.to_string();
        assert_eq!(s, format!("{:>19}\n{:>19}\n\n", "0", "-1.5"));
    }
}
