use ndarray::{ArrayBase, Dimension, RawData};

/// The view a layer configuration needs of a parameter tensor.
///
/// Contents are never inspected, only the shape is queried when
/// checking whether two layers may share a parameter.
pub trait Tensor {
    /// Returns the dimensions of the tensor, outermost first.
    fn shape(&self) -> &[usize];

    /// Returns the total amount of elements in the tensor.
    fn count(&self) -> usize {
        self.shape().iter().product()
    }
}

impl<S, D> Tensor for ArrayBase<S, D>
where
    S: RawData,
    D: Dimension,
{
    fn shape(&self) -> &[usize] {
        ArrayBase::shape(self)
    }

    fn count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, ArrayD, IxDyn};

    use super::*;

    #[test]
    fn shape_and_count_of_fixed_rank_array() {
        let t = Array2::<f32>::zeros((3, 4));
        assert_eq!(Tensor::shape(&t), &[3, 4]);
        assert_eq!(Tensor::count(&t), 12);
    }

    #[test]
    fn shape_and_count_of_dynamic_array() {
        let t = ArrayD::<f32>::zeros(IxDyn(&[2, 3, 5]));
        assert_eq!(Tensor::shape(&t), &[2, 3, 5]);
        assert_eq!(Tensor::count(&t), 30);
    }
}
