//! Symbolic shape descriptors and the compatibility predicate.

use std::fmt;
use std::iter::zip;

use smallvec::SmallVec;

/// Size of one dimension of a tensor shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim {
    /// A dimension whose size is fixed at graph construction time.
    Known(usize),

    /// A wildcard dimension whose size is only determined at execution time.
    Unknown,
}

impl Dim {
    /// Return the fixed size of this dimension, or `None` for a wildcard.
    pub fn size(self) -> Option<usize> {
        match self {
            Dim::Known(size) => Some(size),
            Dim::Unknown => None,
        }
    }
}

impl From<usize> for Dim {
    fn from(size: usize) -> Dim {
        Dim::Known(size)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(size) => write!(f, "{}", size),
            Dim::Unknown => write!(f, "?"),
        }
    }
}

/// An ordered sequence of dimension sizes describing one tensor.
///
/// A shape's length is fixed once constructed and its entries are never
/// mutated in place; shape inference always produces new descriptors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    dims: SmallVec<[Dim; 5]>,
}

impl Shape {
    pub fn new(dims: impl IntoIterator<Item = Dim>) -> Shape {
        Shape {
            dims: dims.into_iter().collect(),
        }
    }

    /// Shape with every size fixed.
    pub fn known(sizes: &[usize]) -> Shape {
        sizes.iter().copied().map(Dim::Known).collect()
    }

    /// Shape with `ndim` wildcard dimensions.
    pub fn unknown(ndim: usize) -> Shape {
        std::iter::repeat(Dim::Unknown).take(ndim).collect()
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn iter(&self) -> impl Iterator<Item = Dim> + '_ {
        self.dims.iter().copied()
    }

    /// Test whether two shapes are compatible.
    ///
    /// Shapes are compatible if they have the same number of dimensions and
    /// no position holds two different known sizes. A wildcard is compatible
    /// with any size on the other side, since it stands for a size that will
    /// only be available at execution time.
    pub fn compatible_with(&self, other: &Shape) -> bool {
        self.ndim() == other.ndim()
            && zip(self.iter(), other.iter()).all(|(a, b)| match (a, b) {
                (Dim::Known(a), Dim::Known(b)) => a == b,
                _ => true,
            })
    }
}

impl FromIterator<Dim> for Shape {
    fn from_iter<I: IntoIterator<Item = Dim>>(iter: I) -> Shape {
        Shape {
            dims: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, ")")
    }
}

/// Construct a [`Shape`] from a list of sizes, with `_` for a wildcard.
///
/// ```
/// use shapeflow::{shape, Dim};
///
/// let s = shape![2, _, 4];
/// assert_eq!(s.dims(), &[Dim::Known(2), Dim::Unknown, Dim::Known(4)]);
/// ```
#[macro_export]
macro_rules! shape {
    (@dim _) => {
        $crate::Dim::Unknown
    };
    (@dim $size:expr) => {
        $crate::Dim::Known($size)
    };
    ($($dim:tt),+ $(,)?) => {
        $crate::Shape::new([$($crate::shape!(@dim $dim)),+])
    };
}

/// Resolved input shape of a layer: one descriptor per input.
///
/// Layers taking a single input carry a [`Signature::Single`]; layers that
/// combine several inputs carry one descriptor per input in
/// [`Signature::Multi`]. The two variants are structurally distinct so that
/// call sites can tell a single descriptor from a list of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    Single(Shape),
    Multi(Vec<Shape>),
}

impl Signature {
    /// Structural check distinguishing a list of descriptors from a single
    /// descriptor.
    pub fn is_multi(&self) -> bool {
        matches!(self, Signature::Multi(_))
    }

    /// Number of inputs this signature describes.
    pub fn num_inputs(&self) -> usize {
        match self {
            Signature::Single(_) => 1,
            Signature::Multi(shapes) => shapes.len(),
        }
    }

    pub fn as_single(&self) -> Option<&Shape> {
        match self {
            Signature::Single(shape) => Some(shape),
            Signature::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&[Shape]> {
        match self {
            Signature::Single(_) => None,
            Signature::Multi(shapes) => Some(shapes),
        }
    }
}

impl From<Shape> for Signature {
    fn from(shape: Shape) -> Signature {
        Signature::Single(shape)
    }
}

impl From<Vec<Shape>> for Signature {
    fn from(shapes: Vec<Shape>) -> Signature {
        Signature::Multi(shapes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Single(shape) => write!(f, "{}", shape),
            Signature::Multi(shapes) => {
                write!(f, "[")?;
                for (i, shape) in shapes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", shape)?;
                }
                write!(f, "]")
            }
        }
    }
}
