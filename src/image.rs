//! Typed image containers and the array-like input contract.
//!
//! ## Element Types
//!
//! | DType | Rust | Description |
//! |-------|------|-------------|
//! | Bool | `bool` | Binary masks |
//! | U8 | `u8` | 8-bit intensities, 0-255 |
//! | U16 | `u16` | 16-bit intensities, 0-65535 |
//! | F32 | `f32` | Float intensities |
//! | F64 | `f64` | Float intensities |
//!
//! Planes are `(height, width)`; stacks are `(height, width, depth)`.
//!
//! Transforms never take a concrete container. They are generic over
//! [`AsPlane`] / [`AsStack`], which are implemented for [`Image`], [`Stack`],
//! their borrowed views and plain ndarray arrays of any [`Element`], so a raw
//! array and an already wrapped image can be passed interchangeably.

use std::fmt;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::{Result, TransformError};

/// Element type tag of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    U8,
    U16,
    F32,
    F64,
}

impl DType {
    /// numpy-style name of the element type.
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    pub fn is_unsigned_int(self) -> bool {
        matches!(self, DType::U8 | DType::U16)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrow a plane as `T`, or fail with a type-contract violation.
pub(crate) fn require_dtype<'a, T: Element>(
    operation: &'static str,
    view: PlaneView<'a>,
) -> Result<ArrayView2<'a, T>> {
    T::from_plane_view(view)
        .ok_or_else(|| TransformError::type_contract(operation, T::DTYPE.name(), view.dtype()))
}

mod sealed {
    pub trait Sealed {}
}

/// Scalar types that can be stored in an [`Image`] or [`Stack`].
///
/// Sealed: the set of element types is closed so every transform can
/// dispatch exhaustively on [`DType`].
pub trait Element: sealed::Sealed + Copy + PartialOrd + fmt::Debug + Send + Sync + 'static {
    const DTYPE: DType;

    fn to_f64(self) -> f64;

    /// Convert a computed value back to this type.
    ///
    /// Integers round to nearest with ties toward zero and saturate,
    /// `bool` is `value > 0.5`, floats are cast.
    fn from_f64(value: f64) -> Self;

    fn into_image(array: Array2<Self>) -> Image;

    fn into_stack(array: Array3<Self>) -> Stack;

    fn plane_view(view: ArrayView2<'_, Self>) -> PlaneView<'_>;

    fn stack_view(view: ArrayView3<'_, Self>) -> StackView<'_>;

    /// Borrow a plane as this element type, `None` if the dtype differs.
    fn from_plane_view(view: PlaneView<'_>) -> Option<ArrayView2<'_, Self>>;
}

/// Nearest integer, ties resolved toward zero (`1.5 -> 1`, `2.7 -> 3`).
fn round_half_toward_zero(value: f64) -> f64 {
    (value.abs() - 0.5).ceil().max(0.0).copysign(value)
}

macro_rules! impl_element_common {
    ($t:ty, $variant:ident) => {
        fn into_image(array: Array2<Self>) -> Image {
            Image::$variant(array)
        }

        fn into_stack(array: Array3<Self>) -> Stack {
            Stack::$variant(array)
        }

        fn plane_view(view: ArrayView2<'_, Self>) -> PlaneView<'_> {
            PlaneView::$variant(view)
        }

        fn stack_view(view: ArrayView3<'_, Self>) -> StackView<'_> {
            StackView::$variant(view)
        }

        fn from_plane_view(view: PlaneView<'_>) -> Option<ArrayView2<'_, Self>> {
            match view {
                PlaneView::$variant(a) => Some(a),
                _ => None,
            }
        }
    };
}

macro_rules! impl_int_element {
    ($t:ty, $variant:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                round_half_toward_zero(value).clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
            }

            impl_element_common!($t, $variant);
        }
    };
}

macro_rules! impl_float_element {
    ($t:ty, $variant:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            impl_element_common!($t, $variant);
        }
    };
}

impl_int_element!(u8, U8);
impl_int_element!(u16, U16);
impl_float_element!(f32, F32);
impl_float_element!(f64, F64);

impl sealed::Sealed for bool {}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn from_f64(value: f64) -> Self {
        value > 0.5
    }

    impl_element_common!(bool, Bool);
}

/// Run `$body` with `$a` bound to the typed `ArrayView2` inside a [`PlaneView`].
macro_rules! dispatch_plane {
    ($view:expr, $a:ident => $body:expr) => {
        match $view {
            $crate::image::PlaneView::Bool($a) => $body,
            $crate::image::PlaneView::U8($a) => $body,
            $crate::image::PlaneView::U16($a) => $body,
            $crate::image::PlaneView::F32($a) => $body,
            $crate::image::PlaneView::F64($a) => $body,
        }
    };
}

/// Run `$body` with `$a` bound to the typed `ArrayView3` inside a [`StackView`].
macro_rules! dispatch_stack {
    ($view:expr, $a:ident => $body:expr) => {
        match $view {
            $crate::image::StackView::Bool($a) => $body,
            $crate::image::StackView::U8($a) => $body,
            $crate::image::StackView::U16($a) => $body,
            $crate::image::StackView::F32($a) => $body,
            $crate::image::StackView::F64($a) => $body,
        }
    };
}

pub(crate) use dispatch_plane;
pub(crate) use dispatch_stack;

/// A single 2D plane, owned, tagged with its element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    Bool(Array2<bool>),
    U8(Array2<u8>),
    U16(Array2<u16>),
    F32(Array2<f32>),
    F64(Array2<f64>),
}

/// Wrap a freshly computed array as an [`Image`].
///
/// Every transform returns through this function.
pub fn represent_as_image<T: Element>(array: Array2<T>) -> Image {
    T::into_image(array)
}

impl Image {
    pub fn view(&self) -> PlaneView<'_> {
        match self {
            Image::Bool(a) => PlaneView::Bool(a.view()),
            Image::U8(a) => PlaneView::U8(a.view()),
            Image::U16(a) => PlaneView::U16(a.view()),
            Image::F32(a) => PlaneView::F32(a.view()),
            Image::F64(a) => PlaneView::F64(a.view()),
        }
    }

    pub fn dtype(&self) -> DType {
        self.view().dtype()
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        self.view().shape()
    }

    pub fn len(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the pixels as `T`, `None` if the dtype differs.
    pub fn as_array<T: Element>(&self) -> Option<ArrayView2<'_, T>> {
        T::from_plane_view(self.view())
    }

    pub fn as_bool(&self) -> Option<&Array2<bool>> {
        match self {
            Image::Bool(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<&Array2<u8>> {
        match self {
            Image::U8(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&Array2<u16>> {
        match self {
            Image::U16(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&Array2<f32>> {
        match self {
            Image::F32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&Array2<f64>> {
        match self {
            Image::F64(a) => Some(a),
            _ => None,
        }
    }

    /// Pixel values widened to `f64` without rescaling.
    pub fn to_f64(&self) -> Array2<f64> {
        self.view().to_f64()
    }
}

impl<T: Element> From<Array2<T>> for Image {
    fn from(array: Array2<T>) -> Self {
        represent_as_image(array)
    }
}

impl<T: Element> PartialEq<Array2<T>> for Image {
    fn eq(&self, other: &Array2<T>) -> bool {
        self.as_array::<T>()
            .is_some_and(|view| view == other.view())
    }
}

impl<T: Element> PartialEq<Image> for Array2<T> {
    fn eq(&self, other: &Image) -> bool {
        other == self
    }
}

/// Borrowed, dtype-tagged 2D plane.
#[derive(Debug, Clone, Copy)]
pub enum PlaneView<'a> {
    Bool(ArrayView2<'a, bool>),
    U8(ArrayView2<'a, u8>),
    U16(ArrayView2<'a, u16>),
    F32(ArrayView2<'a, f32>),
    F64(ArrayView2<'a, f64>),
}

impl PlaneView<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            PlaneView::Bool(_) => DType::Bool,
            PlaneView::U8(_) => DType::U8,
            PlaneView::U16(_) => DType::U16,
            PlaneView::F32(_) => DType::F32,
            PlaneView::F64(_) => DType::F64,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        dispatch_plane!(self, a => a.dim())
    }

    pub fn to_owned(&self) -> Image {
        dispatch_plane!(self, a => represent_as_image(a.to_owned()))
    }

    pub fn to_f64(&self) -> Array2<f64> {
        dispatch_plane!(self, a => a.mapv(|v| v.to_f64()))
    }
}

/// Anything that can be read as a 2D plane.
pub trait AsPlane {
    fn as_plane(&self) -> PlaneView<'_>;
}

impl AsPlane for Image {
    fn as_plane(&self) -> PlaneView<'_> {
        self.view()
    }
}

impl AsPlane for PlaneView<'_> {
    // Reborrow: the view is invariant in its lifetime
    fn as_plane(&self) -> PlaneView<'_> {
        dispatch_plane!(self, a => Element::plane_view(a.view()))
    }
}

impl<T: Element> AsPlane for Array2<T> {
    fn as_plane(&self) -> PlaneView<'_> {
        T::plane_view(self.view())
    }
}

impl<T: Element> AsPlane for ArrayView2<'_, T> {
    fn as_plane(&self) -> PlaneView<'_> {
        T::plane_view(self.view())
    }
}

impl<P: AsPlane + ?Sized> AsPlane for &P {
    fn as_plane(&self) -> PlaneView<'_> {
        (**self).as_plane()
    }
}

/// An ordered sequence of same-shaped planes along the last (depth) axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Stack {
    Bool(Array3<bool>),
    U8(Array3<u8>),
    U16(Array3<u16>),
    F32(Array3<f32>),
    F64(Array3<f64>),
}

impl Stack {
    /// Stack planes along a new depth axis.
    ///
    /// All planes must share dtype and shape.
    pub fn from_planes(planes: &[Image]) -> Result<Stack> {
        let first = planes.first().ok_or(TransformError::EmptyStack)?;
        let (dtype, shape) = (first.dtype(), first.shape());

        for plane in planes {
            if plane.dtype() != dtype {
                return Err(TransformError::type_contract(
                    "Stack::from_planes",
                    dtype.name(),
                    plane.dtype(),
                ));
            }
            if plane.shape() != shape {
                return Err(TransformError::ShapeMismatch {
                    expected: shape,
                    found: plane.shape(),
                });
            }
        }

        match dtype {
            DType::Bool => stack_planes::<bool>(planes),
            DType::U8 => stack_planes::<u8>(planes),
            DType::U16 => stack_planes::<u16>(planes),
            DType::F32 => stack_planes::<f32>(planes),
            DType::F64 => stack_planes::<f64>(planes),
        }
    }

    pub fn view(&self) -> StackView<'_> {
        match self {
            Stack::Bool(a) => StackView::Bool(a.view()),
            Stack::U8(a) => StackView::U8(a.view()),
            Stack::U16(a) => StackView::U16(a.view()),
            Stack::F32(a) => StackView::F32(a.view()),
            Stack::F64(a) => StackView::F64(a.view()),
        }
    }

    pub fn dtype(&self) -> DType {
        self.view().dtype()
    }

    /// `(height, width, depth)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.view().shape()
    }

    pub fn depth(&self) -> usize {
        self.shape().2
    }
}

fn stack_planes<T: Element>(planes: &[Image]) -> Result<Stack> {
    let views = planes
        .iter()
        .map(|plane| {
            plane.as_array::<T>().ok_or_else(|| {
                TransformError::type_contract("Stack::from_planes", T::DTYPE.name(), plane.dtype())
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let stacked = ndarray::stack(Axis(2), &views)?;
    Ok(T::into_stack(stacked))
}

impl<T: Element> From<Array3<T>> for Stack {
    fn from(array: Array3<T>) -> Self {
        T::into_stack(array)
    }
}

/// Borrowed, dtype-tagged 3D stack.
#[derive(Debug, Clone, Copy)]
pub enum StackView<'a> {
    Bool(ArrayView3<'a, bool>),
    U8(ArrayView3<'a, u8>),
    U16(ArrayView3<'a, u16>),
    F32(ArrayView3<'a, f32>),
    F64(ArrayView3<'a, f64>),
}

impl StackView<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            StackView::Bool(_) => DType::Bool,
            StackView::U8(_) => DType::U8,
            StackView::U16(_) => DType::U16,
            StackView::F32(_) => DType::F32,
            StackView::F64(_) => DType::F64,
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        dispatch_stack!(self, a => a.dim())
    }
}

/// Anything that can be read as a 3D stack.
pub trait AsStack {
    fn as_stack(&self) -> StackView<'_>;
}

impl AsStack for Stack {
    fn as_stack(&self) -> StackView<'_> {
        self.view()
    }
}

impl AsStack for StackView<'_> {
    fn as_stack(&self) -> StackView<'_> {
        dispatch_stack!(self, a => Element::stack_view(a.view()))
    }
}

impl<T: Element> AsStack for Array3<T> {
    fn as_stack(&self) -> StackView<'_> {
        T::stack_view(self.view())
    }
}

impl<T: Element> AsStack for ArrayView3<'_, T> {
    fn as_stack(&self) -> StackView<'_> {
        T::stack_view(self.view())
    }
}

impl<S: AsStack + ?Sized> AsStack for &S {
    fn as_stack(&self) -> StackView<'_> {
        (**self).as_stack()
    }
}
