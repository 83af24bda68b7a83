//! Intensity inversion.
//!
//! `bool` planes are negated; unsigned integer planes are mirrored within
//! their full range (`MAX - v`). Float planes have no fixed range and are
//! rejected.

use log::debug;

use crate::error::{Result, TransformError};
use crate::image::{represent_as_image, AsPlane, Image, PlaneView};

/// Invert a plane.
///
/// Applying it twice gives back the input.
///
/// # Errors
/// `TypeContract` for `float32` and `float64` planes.
pub fn invert<P: AsPlane + ?Sized>(input: &P) -> Result<Image> {
    let view = input.as_plane();
    debug!("invert: dtype={} shape={:?}", view.dtype(), view.shape());

    match view {
        PlaneView::Bool(a) => Ok(represent_as_image(a.mapv(|v| !v))),
        PlaneView::U8(a) => Ok(represent_as_image(a.mapv(|v| u8::MAX - v))),
        PlaneView::U16(a) => Ok(represent_as_image(a.mapv(|v| u16::MAX - v))),
        other => Err(TransformError::type_contract(
            "invert",
            "bool or unsigned integer",
            other.dtype(),
        )),
    }
}
