use crate::types::{BiomassError, BiomassResult, Quadrant};
use ndarray::{Array, ArrayBase, ArrayView, Axis, Data, Dimension, Slice};
use std::ops::Range;

/// Row and column ranges covered by a quadrant of an `height` x `width` grid.
///
/// The split point is `height / 2` and `width / 2`, so for odd dimensions the
/// top/left half is never larger than the bottom/right half.
pub fn quadrant_bounds(quadrant: Quadrant, height: usize, width: usize) -> (Range<usize>, Range<usize>) {
    let (half_h, half_w) = (height / 2, width / 2);

    match quadrant {
        Quadrant::Full => (0..height, 0..width),
        Quadrant::TopLeft => (0..half_h, 0..half_w),
        Quadrant::TopRight => (0..half_h, half_w..width),
        Quadrant::BottomLeft => (half_h..height, 0..half_w),
        Quadrant::BottomRight => (half_h..height, half_w..width),
    }
}

/// Crop the first two axes of a grid to the given quadrant.
///
/// Works for single-band grids (rows x cols) as well as visual composites
/// (rows x cols x channels). The result borrows from `array`; nothing is
/// copied until the caller asks for an owned grid.
pub fn crop_quadrant<A, S, D>(array: &ArrayBase<S, D>, quadrant: Quadrant) -> BiomassResult<ArrayView<'_, A, D>>
where
    S: Data<Elem = A>,
    D: Dimension,
{
    require_grid(array.ndim())?;

    let shape = array.shape();
    let (rows, cols) = quadrant_bounds(quadrant, shape[0], shape[1]);
    log::debug!(
        "Cropping {:?} to {} (rows {:?}, cols {:?})",
        shape, quadrant, rows, cols
    );

    let mut view = array.view();
    view.slice_axis_inplace(Axis(0), Slice::from(rows));
    view.slice_axis_inplace(Axis(1), Slice::from(cols));

    Ok(view)
}

/// Consume a grid and keep only the given quadrant.
///
/// `Quadrant::Full` hands the input back without copying; a quarter is copied
/// out and the full-size buffer is released.
pub fn into_quadrant<A, D>(array: Array<A, D>, quadrant: Quadrant) -> BiomassResult<Array<A, D>>
where
    A: Clone,
    D: Dimension,
{
    if quadrant == Quadrant::Full {
        require_grid(array.ndim())?;
        return Ok(array);
    }
    Ok(crop_quadrant(&array, quadrant)?.to_owned())
}

fn require_grid(ndim: usize) -> BiomassResult<()> {
    if ndim < 2 {
        return Err(BiomassError::InvalidArgument(format!(
            "Cannot crop a {}-dimensional array, at least 2 axes are required",
            ndim
        )));
    }
    Ok(())
}
