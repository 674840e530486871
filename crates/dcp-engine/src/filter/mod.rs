//! Sliding-window filters on the working grid.
//!
//! Both the windowed minimum and the box mean are separable: a 2D window is
//! a horizontal pass followed by a vertical pass. The vertical pass is run
//! as a horizontal pass over the transposed image, so every pass works on
//! contiguous rows and tiles cleanly across the worker pool.

mod box_filter;
mod dark_channel;
mod guided;

pub use box_filter::{box_mean, box_mean_line};
pub use dark_channel::{sliding_min_line, DarkChannelFilter};
pub use guided::{GuidedFilter, GuidedScratch};

use crate::pool::WorkerPool;

/// Copy `src` (`height` rows of `width`) into `dst` as `width` rows of
/// `height`.
pub(crate) fn transpose<T>(pool: &WorkerPool, src: &[T], width: usize, height: usize, dst: &mut [T])
where
    T: Copy + Send + Sync,
{
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(dst.len(), width * height);
    pool.for_each_row(dst, height, |x, column| {
        for (y, v) in column.iter_mut().enumerate() {
            *v = src[y * width + x];
        }
    });
}

/// Apply the 1D `line_op` along rows, then along columns, in place.
///
/// `line_op(src_line, dst_line)` must fill `dst_line` from `src_line`; the
/// two always have equal length. `tmp` is scratch space of the image size.
pub(crate) fn separable<T, F>(
    pool: &WorkerPool,
    data: &mut [T],
    width: usize,
    height: usize,
    tmp: &mut [T],
    line_op: F,
) where
    T: Copy + Send + Sync,
    F: Fn(&[T], &mut [T]) + Send + Sync,
{
    debug_assert_eq!(data.len(), width * height);
    debug_assert_eq!(tmp.len(), width * height);
    {
        let src = &*data;
        pool.for_each_row(tmp, width, |y, row| line_op(&src[y * width..][..width], row));
    }
    transpose(pool, tmp, width, height, data);
    {
        let src = &*data;
        pool.for_each_row(tmp, height, |x, column| {
            line_op(&src[x * height..][..height], column)
        });
    }
    transpose(pool, tmp, height, width, data);
}
