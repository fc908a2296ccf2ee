pub mod mask;
pub mod median3x3;

pub use mask::{create_mask, gather_median, median_filter_mask_parallel, median_filter_sparse};
pub use median3x3::median_filter_3x3;
