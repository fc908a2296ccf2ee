pub mod kdtree2;
pub mod kdtree3;
pub mod median9;
pub mod qselect;
pub mod stats;

pub use kdtree2::KdTree2;
pub use kdtree3::KdTree3;
pub use median9::median_of_9;
pub use qselect::{qselect, qselect_median};
pub use stats::robust_location_scale;
