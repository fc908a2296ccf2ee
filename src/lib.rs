pub mod align;
pub mod background;
pub mod consts;
pub mod detection;
pub mod error;
pub mod filters;
pub mod frame;
pub mod numeric;

pub use error::{CoreError, Result};
pub use frame::{Frame, FrameStats, Star};
