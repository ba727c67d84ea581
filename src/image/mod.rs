//! Image buffers, validated paths and file I/O.
pub mod cell;
pub mod f64;
pub mod io;
pub mod path;
pub mod traits;
pub mod u8;

pub use self::cell::{read_img, CellImage};
pub use self::f64::ImageF64;
pub use self::io::GrayImageU8;
pub use self::path::ImagePath;
pub use self::traits::{ImageView, ImageViewMut};
pub use self::u8::ImageU8;
