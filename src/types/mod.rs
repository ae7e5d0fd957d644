pub mod bounds;
pub mod packed;

pub use bounds::BoundBox;
pub use packed::{PackedFloat3, PackedUint3};
