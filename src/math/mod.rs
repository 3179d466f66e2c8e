//! Mathematical utilities shared by the augmentation operators

/// RGB and HSV conversion in the 8-bit hue convention
pub mod color;
/// Probability validation and squashing functions
pub mod probability;
/// Conversions between image buffers and floating point planes
pub mod raster;
/// Parameter ranges sampled per operator invocation
pub mod sampling;
