//! Filesystem collaborators, configuration and the command-line driver

/// Sprite archive staging
pub mod archive;
/// Command-line interface and the dataset builder
pub mod cli;
/// Run constants and configuration
pub mod configuration;
/// Item folder discovery and output layout
pub mod dataset;
/// Error types and path context
pub mod error;
/// Source image loading and variant writing
pub mod image;
/// Logging setup
pub mod logging;
/// Progress bars
pub mod progress;
