//! PPTX template backend for the corrective-action deck generator.
//!
//! A .pptx file is a ZIP package of XML parts. This crate opens the
//! template package into memory, rewrites slide parts (stripping the
//! pre-authored shapes and splicing in report content), keeps the
//! presentation-level bookkeeping consistent (slide list, relationships,
//! content types), and serializes the finished deck back to bytes.

pub mod builder;
pub mod package;
pub mod presentation;
pub mod shapes;
pub mod slide;
mod xml;

pub use builder::{GeneratedReport, ReportBuilder};
pub use package::PptxPackage;
