//! Anchors module - Section anchors inside documents
//!
//! Anchors are canonical slugs derived from header lines (`## 2.5 Setup`
//! -> `2-5-setup`) or taken from explicit `id="..."` attributes.

pub mod index;
pub mod normalize;
pub mod resolve;
