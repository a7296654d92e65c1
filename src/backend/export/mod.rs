//! Export Module
//!
//! PDF export of a project.
//!
//! ```text
//! export/
//! ├── mod.rs      - Module exports
//! ├── layout.rs   - Pure page layout
//! ├── render.rs   - printpdf rendering
//! └── handlers.rs - HTTP handler
//! ```

/// Page layout
pub mod layout;

/// PDF rendering
pub mod render;

/// HTTP handler
pub mod handlers;

pub use handlers::export_pdf;
