//! # tutor-markdown
//!
//! Markdown/LaTeX reconciliation for a math-tutoring chat client.
//!
//! - [`core::spacing`] reflows bot replies so list and LaTeX blocks are
//!   separated by blank lines before they reach a Markdown+math renderer.
//! - [`core::export`] converts rendered HTML back into Markdown without
//!   mangling math, code, or tables.
//! - [`core::display`] prepares conversation messages for display through an
//!   injected [`core::render::MathRenderer`].

pub mod core;
