//! Report-ready summaries for the external document renderer.

mod compiler;

pub use compiler::ReportCompiler;
