//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `pdf_optimizer`: Orchestratore principale (batch e modalità singola)
//! - `task_optimizer`: Worker per singoli file

pub mod pdf_optimizer;
pub mod task_optimizer;

pub use pdf_optimizer::{PathRun, PdfOptimizer};
pub use task_optimizer::{JobOutcome, SizeChange, TaskOptimizer};
