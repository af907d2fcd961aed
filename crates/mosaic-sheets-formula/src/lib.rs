//! # mosaic-sheets-formula
//!
//! The selector formulas of a mosaic workbook.
//!
//! This crate provides:
//! - [`select`] - the 1-based lookup a selector formula performs
//! - [`choose_formula`] - building `=CHOOSE($CN$53,...)` text
//! - Formula parsing (text → AST) and evaluation (AST → value), so a
//!   workbook can be displayed for any selector value
//!
//! ## Example
//!
//! ```rust
//! use mosaic_sheets_core::CellAddress;
//! use mosaic_sheets_formula::{choose_formula, evaluate, parse_formula, EvaluationContext, FormulaValue};
//!
//! let selector = CellAddress::parse("CN53").unwrap();
//! let text = choose_formula(selector, &[0u8, 8, 16]);
//!
//! let ast = parse_formula(&text).unwrap();
//! let ctx = EvaluationContext::simple().with_override(selector, FormulaValue::Number(3.0));
//! assert_eq!(evaluate(&ast, &ctx).unwrap(), FormulaValue::Number(16.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
mod select;

pub use ast::FormulaExpr;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EvaluationContext, FormulaValue};
pub use parser::parse_formula;
pub use select::{choose_formula, select};
