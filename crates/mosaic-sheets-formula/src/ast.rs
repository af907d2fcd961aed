//! Formula Abstract Syntax Tree types

use mosaic_sheets_core::{CellAddress, CellError};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),
    /// Error literal
    Error(CellError),
    /// Single cell reference
    CellRef(CellAddress),
    /// Unary minus
    Negate(Box<FormulaExpr>),
    /// Function call, name upper-cased
    Function { name: String, args: Vec<FormulaExpr> },
}
