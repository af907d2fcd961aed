//! Formula evaluator
//!
//! Evaluates formula ASTs against a worksheet. Cell values can be
//! overridden per evaluation, which is how a different selector value is
//! tried without touching the sheet.

use std::collections::HashMap;

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::functions;
use mosaic_sheets_core::{CellAddress, CellError, CellValue, Worksheet};

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Error(CellError),
    Empty,
}

impl FormulaValue {
    /// Convert to number, if possible (empty counts as 0)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::String(s) => s.trim().parse().ok(),
            FormulaValue::Empty => Some(0.0),
            FormulaValue::Error(_) => None,
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, FormulaValue::Error(_))
    }

    /// Get the error if this is one
    pub fn get_error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<&CellValue> for FormulaValue {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => FormulaValue::Empty,
            CellValue::Number(n) => FormulaValue::Number(*n),
            CellValue::String(s) => FormulaValue::String(s.clone()),
            CellValue::Error(e) => FormulaValue::Error(*e),
            CellValue::Formula { cached_value, .. } => cached_value
                .map(FormulaValue::Number)
                .unwrap_or(FormulaValue::Empty),
        }
    }
}

/// Context for formula evaluation
#[derive(Debug, Default)]
pub struct EvaluationContext<'a> {
    /// Worksheet that references resolve against
    pub worksheet: Option<&'a Worksheet>,
    /// Values that take precedence over the worksheet's own
    overrides: HashMap<(u32, u16), FormulaValue>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context that reads cells from `worksheet`
    pub fn new(worksheet: &'a Worksheet) -> Self {
        Self {
            worksheet: Some(worksheet),
            overrides: HashMap::new(),
        }
    }

    /// Create a simple context without a worksheet; every reference is empty
    pub fn simple() -> Self {
        Self::default()
    }

    /// Pretend `address` holds `value` during evaluation
    pub fn with_override(mut self, address: CellAddress, value: FormulaValue) -> Self {
        self.overrides.insert((address.row, address.col), value);
        self
    }

    /// Get a cell value, honouring overrides
    ///
    /// Formula cells yield their cached value; they are not re-evaluated.
    pub fn get_cell_value(&self, row: u32, col: u16) -> FormulaValue {
        if let Some(value) = self.overrides.get(&(row, col)) {
            return value.clone();
        }
        match self.worksheet.and_then(|ws| ws.value_ref_at(row, col)) {
            Some(value) => value.into(),
            None => FormulaValue::Empty,
        }
    }
}

/// Evaluate a formula AST
///
/// Spreadsheet-level failures (bad CHOOSE index, unknown function, negated
/// text) come back as [`FormulaValue::Error`], the way a spreadsheet
/// shows them in the cell.
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::Error(e) => Ok(FormulaValue::Error(*e)),
        FormulaExpr::CellRef(addr) => Ok(ctx.get_cell_value(addr.row, addr.col)),

        FormulaExpr::Negate(operand) => {
            let value = evaluate(operand, ctx)?;
            Ok(numeric(&value, |n| FormulaValue::Number(-n)))
        }

        FormulaExpr::Function { name, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<FormulaResult<Vec<_>>>()?;
            Ok(functions::call(name, &values))
        }
    }
}

/// Apply `f` to the numeric form of `value`, propagating errors and
/// reporting non-numbers as `#VALUE!`
fn numeric<F>(value: &FormulaValue, f: F) -> FormulaValue
where
    F: FnOnce(f64) -> FormulaValue,
{
    if let Some(e) = value.get_error() {
        return FormulaValue::Error(e);
    }
    match value.as_number() {
        Some(n) => f(n),
        None => FormulaValue::Error(CellError::Value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;

    fn eval(formula: &str, ctx: &EvaluationContext) -> FormulaValue {
        evaluate(&parse_formula(formula).unwrap(), ctx).unwrap()
    }

    #[test]
    fn test_negation() {
        let ctx = EvaluationContext::simple();
        assert_eq!(eval("=-8", &ctx), FormulaValue::Number(-8.0));
        assert_eq!(eval("=--8", &ctx), FormulaValue::Number(8.0));
        assert_eq!(eval("=-CHOOSE(2,8,16)", &ctx), FormulaValue::Number(-16.0));
    }

    #[test]
    fn test_references_and_overrides() {
        let mut ws = Worksheet::new("Sheet");
        ws.set_cell_value("A1", 5.0).unwrap();
        ws.set_cell_value("A2", CellValue::formula_with_cached("=A1*2", 10.0))
            .unwrap();

        let ctx = EvaluationContext::new(&ws);
        assert_eq!(eval("=A1", &ctx), FormulaValue::Number(5.0));
        assert_eq!(eval("=A2", &ctx), FormulaValue::Number(10.0));
        assert_eq!(eval("=B9", &ctx), FormulaValue::Empty);

        let ctx = EvaluationContext::new(&ws)
            .with_override(CellAddress::new(0, 0), FormulaValue::Number(7.0));
        assert_eq!(eval("=$A$1", &ctx), FormulaValue::Number(7.0));
    }

    #[test]
    fn test_errors_propagate() {
        let ctx = EvaluationContext::simple();
        assert_eq!(eval("=-#N/A", &ctx), FormulaValue::Error(CellError::Na));
        assert_eq!(eval("=NOSUCH(1)", &ctx), FormulaValue::Error(CellError::Name));
    }

    #[test]
    fn test_text_is_not_a_number() {
        let mut ws = Worksheet::new("Sheet");
        ws.set_cell_value("A1", "abc").unwrap();
        let ctx = EvaluationContext::new(&ws);
        assert_eq!(eval("=-A1", &ctx), FormulaValue::Error(CellError::Value));
    }
}
