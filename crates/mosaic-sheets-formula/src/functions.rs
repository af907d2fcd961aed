//! Built-in functions

use crate::evaluator::FormulaValue;
use mosaic_sheets_core::CellError;

/// Call a built-in function by (upper-case) name; unknown names give `#NAME?`
pub fn call(name: &str, args: &[FormulaValue]) -> FormulaValue {
    match name {
        "CHOOSE" => fn_choose(args),
        _ => FormulaValue::Error(CellError::Name),
    }
}

/// CHOOSE(index_num, value1, [value2], ...) - Returns a value from a list based on index
///
/// index_num is 1-based and truncated toward zero (2.9 -> 2).
/// Returns #VALUE! if the index is out of range or not a number.
pub fn fn_choose(args: &[FormulaValue]) -> FormulaValue {
    let (index_arg, values) = match args.split_first() {
        Some((index, values)) if !values.is_empty() => (index, values),
        _ => return FormulaValue::Error(CellError::Value),
    };

    if let Some(e) = index_arg.get_error() {
        return FormulaValue::Error(e);
    }

    let index = match index_arg.as_number() {
        Some(n) if n.is_finite() => n.trunc() as i64,
        _ => return FormulaValue::Error(CellError::Value),
    };

    match crate::select(index, values) {
        Ok(value) => value.clone(),
        Err(_) => FormulaValue::Error(CellError::Value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nums(values: &[f64]) -> Vec<FormulaValue> {
        values.iter().map(|&n| FormulaValue::Number(n)).collect()
    }

    #[test]
    fn test_choose_picks_one_based() {
        let args = nums(&[2.0, 10.0, 20.0, 30.0]);
        assert_eq!(fn_choose(&args), FormulaValue::Number(20.0));
    }

    #[test]
    fn test_choose_truncates_index() {
        assert_eq!(fn_choose(&nums(&[2.9, 10.0, 20.0, 30.0])), FormulaValue::Number(20.0));
        assert_eq!(fn_choose(&nums(&[1.5, 10.0])), FormulaValue::Number(10.0));
    }

    #[test]
    fn test_choose_out_of_range() {
        let value_err = FormulaValue::Error(CellError::Value);
        assert_eq!(fn_choose(&nums(&[0.0, 10.0, 20.0])), value_err);
        assert_eq!(fn_choose(&nums(&[3.0, 10.0, 20.0])), value_err);
        assert_eq!(fn_choose(&nums(&[-1.0, 10.0])), value_err);
        assert_eq!(fn_choose(&nums(&[0.5, 10.0])), value_err);
        assert_eq!(fn_choose(&nums(&[1.0])), value_err);
        assert_eq!(fn_choose(&[]), value_err);
    }

    #[test]
    fn test_choose_empty_index_is_zero() {
        let args = vec![FormulaValue::Empty, FormulaValue::Number(1.0)];
        assert_eq!(fn_choose(&args), FormulaValue::Error(CellError::Value));
    }

    #[test]
    fn test_choose_propagates_index_error() {
        let args = vec![FormulaValue::Error(CellError::Ref), FormulaValue::Number(1.0)];
        assert_eq!(fn_choose(&args), FormulaValue::Error(CellError::Ref));
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(call("SUM", &[]), FormulaValue::Error(CellError::Name));
    }
}
