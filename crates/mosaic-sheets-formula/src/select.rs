//! Selector lookup and CHOOSE formula construction

use std::fmt::Display;

use mosaic_sheets_core::CellAddress;

use crate::error::{FormulaError, FormulaResult};

/// Pick `values[index - 1]`
///
/// # Examples
/// ```
/// use mosaic_sheets_formula::select;
///
/// assert_eq!(select(2, &[10, 20, 30]).unwrap(), &20);
/// assert!(select(0, &[10]).is_err());
/// ```
pub fn select<T>(index: i64, values: &[T]) -> FormulaResult<&T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| values.get(i))
        .ok_or(FormulaError::SelectorOutOfRange {
            index,
            count: values.len(),
        })
}

/// Build `=CHOOSE(<selector>,v1,...,vN)` with the selector written as an
/// absolute reference
///
/// # Examples
/// ```
/// use mosaic_sheets_core::CellAddress;
/// use mosaic_sheets_formula::choose_formula;
///
/// let selector = CellAddress::parse("CN53").unwrap();
/// assert_eq!(choose_formula(selector, &[0u8, 8, 255]), "=CHOOSE($CN$53,0,8,255)");
/// ```
pub fn choose_formula<T: Display>(selector: CellAddress, values: &[T]) -> String {
    let mut formula = format!("=CHOOSE({}", selector.to_absolute());
    for value in values {
        formula.push(',');
        formula.push_str(&value.to_string());
    }
    formula.push(')');
    formula
}
