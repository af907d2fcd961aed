//! Conditional formatting
//!
//! Rules apply a differential [`Style`] to cells whose value satisfies a
//! condition. The mosaic uses one `cellIs equal` rule per brightness level,
//! but the operators below cover everything a `cellIs` rule can express.
//!
//! ## Example
//!
//! ```rust
//! use mosaic_sheets_core::{CellRange, ConditionalFormatRule};
//! use mosaic_sheets_core::style::{Color, Style};
//!
//! let rule = ConditionalFormatRule::cell_is_equal_to("128")
//!     .with_range(CellRange::parse("B2:C3").unwrap())
//!     .with_format(Style::camouflage(Color::gray(128)));
//!
//! assert_eq!(rule.matches_value(128.0), Some(true));
//! assert!(rule.applies_to(1, 1));
//! ```

use crate::cell::CellRange;
use crate::style::Style;

/// A conditional formatting rule
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormatRule {
    /// Rule type
    pub rule_type: CfRuleType,
    /// Cell ranges this rule applies to
    pub ranges: Vec<CellRange>,
    /// Priority (lower = higher priority)
    pub priority: u32,
    /// Stop processing further rules if this one matches
    pub stop_if_true: bool,
    /// Format to apply when rule matches
    pub format: Option<Style>,
    /// Differential format index, as found in a file that was read
    pub dxf_id: Option<u32>,
}

impl Default for ConditionalFormatRule {
    fn default() -> Self {
        Self {
            rule_type: CfRuleType::Expression {
                formula: String::new(),
            },
            ranges: Vec::new(),
            priority: 1,
            stop_if_true: false,
            format: None,
            dxf_id: None,
        }
    }
}

impl ConditionalFormatRule {
    /// Create a new conditional format rule
    pub fn new(rule_type: CfRuleType) -> Self {
        Self {
            rule_type,
            ..Self::default()
        }
    }

    /// Cells equal to a value
    pub fn cell_is_equal_to(value: impl Into<String>) -> Self {
        Self::cell_is(CfOperator::Equal, value)
    }

    /// Cells compared to a value with any single-operand operator
    pub fn cell_is(operator: CfOperator, value: impl Into<String>) -> Self {
        Self::new(CfRuleType::CellIs {
            operator,
            formula1: value.into(),
            formula2: None,
        })
    }

    /// Cells where a formula evaluates to TRUE
    pub fn expression(formula: impl Into<String>) -> Self {
        Self::new(CfRuleType::Expression {
            formula: formula.into(),
        })
    }

    // === Builder methods ===

    /// Add a cell range to this rule
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Set the format to apply when rule matches
    pub fn with_format(mut self, style: Style) -> Self {
        self.format = Some(style);
        self
    }

    /// Set the priority (lower = higher priority)
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether to stop processing further rules if this one matches
    pub fn with_stop_if_true(mut self, stop: bool) -> Self {
        self.stop_if_true = stop;
        self
    }

    /// Check if this rule applies to a specific cell
    pub fn applies_to(&self, row: u32, col: u16) -> bool {
        self.ranges.iter().any(|r| {
            row >= r.start.row && row <= r.end.row && col >= r.start.col && col <= r.end.col
        })
    }

    /// Test a numeric cell value against this rule
    ///
    /// Returns `None` when the rule cannot be decided from the value alone
    /// (expression rules, or operands that are not plain numbers).
    pub fn matches_value(&self, value: f64) -> Option<bool> {
        match &self.rule_type {
            CfRuleType::CellIs {
                operator,
                formula1,
                formula2,
            } => {
                let a: f64 = formula1.trim().parse().ok()?;
                let b: Option<f64> = match formula2 {
                    Some(f) => Some(f.trim().parse().ok()?),
                    None => None,
                };
                operator.compare(value, a, b)
            }
            CfRuleType::Expression { .. } => None,
        }
    }
}

/// Types of conditional formatting rules
#[derive(Debug, Clone, PartialEq)]
pub enum CfRuleType {
    /// Cell value comparison (e.g., "equal to 128")
    CellIs {
        operator: CfOperator,
        formula1: String,
        formula2: Option<String>,
    },

    /// Formula evaluates to TRUE
    Expression { formula: String },
}

impl CfRuleType {
    /// Get the XLSX type string for this rule type
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            CfRuleType::CellIs { .. } => "cellIs",
            CfRuleType::Expression { .. } => "expression",
        }
    }
}

/// Operators for CellIs rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfOperator {
    /// Value is between formula1 and formula2
    #[default]
    Between,
    /// Value is NOT between formula1 and formula2
    NotBetween,
    /// Value equals formula1
    Equal,
    /// Value does NOT equal formula1
    NotEqual,
    /// Value is greater than formula1
    GreaterThan,
    /// Value is less than formula1
    LessThan,
    /// Value is greater than or equal to formula1
    GreaterThanOrEqual,
    /// Value is less than or equal to formula1
    LessThanOrEqual,
}

impl CfOperator {
    /// Get the XLSX operator string
    pub fn xlsx_operator(&self) -> &'static str {
        match self {
            CfOperator::Between => "between",
            CfOperator::NotBetween => "notBetween",
            CfOperator::Equal => "equal",
            CfOperator::NotEqual => "notEqual",
            CfOperator::GreaterThan => "greaterThan",
            CfOperator::LessThan => "lessThan",
            CfOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            CfOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Parse from XLSX operator string
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "between" => Some(CfOperator::Between),
            "notBetween" => Some(CfOperator::NotBetween),
            "equal" => Some(CfOperator::Equal),
            "notEqual" => Some(CfOperator::NotEqual),
            "greaterThan" => Some(CfOperator::GreaterThan),
            "lessThan" => Some(CfOperator::LessThan),
            "greaterThanOrEqual" => Some(CfOperator::GreaterThanOrEqual),
            "lessThanOrEqual" => Some(CfOperator::LessThanOrEqual),
            _ => None,
        }
    }

    /// Apply the operator; range operators need `b` and return `None`
    /// without it. Bounds may be given in either order.
    pub fn compare(&self, value: f64, a: f64, b: Option<f64>) -> Option<bool> {
        let result = match self {
            CfOperator::Equal => value == a,
            CfOperator::NotEqual => value != a,
            CfOperator::GreaterThan => value > a,
            CfOperator::LessThan => value < a,
            CfOperator::GreaterThanOrEqual => value >= a,
            CfOperator::LessThanOrEqual => value <= a,
            CfOperator::Between | CfOperator::NotBetween => {
                let b = b?;
                let inside = value >= a.min(b) && value <= a.max(b);
                inside == (*self == CfOperator::Between)
            }
        };
        Some(result)
    }
}
