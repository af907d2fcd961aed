//! Formula parser
//!
//! A recursive descent parser for the formula subset mosaic workbooks use:
//! numbers, error literals, A1 references, unary minus and function calls.

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use mosaic_sheets_core::{CellAddress, CellError};

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use mosaic_sheets_formula::{parse_formula, FormulaExpr};
///
/// let ast = parse_formula("=CHOOSE($CN$53,0,8)").unwrap();
/// assert!(matches!(ast, FormulaExpr::Function { ref name, ref args } if name == "CHOOSE" && args.len() == 3));
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let formula = formula
        .trim()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let mut parser = FormulaParser::new(formula)?;
    let expr = parser.parse_expression()?;

    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Error(CellError),
    Identifier(String),
    CellRef(CellAddress),

    Minus,
    Comma,
    LeftParen,
    RightParen,

    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let single = match c {
            '-' => Some(Token::Minus),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c == '#' {
            return self.scan_error();
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return self.scan_identifier_or_ref();
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at position {}",
            c, self.pos
        )))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        self.skip_digits();
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.advance();
            }
            self.skip_digits();
        }

        let text = &self.input[start..self.pos];
        text.parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", text)))
    }

    fn scan_error(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance();
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || matches!(c, '!' | '/' | '?'))
        {
            self.advance();
        }
        let text = &self.input[start..self.pos];
        CellError::parse(text)
            .map(Token::Error)
            .ok_or_else(|| FormulaError::Parse(format!("Unknown error literal '{}'", text)))
    }

    fn scan_identifier_or_ref(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
        {
            self.advance();
        }
        let text = &self.input[start..self.pos];

        // LOG10( is a function, not a cell
        if self.peek_next_non_space() != Some('(') {
            if let Ok(addr) = CellAddress::parse(text) {
                return Ok(Token::CellRef(addr));
            }
        }

        if text.contains('$') {
            return Err(FormulaError::Parse(format!("Invalid reference '{}'", text)));
        }
        Ok(Token::Identifier(text.to_ascii_uppercase()))
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn peek_next_non_space(&self) -> Option<char> {
        self.input[self.pos..].chars().find(|c| !c.is_whitespace())
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing ===

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        if self.current_token() == &Token::Minus {
            self.consume()?;
            let operand = self.parse_expression()?;
            return Ok(FormulaExpr::Negate(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.consume()? {
            Token::Number(n) => Ok(FormulaExpr::Number(n)),
            Token::Error(e) => Ok(FormulaExpr::Error(e)),
            Token::CellRef(addr) => Ok(FormulaExpr::CellRef(addr)),
            Token::Identifier(name) => {
                self.expect(&Token::LeftParen)?;
                let args = self.parse_arguments()?;
                Ok(FormulaExpr::Function { name, args })
            }
            other => Err(FormulaError::Parse(format!(
                "Unexpected {:?} where a value was expected",
                other
            ))),
        }
    }

    /// Arguments after the opening parenthesis, through the closing one
    fn parse_arguments(&mut self) -> FormulaResult<Vec<FormulaExpr>> {
        let mut args = Vec::new();
        if self.current_token() == &Token::RightParen {
            self.consume()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            match self.consume()? {
                Token::Comma => continue,
                Token::RightParen => return Ok(args),
                other => {
                    return Err(FormulaError::Parse(format!(
                        "Expected ',' or ')' in argument list, got {:?}",
                        other
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("= 2.5e1 ").unwrap(), FormulaExpr::Number(25.0));
    }

    #[test]
    fn test_parse_choose() {
        let ast = parse_formula("=CHOOSE($CN$53,0,8,255)").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::Function {
                name: "CHOOSE".into(),
                args: vec![
                    FormulaExpr::CellRef(CellAddress::absolute(52, 91)),
                    FormulaExpr::Number(0.0),
                    FormulaExpr::Number(8.0),
                    FormulaExpr::Number(255.0),
                ],
            }
        );
    }

    #[test]
    fn test_function_names_are_case_insensitive() {
        let ast = parse_formula("=choose(1, 2)").unwrap();
        assert!(matches!(ast, FormulaExpr::Function { ref name, .. } if name == "CHOOSE"));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(
            parse_formula("=--$B$2").unwrap(),
            FormulaExpr::Negate(Box::new(FormulaExpr::Negate(Box::new(
                FormulaExpr::CellRef(CellAddress::absolute(1, 1))
            ))))
        );
        assert_eq!(
            parse_formula("=CHOOSE(1,-8)").unwrap(),
            FormulaExpr::Function {
                name: "CHOOSE".into(),
                args: vec![
                    FormulaExpr::Number(1.0),
                    FormulaExpr::Negate(Box::new(FormulaExpr::Number(8.0))),
                ],
            }
        );
    }

    #[test]
    fn test_arithmetic_is_not_parsed() {
        assert!(parse_formula("=1+2").is_err());
        assert!(parse_formula("=A1*2").is_err());
        assert!(parse_formula("=8/2").is_err());
        assert!(parse_formula("=1-2").is_err());
        assert!(parse_formula("=(5)").is_err());
    }

    #[test]
    fn test_parse_error_literal_and_empty_call() {
        assert_eq!(
            parse_formula("=#VALUE!").unwrap(),
            FormulaExpr::Error(CellError::Value)
        );
        assert_eq!(
            parse_formula("=NOW()").unwrap(),
            FormulaExpr::Function {
                name: "NOW".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("CHOOSE(1,2)").is_err());
        assert!(parse_formula("=CHOOSE(1,2").is_err());
        assert!(parse_formula("=CHOOSE(1,,2)").is_err());
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("=1;2").is_err());
        assert!(parse_formula("=FOO").is_err());
        assert!(parse_formula("=$$A1").is_err());
        assert!(parse_formula("=").is_err());
    }
}
