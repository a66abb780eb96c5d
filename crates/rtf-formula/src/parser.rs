//! Formula parser
//!
//! Text is first split into tokens, then a recursive descent parser builds the
//! tree with the usual precedence: additive < multiplicative < unary < primary.
//!
//! Formulas come from files that may not have been written by this crate, so
//! the parser bounds the work any one formula can cause: its length, how deep
//! the tree nests, and how many cells a range covers.

use crate::ast::{BinaryOperator, CellReference, FormulaExpr, RangeReference, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use rtf_core::{CellAddress, CellError, CellRange};

/// Longest accepted formula, in characters (the spreadsheet limit)
pub const MAX_FORMULA_LEN: usize = 8192;
/// Deepest accepted expression tree
pub const MAX_DEPTH: usize = 64;
/// Most cells a single range reference may cover
pub const MAX_RANGE_CELLS: u64 = 1 << 16;

/// Parse formula text (with its leading `=`) into an expression tree
///
/// ```rust
/// use rtf_formula::parse_formula;
///
/// assert!(parse_formula("=C4-B4").is_ok());
/// assert!(parse_formula("=SUM(B17:B21)").is_ok());
/// assert!(parse_formula("='Week 1'!B3").is_ok());
/// assert!(parse_formula("C4-B4").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let body = formula
        .trim()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    if body.chars().count() > MAX_FORMULA_LEN {
        return Err(FormulaError::Parse(format!(
            "Formula is longer than {} characters",
            MAX_FORMULA_LEN
        )));
    }

    let tokens = tokenize(body)?;
    let mut parser = FormulaParser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_additive()?;

    if let Token::Eof = parser.peek() {
        check_depth(&expr)?;
        Ok(expr)
    } else {
        Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression in '{}'",
            parser.peek(),
            formula
        )))
    }
}

fn too_deep() -> FormulaError {
    FormulaError::Parse(format!("Formula nests deeper than {} levels", MAX_DEPTH))
}

/// Operator chains such as `1+1+...` deepen the tree without recursing in the
/// parser, so the finished tree is measured too, without recursion.
fn check_depth(expr: &FormulaExpr) -> FormulaResult<()> {
    let mut stack = vec![(expr, 1usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            return Err(too_deep());
        }
        match node {
            FormulaExpr::BinaryOp { left, right, .. } => {
                stack.push((left.as_ref(), depth + 1));
                stack.push((right.as_ref(), depth + 1));
            }
            FormulaExpr::UnaryOp { operand, .. } => stack.push((operand.as_ref(), depth + 1)),
            FormulaExpr::Function { args, .. } => {
                stack.extend(args.iter().map(|arg| (arg, depth + 1)));
            }
            _ => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(CellError),
    /// Function name
    Identifier(String),
    /// `A1`, `$B$2`
    CellRef(String),
    /// Sheet qualifier, quotes removed, `!` consumed
    Sheet(String),
    Plus,
    Minus,
    Star,
    Slash,
    Colon,
    Comma,
    LeftParen,
    RightParen,
    Eof,
}

fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let simple = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = simple {
            chars.next();
            tokens.push(token);
            continue;
        }

        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            // "text" literal or 'Sheet Name'! qualifier; doubled quote escapes
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, ch)) = chars.next() {
                if ch == c {
                    if chars.peek().map(|&(_, n)| n) == Some(c) {
                        chars.next();
                        text.push(c);
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    text.push(ch);
                }
            }
            if !closed {
                return Err(FormulaError::Parse(format!("Unterminated quote in '{}'", input)));
            }
            if c == '"' {
                tokens.push(Token::String(text));
            } else if chars.next_if(|&(_, n)| n == '!').is_some() {
                tokens.push(Token::Sheet(text));
            } else {
                return Err(FormulaError::Parse(format!(
                    "Expected '!' after sheet name '{}'",
                    text
                )));
            }
        } else if c.is_ascii_digit() || c == '.' {
            let mut end = start;
            let mut prev = c;
            while let Some(&(i, ch)) = chars.peek() {
                let exponent_sign = (ch == '+' || ch == '-') && (prev == 'e' || prev == 'E');
                if ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E' || exponent_sign {
                    end = i + ch.len_utf8();
                    prev = ch;
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &input[start..end];
            let n = text
                .parse::<f64>()
                .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", text)))?;
            tokens.push(Token::Number(n));
        } else if c == '#' {
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_ascii_alphanumeric() || matches!(ch, '#' | '/' | '!' | '?') {
                    end = i + ch.len_utf8();
                    chars.next();
                    if ch == '!' || ch == '?' {
                        break;
                    }
                } else {
                    break;
                }
            }
            let text = &input[start..end];
            let err = CellError::parse(text)
                .ok_or_else(|| FormulaError::Parse(format!("Unknown error literal '{}'", text)))?;
            tokens.push(Token::Error(err));
        } else if c.is_ascii_alphabetic() || c == '$' || c == '_' {
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_ascii_alphanumeric() || ch == '$' || ch == '_' || ch == '.' {
                    end = i + ch.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &input[start..end];
            let next = chars.peek().map(|&(_, n)| n);

            if next == Some('!') {
                chars.next();
                tokens.push(Token::Sheet(text.to_string()));
            } else if next != Some('(') && text.eq_ignore_ascii_case("TRUE") {
                tokens.push(Token::Boolean(true));
            } else if next != Some('(') && text.eq_ignore_ascii_case("FALSE") {
                tokens.push(Token::Boolean(false));
            } else if next != Some('(') && is_cell_reference(text) {
                tokens.push(Token::CellRef(text.to_string()));
            } else {
                tokens.push(Token::Identifier(text.to_string()));
            }
        } else {
            return Err(FormulaError::Parse(format!(
                "Unexpected character '{}' in '{}'",
                c, input
            )));
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

/// `[$]LETTERS[$]DIGITS`
fn is_cell_reference(text: &str) -> bool {
    let rest = text.strip_prefix('$').unwrap_or(text);
    let letters = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    if letters == 0 {
        return false;
    }
    let rest = &rest[letters..];
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

struct FormulaParser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current recursion depth of `parse_unary`
    depth: usize,
}

impl FormulaParser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        let token = self.next();
        if &token == expected {
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected, token
            )))
        }
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => return Ok(left),
            };
            self.next();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => return Ok(left),
            };
            self.next();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        // every nested operand, parenthesis and argument passes through here
        if self.depth >= MAX_DEPTH {
            return Err(too_deep());
        }
        self.depth += 1;
        let expr = self.parse_unary_inner();
        self.depth -= 1;
        expr
    }

    fn parse_unary_inner(&mut self) -> FormulaResult<FormulaExpr> {
        match self.peek() {
            Token::Minus => {
                self.next();
                let operand = self.parse_unary()?;
                Ok(FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                })
            }
            Token::Plus => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.next() {
            Token::Number(n) => Ok(FormulaExpr::Number(n)),
            Token::String(s) => Ok(FormulaExpr::String(s)),
            Token::Boolean(b) => Ok(FormulaExpr::Boolean(b)),
            Token::Error(e) => Ok(FormulaExpr::Error(e)),
            Token::LeftParen => {
                let expr = self.parse_additive()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }
            Token::Sheet(sheet) => match self.next() {
                Token::CellRef(text) => self.parse_reference(Some(sheet), &text),
                other => Err(FormulaError::Parse(format!(
                    "Expected cell reference after '{}!', got {:?}",
                    sheet, other
                ))),
            },
            Token::CellRef(text) => self.parse_reference(None, &text),
            Token::Identifier(name) => self.parse_function_call(name),
            other => Err(FormulaError::Parse(format!("Unexpected token {:?}", other))),
        }
    }

    /// A cell reference, widened to a range when followed by `:`
    fn parse_reference(&mut self, sheet: Option<String>, text: &str) -> FormulaResult<FormulaExpr> {
        let start = parse_address(text)?;
        if self.peek() != &Token::Colon {
            return Ok(FormulaExpr::CellRef(CellReference {
                sheet,
                address: start,
            }));
        }

        self.next();
        let end = match self.next() {
            Token::CellRef(end) => parse_address(&end)?,
            other => {
                return Err(FormulaError::Parse(format!(
                    "Expected cell reference after ':', got {:?}",
                    other
                )))
            }
        };
        let range = CellRange::new(start, end);
        if range.cell_count() > MAX_RANGE_CELLS {
            return Err(FormulaError::Parse(format!(
                "Range {} covers more than {} cells",
                range.to_a1_string(),
                MAX_RANGE_CELLS
            )));
        }
        Ok(FormulaExpr::RangeRef(RangeReference { sheet, range }))
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();
        if self.peek() != &Token::RightParen {
            args.push(self.parse_additive()?);
            while self.peek() == &Token::Comma {
                self.next();
                args.push(self.parse_additive()?);
            }
        }
        self.expect(&Token::RightParen)?;

        Ok(FormulaExpr::Function {
            name: name.to_ascii_uppercase(),
            args,
        })
    }
}

fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> FormulaExpr {
    FormulaExpr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn parse_address(text: &str) -> FormulaResult<CellAddress> {
    CellAddress::parse(text)
        .map_err(|e| FormulaError::Parse(format!("Invalid cell reference '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(a1: &str) -> FormulaExpr {
        FormulaExpr::CellRef(CellReference {
            sheet: None,
            address: CellAddress::parse(a1).unwrap(),
        })
    }

    #[test]
    fn test_parse_difference() {
        let ast = parse_formula("=C4-B4").unwrap();
        assert_eq!(ast, binary(BinaryOperator::Subtract, cell("C4"), cell("B4")));
    }

    #[test]
    fn test_parse_sum_range() {
        let ast = parse_formula("=SUM(B17:B21)").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::Function {
                name: "SUM".into(),
                args: vec![FormulaExpr::RangeRef(RangeReference {
                    sheet: None,
                    range: CellRange::parse("B17:B21").unwrap(),
                })],
            }
        );
    }

    #[test]
    fn test_precedence() {
        let ast = parse_formula("=1+2*3").unwrap();
        assert_eq!(
            ast,
            binary(
                BinaryOperator::Add,
                FormulaExpr::Number(1.0),
                binary(
                    BinaryOperator::Multiply,
                    FormulaExpr::Number(2.0),
                    FormulaExpr::Number(3.0)
                )
            )
        );

        let ast = parse_formula("=(1+2)*-3").unwrap();
        assert_eq!(
            ast,
            binary(
                BinaryOperator::Multiply,
                binary(
                    BinaryOperator::Add,
                    FormulaExpr::Number(1.0),
                    FormulaExpr::Number(2.0)
                ),
                FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(FormulaExpr::Number(3.0)),
                }
            )
        );
    }

    #[test]
    fn test_sheet_qualified_references() {
        let ast = parse_formula("='Week 1'!B3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::CellRef(CellReference {
                sheet: Some("Week 1".into()),
                address: CellAddress::parse("B3").unwrap(),
            })
        );

        let ast = parse_formula("=SUM(W1D1!B17:B21)").unwrap();
        let refs = ast.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].sheet(), Some("W1D1"));
        assert_eq!(refs[0].range().cell_count(), 5);
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_formula("=1.5e2").unwrap(), FormulaExpr::Number(150.0));
        assert_eq!(
            parse_formula("=\"say \"\"hi\"\"\"").unwrap(),
            FormulaExpr::String("say \"hi\"".into())
        );
        assert_eq!(parse_formula("=true").unwrap(), FormulaExpr::Boolean(true));
        assert_eq!(
            parse_formula("=#DIV/0!").unwrap(),
            FormulaExpr::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_function_names_uppercase() {
        let ast = parse_formula("=sum(1, 2)").unwrap();
        assert!(matches!(ast, FormulaExpr::Function { ref name, ref args } if name == "SUM" && args.len() == 2));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("C4-B4").is_err());
        assert!(parse_formula("=C4-").is_err());
        assert!(parse_formula("=SUM(B1:B2").is_err());
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("='Week 1B3").is_err());
        assert!(parse_formula("=B1:").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("={}1", "-".repeat(5_000));
        let err = parse_formula(&deep).unwrap_err();
        assert!(err.to_string().contains("nests deeper"));
        // far past the length limit; rejected before tokenizing
        assert!(parse_formula(&format!("={}1", "-".repeat(100_000))).is_err());

        let parens = format!("={}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse_formula(&parens).is_err());

        let chain = format!("=1{}", "+1".repeat(MAX_DEPTH));
        assert!(parse_formula(&chain).is_err());

        let shallow = format!("={}1", "-".repeat(MAX_DEPTH - 1));
        assert!(parse_formula(&shallow).is_ok());
        assert!(parse_formula("=SUM(B17:B21)+(C4-B4)*2").is_ok());
    }

    #[test]
    fn test_length_limit() {
        let long = format!("=1{}", "+1".repeat(MAX_FORMULA_LEN));
        let err = parse_formula(&long).unwrap_err();
        assert!(err.to_string().contains("longer than"));
    }

    #[test]
    fn test_range_size_limit() {
        let err = parse_formula("=SUM(A1:XFD1048576)").unwrap_err();
        assert!(err.to_string().contains("more than"));
        assert!(parse_formula("=SUM(A1:A65536)").is_ok());
        assert!(parse_formula("=SUM(A1:A65537)").is_err());
    }
}
