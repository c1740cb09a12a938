//! Recursive descent parser that turns a token stream into a `Program`.
//!
//! Grammar:
//!
//! ```text
//! program     := expression (";" expression)* [";"]
//! expression  := atom ("=" atom)?      (assignment only after a variable)
//! atom        := lambda | application | NUMBER | VARIABLE
//! lambda      := KEYWORD VARIABLE* "." expression
//! application := "(" VARIABLE atom* ")"
//! ```

use std::fmt::Display;
use std::rc::Rc;

use crate::character_source::{LexError, Position};
use crate::lexical_analysis::{Token, TokenClass, TokenSource};
use crate::program_representation::{ExprNode, FnDef, Program, Variable};
use crate::MAX_PARSE_DEPTH;

/// Represents a parsing error.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseError {
    Lex(LexError),
    UnexpectedToken {
        found_token_class: TokenClass,
        found_token_string: String,
        position: Position,
    },
    ExpectedPunctuation {
        expected_token_string: String,
        found_token_string: String,
        position: Position,
    },
    UnexpectedEndOfInput {
        position: Position,
    },
    NestingTooDeep {
        position: Position,
    },
}

impl ParseError {
    /// Where in the source the error was detected.
    pub fn position(&self) -> Position {
        match self {
            Self::Lex(lex_error) => return lex_error.position,
            Self::UnexpectedToken { position, .. } => return *position,
            Self::ExpectedPunctuation { position, .. } => return *position,
            Self::UnexpectedEndOfInput { position } => return *position,
            Self::NestingTooDeep { position } => return *position,
        }
    }
}

/// Display trait implementation for ParseError.
impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(lex_error) => {
                return write!(f, "{}", lex_error);
            }

            Self::UnexpectedToken {
                found_token_class,
                found_token_string,
                position,
            } => {
                return write!(
                    f,
                    "Unexpected token: {:?} {:?} {}",
                    found_token_class, found_token_string, position
                );
            }

            Self::ExpectedPunctuation {
                expected_token_string,
                found_token_string,
                position,
            } => {
                return write!(
                    f,
                    "Expecting punctuation: {:?}, found: {:?} {}",
                    expected_token_string, found_token_string, position
                );
            }

            Self::UnexpectedEndOfInput { position } => {
                return write!(f, "Unexpected end of input {}", position);
            }

            Self::NestingTooDeep { position } => {
                return write!(
                    f,
                    "Expression nested more than {} levels deep {}",
                    MAX_PARSE_DEPTH, position
                );
            }
        }
    }
}

impl From<LexError> for ParseError {
    fn from(value: LexError) -> Self {
        return Self::Lex(value);
    }
}

fn unexpected_token(token: &Token) -> ParseError {
    return ParseError::UnexpectedToken {
        found_token_class: token.token_class,
        found_token_string: token.token_text.clone(),
        position: token.position,
    };
}

struct Parser<'a> {
    tokens: TokenSource<'a>,
    // Lambdas and applications currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn end_of_input(&self) -> ParseError {
        return ParseError::UnexpectedEndOfInput {
            position: self.tokens.position(),
        };
    }

    // Peeks at a token that the grammar requires to be there.
    fn peek_required(&mut self) -> Result<Token, ParseError> {
        if let Some(token) = self.tokens.peek()? {
            return Ok(token.clone());
        }

        return Err(self.end_of_input());
    }

    fn next_required(&mut self) -> Result<Token, ParseError> {
        match self.tokens.next()? {
            Some(token) => return Ok(token),
            None => return Err(self.end_of_input()),
        }
    }

    fn skip_punctuation(&mut self, punctuation: &str) -> Result<(), ParseError> {
        let token = self.peek_required()?;

        if !token.is_punctuation(punctuation) {
            return Err(ParseError::ExpectedPunctuation {
                expected_token_string: String::from(punctuation),
                found_token_string: token.token_text,
                position: token.position,
            });
        }

        self.tokens.next()?;
        return Ok(());
    }

    // Runs `parse` one nesting level deeper, failing at `position` once the
    // limit is reached.
    fn nested<T>(
        &mut self,
        position: Position,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::NestingTooDeep { position });
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        return result;
    }

    // Collects parameter names up to (not including) the '.'.
    fn parse_formal_params(&mut self) -> Result<Vec<String>, ParseError> {
        let mut formal_params = Vec::new();

        loop {
            if self.peek_required()?.is_punctuation(".") {
                break;
            }

            let token = self.next_required()?;
            if token.token_class != TokenClass::Variable {
                return Err(unexpected_token(&token));
            }
            formal_params.push(token.token_text);
        }

        return Ok(formal_params);
    }

    /// Parses a lambda after its keyword has been consumed.
    fn parse_fn_def(&mut self) -> Result<ExprNode, ParseError> {
        let formal_params = self.parse_formal_params()?;
        self.skip_punctuation(".")?;
        let fn_body = self.parse_expression()?;

        return Ok(ExprNode::FnDef(Rc::new(FnDef {
            formal_params,
            fn_body,
        })));
    }

    /// Parses an application after its '(' has been consumed.
    fn parse_application(&mut self) -> Result<ExprNode, ParseError> {
        let callee_token = self.next_required()?;
        if callee_token.token_class != TokenClass::Variable {
            return Err(unexpected_token(&callee_token));
        }

        let mut actual_args = Vec::new();
        while !self.peek_required()?.is_punctuation(")") {
            actual_args.push(self.parse_atom()?);
        }
        self.skip_punctuation(")")?;

        return Ok(ExprNode::FnApp {
            callee: Box::new(ExprNode::Var(Variable {
                var_name: callee_token.token_text,
                position: callee_token.position,
            })),
            actual_args,
        });
    }

    fn parse_atom(&mut self) -> Result<ExprNode, ParseError> {
        let token = self.peek_required()?;

        if token.token_class == TokenClass::Keyword {
            self.tokens.next()?;
            return self.nested(token.position, Self::parse_fn_def);
        }

        if token.is_punctuation("(") {
            self.tokens.next()?;
            return self.nested(token.position, Self::parse_application);
        }

        let token = self.next_required()?;
        match token.token_class {
            TokenClass::Variable => {
                return Ok(ExprNode::Var(Variable {
                    var_name: token.token_text,
                    position: token.position,
                }));
            }

            TokenClass::Number(value) => {
                return Ok(ExprNode::Number { value });
            }

            _ => {
                return Err(unexpected_token(&token));
            }
        }
    }

    // An assignment is a variable atom directly followed by an operator; its
    // right-hand side is a single atom, so `a = b = c` does not parse.
    fn parse_expression(&mut self) -> Result<ExprNode, ParseError> {
        let atom = self.parse_atom()?;

        let target = match atom {
            ExprNode::Var(target) => target,
            other => return Ok(other),
        };

        let followed_by_operator = matches!(
            self.tokens.peek()?,
            Some(token) if token.token_class == TokenClass::Operator
        );
        if !followed_by_operator {
            return Ok(ExprNode::Var(target));
        }

        self.tokens.next()?;
        let value = self.parse_atom()?;

        return Ok(ExprNode::Assign {
            target,
            value: Box::new(value),
        });
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();

        while !self.tokens.eof()? {
            body.push(self.parse_expression()?);

            if !self.tokens.eof()? {
                self.skip_punctuation(";")?;
            }
        }

        return Ok(Program { body });
    }
}

/// Uses recursive descent to parse the given source text into a `Program`
/// (see the `program_representation` module). Tokens are pulled lazily, so a
/// lexing error is only reported once the parser reaches it.
pub fn parse_recursive_descent(source: &str) -> Result<Program, ParseError> {
    let mut parser = Parser {
        tokens: TokenSource::new(source),
        depth: 0,
    };

    return parser.parse_program();
}
