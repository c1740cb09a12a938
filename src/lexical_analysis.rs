//! Groups the characters of a program into tokens, with one token of
//! lookahead for the parser.

use lazy_static::lazy_static;
use regex::Regex;

use crate::character_source::{CharacterSource, LexError, Position};

/// The different classes of tokens that compose the language. Number
/// tokens carry their parsed value.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum TokenClass {
    Number(f64),
    Variable,
    Keyword,
    Punctuation,
    Operator,
}

/// Represents a single token of the language.
#[derive(PartialEq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
    pub position: Position,
}

impl Token {
    fn new(token_class: TokenClass, token_text: String, position: Position) -> Token {
        return Token {
            token_class,
            token_text,
            position,
        };
    }

    /// Whether this is a punctuation token spelled `punctuation`.
    pub fn is_punctuation(&self, punctuation: &str) -> bool {
        return self.token_class == TokenClass::Punctuation && self.token_text == punctuation;
    }
}

// The classes a single character can belong to when deciding which token it
// starts.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
enum CharClass {
    Whitespace,
    CommentStart,
    Digit,
    LambdaGlyph,
    Letter,
    Punctuation,
    OperatorChar,
}

// Represents how to recognize a character class.
#[derive(Debug)]
struct CharClassRule {
    char_class: CharClass,
    regex: Regex,
}

// Character class rules, in the priority order used to pick a token.
lazy_static! {
    static ref CHAR_CLASS_RULES: Vec<CharClassRule> = vec![
        CharClassRule {
            char_class: CharClass::Whitespace,
            regex: Regex::new(r"^\s$").expect("Unable to compile Whitespace rule regex."),
        },
        CharClassRule {
            char_class: CharClass::CommentStart,
            regex: Regex::new(r"^#$").expect("Unable to compile CommentStart rule regex."),
        },
        CharClassRule {
            char_class: CharClass::Digit,
            regex: Regex::new(r"^[0-9]$").expect("Unable to compile Digit rule regex."),
        },
        CharClassRule {
            char_class: CharClass::LambdaGlyph,
            regex: Regex::new(r"^[λ\\]$").expect("Unable to compile LambdaGlyph rule regex."),
        },
        CharClassRule {
            char_class: CharClass::Letter,
            regex: Regex::new(r"^[a-z]$").expect("Unable to compile Letter rule regex."),
        },
        CharClassRule {
            char_class: CharClass::Punctuation,
            regex: Regex::new(r"^[.;()]$").expect("Unable to compile Punctuation rule regex."),
        },
        CharClassRule {
            char_class: CharClass::OperatorChar,
            regex: Regex::new(r"^=$").expect("Unable to compile OperatorChar rule regex."),
        },
    ];
}

// Finds the first rule matching `ch`.
fn classify_char(ch: char) -> Option<CharClass> {
    let mut buf = [0u8; 4];
    let ch_str: &str = ch.encode_utf8(&mut buf);

    return CHAR_CLASS_RULES
        .iter()
        .find(|rule| rule.regex.is_match(ch_str))
        .map(|rule| rule.char_class);
}

fn is_char_class(ch: char, char_class: CharClass) -> bool {
    return classify_char(ch) == Some(char_class);
}

/// Token stream over a `CharacterSource` with a single buffered token.
pub struct TokenSource<'a> {
    chars: CharacterSource<'a>,
    current: Option<Token>,
}

impl<'a> TokenSource<'a> {
    pub fn new(source: &'a str) -> TokenSource<'a> {
        return TokenSource {
            chars: CharacterSource::new(source),
            current: None,
        };
    }

    /// Consumes and returns the next token. `Ok(None)` marks the end of input.
    pub fn next(&mut self) -> Result<Option<Token>, LexError> {
        if let Some(token) = self.current.take() {
            return Ok(Some(token));
        }

        return self.read_next();
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        if self.current.is_none() {
            self.current = self.read_next()?;
        }

        return Ok(self.current.as_ref());
    }

    pub fn eof(&mut self) -> Result<bool, LexError> {
        return Ok(self.peek()?.is_none());
    }

    /// Position of the buffered token if there is one, otherwise of the next
    /// unread character.
    pub fn position(&self) -> Position {
        match &self.current {
            Some(token) => return token.position,
            None => return self.chars.position(),
        }
    }

    fn read_while<P: FnMut(char) -> bool>(&mut self, mut predicate: P) -> String {
        let mut result = String::new();

        while let Some(ch) = self.chars.peek() {
            if !predicate(ch) {
                break;
            }
            result.push(ch);
            self.chars.next();
        }

        return result;
    }

    fn skip_comment(&mut self) {
        self.read_while(|ch| ch != '\n');
        self.chars.next();
    }

    // Reads digits with at most one decimal point. A second point ends the
    // number and is left for the next token.
    fn read_number(&mut self, position: Position) -> Result<Token, LexError> {
        let mut has_dot = false;

        let token_text = self.read_while(|ch| {
            if ch == '.' {
                if has_dot {
                    return false;
                }
                has_dot = true;
                return true;
            }
            return is_char_class(ch, CharClass::Digit);
        });

        let number_value = token_text.parse::<f64>().map_err(|_| LexError {
            message: format!("Malformed number: {}", token_text),
            position,
        })?;

        return Ok(Token::new(TokenClass::Number(number_value), token_text, position));
    }

    fn read_single(&mut self, token_class: TokenClass, position: Position) -> Option<Token> {
        let ch = self.chars.next()?;
        return Some(Token::new(token_class, ch.to_string(), position));
    }

    fn read_next(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.read_while(|ch| is_char_class(ch, CharClass::Whitespace));

            let Some(ch) = self.chars.peek() else {
                return Ok(None);
            };

            let position = self.chars.position();

            match classify_char(ch) {
                Some(CharClass::CommentStart) => {
                    self.skip_comment();
                    continue;
                }

                Some(CharClass::Digit) => {
                    return self.read_number(position).map(Some);
                }

                Some(CharClass::LambdaGlyph) => {
                    return Ok(self.read_single(TokenClass::Keyword, position));
                }

                Some(CharClass::Letter) => {
                    let token_text = self.read_while(|ch| is_char_class(ch, CharClass::Letter));
                    return Ok(Some(Token::new(TokenClass::Variable, token_text, position)));
                }

                Some(CharClass::Punctuation) => {
                    return Ok(self.read_single(TokenClass::Punctuation, position));
                }

                Some(CharClass::OperatorChar) => {
                    let token_text =
                        self.read_while(|ch| is_char_class(ch, CharClass::OperatorChar));
                    return Ok(Some(Token::new(TokenClass::Operator, token_text, position)));
                }

                Some(CharClass::Whitespace) | None => {
                    return Err(self.chars.fail(&format!("Can't handle character: {}", ch)));
                }
            }
        }
    }
}

/// Runs the token source to completion and collects every token.
pub fn run_lexical_analysis(source: &str) -> Result<Vec<Token>, LexError> {
    let mut token_source = TokenSource::new(source);
    let mut out = Vec::new();

    while let Some(token) = token_source.next()? {
        out.push(token);
    }

    return Ok(out);
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::Rng;

    use super::*;

    fn token_summary(tokens: &Vec<Token>) -> Vec<(TokenClass, &str)> {
        return tokens
            .iter()
            .map(|token| (token.token_class, token.token_text.as_str()))
            .collect();
    }

    // Test if every character class is picked by the right rule.
    #[test]
    fn test_classify_char() {
        let cases = vec![
            (' ', Some(CharClass::Whitespace)),
            ('\n', Some(CharClass::Whitespace)),
            ('#', Some(CharClass::CommentStart)),
            ('7', Some(CharClass::Digit)),
            ('λ', Some(CharClass::LambdaGlyph)),
            ('\\', Some(CharClass::LambdaGlyph)),
            ('q', Some(CharClass::Letter)),
            (';', Some(CharClass::Punctuation)),
            ('=', Some(CharClass::OperatorChar)),
            ('Q', None),
            ('+', None),
        ];

        for (ch, expected_class) in cases {
            assert_eq!(classify_char(ch), expected_class, "classifying {:?}", ch);
        }
    }

    // Test if a simple assignment lexes into the expected token classes.
    #[test]
    fn test_simple_program() {
        let tokens = run_lexical_analysis("id = λx. x; (id 5)").expect("Unable to lex program.");

        let expected = vec![
            (TokenClass::Variable, "id"),
            (TokenClass::Operator, "="),
            (TokenClass::Keyword, "λ"),
            (TokenClass::Variable, "x"),
            (TokenClass::Punctuation, "."),
            (TokenClass::Variable, "x"),
            (TokenClass::Punctuation, ";"),
            (TokenClass::Punctuation, "("),
            (TokenClass::Variable, "id"),
            (TokenClass::Number(5.0), "5"),
            (TokenClass::Punctuation, ")"),
        ];

        assert_eq!(token_summary(&tokens), expected);
    }

    // Test if a full-line comment is skipped entirely.
    #[test]
    fn test_comment_skipping() {
        let tokens =
            run_lexical_analysis("# full line comment\n5").expect("Unable to lex program.");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_class, TokenClass::Number(5.0));
        assert_eq!(tokens[0].position, Position::new(2, 1));
    }

    // Test if a second decimal point ends a number.
    #[test]
    fn test_number_with_two_points() {
        let tokens = run_lexical_analysis("1.5.2").expect("Unable to lex program.");

        assert_eq!(
            token_summary(&tokens),
            vec![
                (TokenClass::Number(1.5), "1.5"),
                (TokenClass::Punctuation, "."),
                (TokenClass::Number(2.0), "2"),
            ]
        );
    }

    // Test if a run of '=' is a single operator token.
    #[test]
    fn test_operator_run() {
        let tokens = run_lexical_analysis("a == b").expect("Unable to lex program.");

        assert_eq!(
            token_summary(&tokens),
            vec![
                (TokenClass::Variable, "a"),
                (TokenClass::Operator, "=="),
                (TokenClass::Variable, "b"),
            ]
        );
    }

    // Test if peek buffers a token without consuming it.
    #[test]
    fn test_peek_then_next() {
        let mut token_source = TokenSource::new("abc 12");

        let peeked = token_source
            .peek()
            .expect("Unable to peek.")
            .cloned()
            .expect("Expected a token.");
        let consumed = token_source
            .next()
            .expect("Unable to read next.")
            .expect("Expected a token.");

        assert_eq!(peeked, consumed);
        assert_eq!(consumed.token_text, "abc");
        assert!(!token_source.eof().expect("Unable to check eof."));

        token_source.next().expect("Unable to read next.");
        assert!(token_source.eof().expect("Unable to check eof."));
        assert_eq!(token_source.next().expect("Unable to read next."), None);
    }

    // Test if unknown characters are rejected with their position.
    #[test]
    fn test_unknown_character() {
        let lex_error = run_lexical_analysis("x;\n  Foo").expect_err("Expected a lex error.");

        assert_eq!(lex_error.message, "Can't handle character: F");
        assert_eq!(lex_error.position, Position::new(2, 3));
    }

    // Test if token positions point at the first character of each token.
    #[test]
    fn test_token_positions() {
        let tokens = run_lexical_analysis("ab\n  (f 10)").expect("Unable to lex program.");

        let positions: Vec<Position> = tokens.iter().map(|token| token.position).collect();

        assert_eq!(
            positions,
            vec![
                Position::new(1, 1),
                Position::new(2, 3),
                Position::new(2, 4),
                Position::new(2, 6),
                Position::new(2, 8),
            ]
        );
    }

    // Test if concatenating the token texts of random programs gives back
    // the non-whitespace, non-comment characters.
    #[test]
    fn test_random_round_trip() {
        let fragments = vec![
            "λ", "\\", "x", "abc", "12", "3.25", ".", ";", "(", ")", "=", "==", " ", "\t",
            "\n", "# note\n",
        ];
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let fragment_count = rng.gen_range(1..30);
            let mut program_str = String::new();

            for _ in 0..fragment_count {
                let fragment = fragments.choose(&mut rng).expect("Fragments are not empty.");
                program_str.push_str(fragment);
                // Separate fragments so adjacent runs do not merge.
                program_str.push(' ');
            }

            let tokens = run_lexical_analysis(&program_str).expect("Unable to lex program.");
            let rebuilt: String = tokens.iter().map(|token| token.token_text.as_str()).collect();

            let expected: String = program_str
                .lines()
                .map(|line| line.split('#').next().unwrap_or(""))
                .flat_map(|line| line.chars())
                .filter(|ch| !ch.is_whitespace())
                .collect();

            assert_eq!(rebuilt, expected, "round trip of {:?}", program_str);
        }
    }
}
