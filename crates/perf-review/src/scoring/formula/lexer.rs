use super::FormulaError;
use crate::scoring::model::Category;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Variable(Category),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(value) => format!("number {value}"),
            Token::Variable(category) => category.variable_name().to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
        }
    }
}

/// Token plus its byte offset in the source formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) position: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '0'..='9' | '.' => {
                let end = scan_while(&mut chars, |c| c.is_ascii_digit() || c == '.');
                let literal = &source[position..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber {
                        literal: literal.to_string(),
                        position,
                    })?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    position,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = scan_while(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_');
                let name = &source[position..end];
                let category = Category::from_variable_name(name).ok_or_else(|| {
                    FormulaError::UnknownIdentifier {
                        name: name.to_string(),
                        position,
                    }
                })?;
                tokens.push(Spanned {
                    token: Token::Variable(category),
                    position,
                });
                continue;
            }
            other => {
                return Err(FormulaError::UnexpectedCharacter {
                    character: other,
                    position,
                })
            }
        };

        chars.next();
        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

fn scan_while<I, F>(chars: &mut std::iter::Peekable<I>, accept: F) -> usize
where
    I: Iterator<Item = (usize, char)>,
    F: Fn(char) -> bool,
{
    let mut end = 0;
    while let Some(&(offset, ch)) = chars.peek() {
        if !accept(ch) {
            return offset;
        }
        end = offset + ch.len_utf8();
        chars.next();
    }
    end
}
