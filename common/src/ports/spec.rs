//! Tokenizer for the port specification grammar:
//!
//! ```text
//! spec  := token ("," token)*
//! token := number ("-" number)?
//! number := [0-9]+
//! ```

use crate::error::PortSpecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Token {
    Single(u32),
    Range(u32, u32),
}

#[derive(Debug, Clone, Copy)]
enum State {
    ExpectFirst,
    InFirst,
    ExpectSecond { first: u32 },
    InSecond { first: u32 },
}

/// Validates the whole specification and splits it into tokens.
pub(super) fn tokenize(spec: &str) -> Result<Vec<Token>, PortSpecError> {
    if spec.is_empty() {
        return Err(PortSpecError::Empty);
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut state = State::ExpectFirst;
    let mut current: u32 = 0;
    let mut number_start: usize = 0;

    for (position, ch) in spec.char_indices() {
        state = match (state, ch) {
            (State::ExpectFirst, '0'..='9') => {
                number_start = position;
                current = digit_value(ch);
                State::InFirst
            }
            (State::ExpectSecond { first }, '0'..='9') => {
                number_start = position;
                current = digit_value(ch);
                State::InSecond { first }
            }
            (State::InFirst, '0'..='9') => {
                current = accumulate(current, ch, number_start)?;
                State::InFirst
            }
            (State::InSecond { first }, '0'..='9') => {
                current = accumulate(current, ch, number_start)?;
                State::InSecond { first }
            }
            (State::InFirst, ',') => {
                tokens.push(Token::Single(current));
                State::ExpectFirst
            }
            (State::InFirst, '-') => State::ExpectSecond { first: current },
            (State::InSecond { first }, ',') => {
                tokens.push(Token::Range(first, current));
                State::ExpectFirst
            }
            (State::ExpectFirst | State::ExpectSecond { .. }, ',' | '-') => {
                return Err(PortSpecError::MissingNumber { position });
            }
            (_, found) => return Err(PortSpecError::UnexpectedChar { found, position }),
        };
    }

    match state {
        State::InFirst => tokens.push(Token::Single(current)),
        State::InSecond { first } => tokens.push(Token::Range(first, current)),
        State::ExpectFirst | State::ExpectSecond { .. } => {
            return Err(PortSpecError::MissingNumber {
                position: spec.len(),
            });
        }
    }

    Ok(tokens)
}

fn digit_value(ch: char) -> u32 {
    ch as u32 - '0' as u32
}

fn accumulate(current: u32, ch: char, number_start: usize) -> Result<u32, PortSpecError> {
    current
        .checked_mul(10)
        .and_then(|n| n.checked_add(digit_value(ch)))
        .ok_or(PortSpecError::Overflow {
            position: number_start,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_singles_and_ranges() {
        assert_eq!(
            tokenize("22,100-90,7").unwrap(),
            vec![Token::Single(22), Token::Range(100, 90), Token::Single(7)]
        );
    }

    #[test]
    fn numbers_beyond_u32_overflow() {
        assert_eq!(
            tokenize("80,99999999999"),
            Err(PortSpecError::Overflow { position: 3 })
        );
        assert_eq!(tokenize("4294967295").unwrap(), vec![Token::Single(u32::MAX)]);
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        assert!(matches!(
            tokenize("٣"),
            Err(PortSpecError::UnexpectedChar { position: 0, .. })
        ));
    }
}
