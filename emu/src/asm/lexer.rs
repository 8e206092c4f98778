use super::AsmErrorKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Mnemonic, register or shift name, as written.
    Identifier(String),
    Number(u32),
    Hash,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-indexed column of the first character.
    pub column: usize,
    pub length: usize,
}

/// Splits one source line into tokens, dropping whitespace and any `;`
/// comment.
pub fn tokenize(line: &str) -> Result<Vec<Token>, (usize, AsmErrorKind)> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let column = offset + 1;

        match c {
            ';' => break,
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    column,
                    length: 1,
                });
            }
            '#' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Hash,
                    column,
                    length: 1,
                });
            }
            c if c.is_ascii_digit() => {
                let text = take_word(line, &mut chars);
                let value = parse_number(text).ok_or_else(|| {
                    (column, AsmErrorKind::Syntax(format!("invalid number {text}")))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    column,
                    length: text.len(),
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let text = take_word(line, &mut chars);
                tokens.push(Token {
                    kind: TokenKind::Identifier(text.to_owned()),
                    column,
                    length: text.len(),
                });
            }
            other => {
                return Err((
                    column,
                    AsmErrorKind::Syntax(format!("unexpected character '{other}'")),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Consumes a run of alphanumeric characters and returns it.
fn take_word<'a>(
    line: &'a str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'a>>,
) -> &'a str {
    let start = chars.peek().map_or(line.len(), |&(offset, _)| offset);
    let mut end = start;

    while let Some(&(offset, c)) = chars.peek() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
        }
        end = offset + c.len_utf8();
        chars.next();
    }

    &line[start..end]
}

/// Decimal or `0x` hexadecimal.
fn parse_number(text: &str) -> Option<u32> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<u32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn tokenize_instruction() {
        assert_eq!(
            kinds("ANDS r0, r8, r8, lsr #32"),
            vec![
                TokenKind::Identifier("ANDS".to_owned()),
                TokenKind::Identifier("r0".to_owned()),
                TokenKind::Comma,
                TokenKind::Identifier("r8".to_owned()),
                TokenKind::Comma,
                TokenKind::Identifier("r8".to_owned()),
                TokenKind::Comma,
                TokenKind::Identifier("lsr".to_owned()),
                TokenKind::Hash,
                TokenKind::Number(32),
            ]
        );
    }

    #[test]
    fn columns_are_one_indexed() {
        let tokens = tokenize("  mov r1,#0xFF").unwrap();
        let columns: Vec<usize> = tokens.iter().map(|t| t.column).collect();
        assert_eq!(columns, vec![3, 7, 9, 10, 11]);
        assert_eq!(tokens[4].kind, TokenKind::Number(0xFF));
    }

    #[test]
    fn comments_end_the_line() {
        assert_eq!(kinds("; nothing here"), vec![]);
        assert_eq!(
            kinds("mov r0, r1 ; copy"),
            vec![
                TokenKind::Identifier("mov".to_owned()),
                TokenKind::Identifier("r0".to_owned()),
                TokenKind::Comma,
                TokenKind::Identifier("r1".to_owned()),
            ]
        );
    }

    #[test]
    fn bad_input() {
        assert_eq!(
            tokenize("mov r0, #12ab"),
            Err((10, AsmErrorKind::Syntax("invalid number 12ab".to_owned())))
        );
        assert_eq!(
            tokenize("mov r0, [r1]"),
            Err((9, AsmErrorKind::Syntax("unexpected character '['".to_owned())))
        );
    }
}
