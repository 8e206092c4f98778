use crate::cpu::arm::alu_instruction::{AluSecondOperandInfo, ArmModeAluInstruction, ShiftOperator};
use crate::cpu::condition::Condition;
use crate::cpu::flags::ShiftKind;
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER, REG_SP};

use super::AsmErrorKind;
use super::encoder::{encode_data_processing, encode_immediate, encode_shift};
use super::lexer::{Token, TokenKind};

type ParseResult<T> = Result<T, (usize, AsmErrorKind)>;

/// Parses the tokens of one non-empty line into an instruction word.
pub fn parse_instruction(tokens: &[Token]) -> ParseResult<u32> {
    let mut cursor = Cursor::new(tokens);

    let (mnemonic, column) = cursor.identifier("mnemonic")?;
    let (alu_instruction, condition, set_conditions) = parse_mnemonic(mnemonic, column)?;

    let (rd, rn, set_conditions) = if !alu_instruction.writes_destination() {
        let rn = cursor.register()?;
        cursor.comma()?;
        (0, rn, true)
    } else if !alu_instruction.uses_first_operand() {
        let rd = cursor.register()?;
        cursor.comma()?;
        (rd, 0, set_conditions)
    } else {
        let rd = cursor.register()?;
        cursor.comma()?;
        let rn = cursor.register()?;
        cursor.comma()?;
        (rd, rn, set_conditions)
    };

    let op2 = cursor.second_operand()?;
    cursor.end()?;

    Ok(encode_data_processing(
        condition,
        alu_instruction,
        set_conditions,
        rn,
        rd,
        op2,
    ))
}

/// Splits `<op>[cond][S]`; the S may also come before the condition.
fn parse_mnemonic(
    text: &str,
    column: usize,
) -> ParseResult<(ArmModeAluInstruction, Condition, bool)> {
    let unknown = || (column, AsmErrorKind::UnknownMnemonic(text.to_owned()));

    if text.len() < 3 || !text.is_ascii() {
        return Err(unknown());
    }

    let (op, suffix) = text.split_at(3);
    let alu_instruction: ArmModeAluInstruction = op.parse().map_err(|_| unknown())?;

    let suffix = suffix.to_ascii_uppercase();
    let (condition, set_conditions) = match suffix.len() {
        0 => ("AL", false),
        1 if suffix == "S" => ("AL", true),
        2 => (suffix.as_str(), false),
        3 if suffix.starts_with('S') => (&suffix[1..], true),
        3 if suffix.ends_with('S') => (&suffix[..2], true),
        _ => return Err(unknown()),
    };
    let condition: Condition = condition.parse().map_err(|_| unknown())?;

    Ok((alu_instruction, condition, set_conditions))
}

fn parse_register(name: &str) -> Option<u32> {
    let upper = name.to_ascii_uppercase();
    let index = match upper.as_str() {
        "SP" => REG_SP,
        "LR" => REG_LR,
        "PC" => REG_PROGRAM_COUNTER,
        _ => {
            let digits = upper.strip_prefix('R')?;
            // "R01" is not a register name.
            if digits.len() > 1 && digits.starts_with('0') {
                return None;
            }
            digits.parse::<usize>().ok().filter(|&r| r <= 15)?
        }
    };

    u32::try_from(index).ok()
}

struct Cursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Cursor<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Column for errors at the current position; past the end it points
    /// just after the last token.
    fn column(&self) -> usize {
        self.peek().map_or_else(
            || self.tokens.last().map_or(1, |t| t.column + t.length),
            |t| t.column,
        )
    }

    fn syntax<T>(&self, message: &str) -> ParseResult<T> {
        Err((self.column(), AsmErrorKind::Syntax(message.to_owned())))
    }

    fn identifier(&mut self, what: &str) -> ParseResult<(&'a str, usize)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(text),
                column,
                ..
            }) => {
                self.advance();
                Ok((text.as_str(), *column))
            }
            _ => self.syntax(&format!("expected {what}")),
        }
    }

    fn register(&mut self) -> ParseResult<u32> {
        let (name, column) = self.identifier("register")?;
        parse_register(name).ok_or_else(|| (column, AsmErrorKind::InvalidRegister(name.to_owned())))
    }

    fn comma(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => {
                self.advance();
                Ok(())
            }
            _ => self.syntax("expected ','"),
        }
    }

    /// `#n` after the hash has been consumed.
    fn number(&mut self) -> ParseResult<u32> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Number(value),
                ..
            }) => {
                self.advance();
                Ok(*value)
            }
            _ => self.syntax("expected number after '#'"),
        }
    }

    fn second_operand(&mut self) -> ParseResult<AluSecondOperandInfo> {
        if let Some(Token {
            kind: TokenKind::Hash,
            column,
            ..
        }) = self.peek()
        {
            self.advance();
            let value = self.number()?;
            return encode_immediate(value)
                .ok_or((*column, AsmErrorKind::ImmediateNotEncodable(value)));
        }

        let rm = self.register()?;
        if self.peek().is_none() {
            return encode_shift(rm, ShiftKind::Lsl, 0).map_err(|kind| (self.column(), kind));
        }

        self.comma()?;
        let (shift_name, shift_column) = self.identifier("shift")?;
        let shift_kind: ShiftKind = shift_name
            .parse()
            .map_err(|message| (shift_column, AsmErrorKind::Syntax(message)))?;

        match self.peek() {
            Some(Token {
                kind: TokenKind::Hash,
                column,
                ..
            }) => {
                let column = *column;
                self.advance();
                let amount = self.number()?;
                encode_shift(rm, shift_kind, amount).map_err(|kind| (column, kind))
            }
            Some(_) => {
                let rs = self.register()?;
                Ok(AluSecondOperandInfo::Register {
                    shift_op: ShiftOperator::Register(rs),
                    shift_kind,
                    register: rm,
                })
            }
            None => self.syntax("expected shift amount"),
        }
    }

    fn end(&self) -> ParseResult<()> {
        if self.peek().is_some() {
            return self.syntax("unexpected token");
        }

        Ok(())
    }
}
