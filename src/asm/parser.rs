//! Two-pass assembler over tokenized lines.
//!
//! Pass one walks the source counting text words and data bytes to
//! assign every label an absolute address. Pass two encodes
//! instructions against the completed label map and materializes the
//! data segment. Branch and jump targets may be labels (resolved to
//! byte displacements from the instruction) or literal displacements.

use std::collections::HashMap;

use super::encode;
use super::error::{AsmError, AsmErrorKind};
use super::lexer::{tokenize_line, Token, TokenKind};
use super::{Program, TextWord};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Text,
    Data,
}

/// The assembler, parameterized by segment base addresses.
pub struct Assembler {
    text_start: u32,
    data_start: u32,
}

impl Assembler {
    pub fn new(text_start: u32, data_start: u32) -> Self {
        Self {
            text_start,
            data_start,
        }
    }

    /// Assembles a full source file.
    pub fn assemble(&self, source: &str) -> Result<Program, AsmError> {
        let labels = self.collect_labels(source)?;
        self.emit(source, &labels)
    }

    /// Pass one: assign every label an absolute address.
    fn collect_labels(&self, source: &str) -> Result<HashMap<String, u32>, AsmError> {
        let mut labels = HashMap::new();
        let mut section = Section::Text;
        let mut text_words = 0u32;
        let mut data_len = 0u32;

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let tokens = tokenize_line(raw, line_no)?;
            let mut pos = 0;

            while let Some((name, col)) = peek_label(&tokens, pos) {
                let addr = match section {
                    Section::Text => self.text_start + 4 * text_words,
                    Section::Data => self.data_start + data_len,
                };
                if labels.insert(name.clone(), addr).is_some() {
                    return Err(AsmError::new(
                        line_no,
                        col,
                        AsmErrorKind::DuplicateLabel(name),
                    ));
                }
                pos += 2;
            }
            if pos >= tokens.len() {
                continue;
            }

            match &tokens[pos].kind {
                TokenKind::Directive => match tokens[pos].text.as_str() {
                    ".text" => section = Section::Text,
                    ".data" => section = Section::Data,
                    _ => {
                        let mut sink = Vec::new();
                        data_len = run_directive(
                            &tokens, pos, line_no, section, data_len, None, &mut sink,
                        )?;
                    }
                },
                TokenKind::Ident => {
                    if section != Section::Text {
                        return Err(AsmError::new(
                            line_no,
                            tokens[pos].col,
                            AsmErrorKind::InstructionOutsideText,
                        ));
                    }
                    text_words += 1;
                }
                _ => {
                    return Err(AsmError::new(
                        line_no,
                        tokens[pos].col,
                        AsmErrorKind::Expected("instruction, directive, or label"),
                    ))
                }
            }
        }
        Ok(labels)
    }

    /// Pass two: encode instructions and fill the data segment.
    fn emit(&self, source: &str, labels: &HashMap<String, u32>) -> Result<Program, AsmError> {
        let mut section = Section::Text;
        let mut text = Vec::new();
        let mut data = Vec::new();

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let tokens = tokenize_line(raw, line_no)?;
            let mut pos = 0;
            while peek_label(&tokens, pos).is_some() {
                pos += 2;
            }
            if pos >= tokens.len() {
                continue;
            }

            match &tokens[pos].kind {
                TokenKind::Directive => match tokens[pos].text.as_str() {
                    ".text" => section = Section::Text,
                    ".data" => section = Section::Data,
                    _ => {
                        let len = data.len() as u32;
                        run_directive(
                            &tokens,
                            pos,
                            line_no,
                            section,
                            len,
                            Some(labels),
                            &mut data,
                        )?;
                    }
                },
                TokenKind::Ident => {
                    let addr = self.text_start + 4 * text.len() as u32;
                    let word = encode_instruction(&tokens, pos, line_no, addr, labels)?;
                    text.push(TextWord {
                        line: line_no,
                        word,
                    });
                }
                _ => unreachable!("pass one rejected this line shape"),
            }
        }
        Ok(Program { text, data })
    }
}

/// Handles one data directive. Returns the data length afterwards; when
/// `labels` is `None` (pass one) operand values are not resolved and
/// only sizes are accounted.
fn run_directive(
    tokens: &[Token],
    pos: usize,
    line_no: usize,
    section: Section,
    current_len: u32,
    labels: Option<&HashMap<String, u32>>,
    out: &mut Vec<u8>,
) -> Result<u32, AsmError> {
    let directive = &tokens[pos];
    if section != Section::Data {
        return Err(AsmError::new(
            line_no,
            directive.col,
            AsmErrorKind::DataOutsideData,
        ));
    }

    let mut len = current_len;
    let mut cursor = pos + 1;
    match directive.text.as_str() {
        ".byte" => emit_ints(tokens, &mut cursor, line_no, 1, labels, out, &mut len)?,
        ".half" => emit_ints(tokens, &mut cursor, line_no, 2, labels, out, &mut len)?,
        ".word" => emit_ints(tokens, &mut cursor, line_no, 4, labels, out, &mut len)?,
        ".dword" => emit_ints(tokens, &mut cursor, line_no, 8, labels, out, &mut len)?,
        ".string" => {
            let value = expect_string(tokens, &mut cursor, line_no)?;
            if labels.is_some() {
                out.extend_from_slice(value.as_bytes());
                out.push(0);
            }
            len += value.len() as u32 + 1;
        }
        ".align" => {
            let (value, col) = expect_integer(tokens, &mut cursor, line_no)?;
            if !(0..=16).contains(&value) {
                return Err(AsmError::new(
                    line_no,
                    col,
                    AsmErrorKind::ImmediateRange { value, width: 4 },
                ));
            }
            let boundary = 1u32 << value;
            while len % boundary != 0 {
                if labels.is_some() {
                    out.push(0);
                }
                len += 1;
            }
        }
        other => {
            return Err(AsmError::new(
                line_no,
                directive.col,
                AsmErrorKind::UnknownDirective(other.to_string()),
            ))
        }
    }
    expect_end(tokens, cursor, line_no)?;
    Ok(len)
}

/// Emits a comma-separated integer list at the given element size.
/// `.word` operands may also be labels, which resolve to absolute
/// addresses.
#[allow(clippy::too_many_arguments)]
fn emit_ints(
    tokens: &[Token],
    cursor: &mut usize,
    line_no: usize,
    size: u32,
    labels: Option<&HashMap<String, u32>>,
    out: &mut Vec<u8>,
    len: &mut u32,
) -> Result<(), AsmError> {
    loop {
        let token = tokens.get(*cursor).ok_or_else(|| {
            AsmError::new(line_no, last_col(tokens), AsmErrorKind::Expected("value"))
        })?;
        let value = match &token.kind {
            TokenKind::Integer(v) => {
                check_data_range(*v, size, line_no, token.col)?;
                *v
            }
            TokenKind::Ident if size == 4 => match labels {
                Some(map) => {
                    let addr = map.get(&token.text).ok_or_else(|| {
                        AsmError::new(
                            line_no,
                            token.col,
                            AsmErrorKind::UnknownLabel(token.text.clone()),
                        )
                    })?;
                    *addr as i64
                }
                None => 0,
            },
            _ => {
                return Err(AsmError::new(
                    line_no,
                    token.col,
                    AsmErrorKind::Expected("integer value"),
                ))
            }
        };
        *cursor += 1;

        if labels.is_some() {
            out.extend_from_slice(&(value as u64).to_le_bytes()[..size as usize]);
        }
        *len += size;

        match tokens.get(*cursor) {
            Some(t) if t.kind == TokenKind::Comma => *cursor += 1,
            _ => return Ok(()),
        }
    }
}

/// Encodes one instruction (or pseudo-op) at address `addr`.
fn encode_instruction(
    tokens: &[Token],
    pos: usize,
    line_no: usize,
    addr: u32,
    labels: &HashMap<String, u32>,
) -> Result<u32, AsmError> {
    let mnemonic = tokens[pos].text.to_ascii_lowercase();
    let mut ops = Operands {
        tokens,
        cursor: pos + 1,
        line_no,
        labels,
        addr,
    };

    let word = match mnemonic.as_str() {
        // R-type.
        "add" => ops.r_type(0b000, 0b0000000)?,
        "sub" => ops.r_type(0b000, 0b0100000)?,
        "sll" => ops.r_type(0b001, 0b0000000)?,
        "slt" => ops.r_type(0b010, 0b0000000)?,
        "sltu" => ops.r_type(0b011, 0b0000000)?,
        "xor" => ops.r_type(0b100, 0b0000000)?,
        "srl" => ops.r_type(0b101, 0b0000000)?,
        "sra" => ops.r_type(0b101, 0b0100000)?,
        "or" => ops.r_type(0b110, 0b0000000)?,
        "and" => ops.r_type(0b111, 0b0000000)?,

        // I-type arithmetic.
        "addi" => ops.i_arith(0b000)?,
        "slti" => ops.i_arith(0b010)?,
        "sltiu" => ops.i_arith(0b011)?,
        "xori" => ops.i_arith(0b100)?,
        "ori" => ops.i_arith(0b110)?,
        "andi" => ops.i_arith(0b111)?,
        "slli" => ops.shift_imm(0b001, 0b0000000)?,
        "srli" => ops.shift_imm(0b101, 0b0000000)?,
        "srai" => ops.shift_imm(0b101, 0b0100000)?,

        // Upper immediates.
        "lui" => ops.upper(0b0110111)?,
        "auipc" => ops.upper(0b0010111)?,

        // Loads and stores.
        "lb" => ops.load(0b000)?,
        "lh" => ops.load(0b001)?,
        "lw" => ops.load(0b010)?,
        "lbu" => ops.load(0b100)?,
        "lhu" => ops.load(0b101)?,
        "sb" => ops.store(0b000)?,
        "sh" => ops.store(0b001)?,
        "sw" => ops.store(0b010)?,

        // Branches.
        "beq" => ops.branch(0b000)?,
        "bne" => ops.branch(0b001)?,
        "blt" => ops.branch(0b100)?,
        "bge" => ops.branch(0b101)?,
        "bltu" => ops.branch(0b110)?,
        "bgeu" => ops.branch(0b111)?,

        // Jumps.
        "jal" => ops.jal()?,
        "jalr" => ops.jalr()?,

        // Pseudo-ops.
        "mv" => ops.mv()?,
        "li" => ops.li()?,
        "j" => ops.j()?,
        "nop" => encode::i_type(0b0010011, 0, 0b000, 0, 0),
        "ret" => encode::i_type(0b1100111, 0, 0b000, 1, 0),
        "halt" => 0,

        other => {
            return Err(AsmError::new(
                line_no,
                tokens[pos].col,
                AsmErrorKind::UnknownMnemonic(other.to_string()),
            ))
        }
    };

    expect_end(tokens, ops.cursor, line_no)?;
    Ok(word)
}

/// Operand cursor for one instruction.
struct Operands<'a> {
    tokens: &'a [Token],
    cursor: usize,
    line_no: usize,
    labels: &'a HashMap<String, u32>,
    addr: u32,
}

impl Operands<'_> {
    fn r_type(&mut self, funct3: u32, funct7: u32) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let rs1 = self.reg()?;
        self.comma()?;
        let rs2 = self.reg()?;
        Ok(encode::r_type(0b0110011, rd, funct3, rs1, rs2, funct7))
    }

    fn i_arith(&mut self, funct3: u32) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let rs1 = self.reg()?;
        self.comma()?;
        let imm = self.imm(12)?;
        Ok(encode::i_type(0b0010011, rd, funct3, rs1, imm as i32))
    }

    fn shift_imm(&mut self, funct3: u32, funct7: u32) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let rs1 = self.reg()?;
        self.comma()?;
        let (shamt, col) = expect_integer(self.tokens, &mut self.cursor, self.line_no)?;
        if !(0..=31).contains(&shamt) {
            return Err(AsmError::new(
                self.line_no,
                col,
                AsmErrorKind::ImmediateRange {
                    value: shamt,
                    width: 5,
                },
            ));
        }
        Ok(encode::r_type(
            0b0010011,
            rd,
            funct3,
            rs1,
            shamt as u32,
            funct7,
        ))
    }

    fn upper(&mut self, opcode: u32) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let (value, col) = expect_integer(self.tokens, &mut self.cursor, self.line_no)?;
        if !(0..=0xF_FFFF).contains(&value) {
            return Err(AsmError::new(
                self.line_no,
                col,
                AsmErrorKind::ImmediateRange { value, width: 20 },
            ));
        }
        Ok(encode::u_type(opcode, rd, value as u32))
    }

    fn load(&mut self, funct3: u32) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let (imm, rs1) = self.displacement()?;
        Ok(encode::i_type(0b0000011, rd, funct3, rs1, imm as i32))
    }

    fn store(&mut self, funct3: u32) -> Result<u32, AsmError> {
        let rs2 = self.reg()?;
        self.comma()?;
        let (imm, rs1) = self.displacement()?;
        Ok(encode::s_type(0b0100011, funct3, rs1, rs2, imm as i32))
    }

    fn branch(&mut self, funct3: u32) -> Result<u32, AsmError> {
        let rs1 = self.reg()?;
        self.comma()?;
        let rs2 = self.reg()?;
        self.comma()?;
        let offset = self.target(13)?;
        Ok(encode::b_type(0b1100011, funct3, rs1, rs2, offset as i32))
    }

    fn jal(&mut self) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let offset = self.target(21)?;
        Ok(encode::j_type(0b1101111, rd, offset as i32))
    }

    fn jalr(&mut self) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        // Accept both `rd, imm(rs1)` and `rd, rs1, imm`.
        if let Some(token) = self.tokens.get(self.cursor) {
            if token.kind == TokenKind::Ident {
                let rs1 = self.reg()?;
                self.comma()?;
                let imm = self.imm(12)?;
                return Ok(encode::i_type(0b1100111, rd, 0b000, rs1, imm as i32));
            }
        }
        let (imm, rs1) = self.displacement()?;
        Ok(encode::i_type(0b1100111, rd, 0b000, rs1, imm as i32))
    }

    fn mv(&mut self) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let rs1 = self.reg()?;
        Ok(encode::i_type(0b0010011, rd, 0b000, rs1, 0))
    }

    fn li(&mut self) -> Result<u32, AsmError> {
        let rd = self.reg()?;
        self.comma()?;
        let imm = self.imm(12)?;
        Ok(encode::i_type(0b0010011, rd, 0b000, 0, imm as i32))
    }

    fn j(&mut self) -> Result<u32, AsmError> {
        let offset = self.target(21)?;
        Ok(encode::j_type(0b1101111, 0, offset as i32))
    }

    fn reg(&mut self) -> Result<u32, AsmError> {
        let token = self.tokens.get(self.cursor).ok_or_else(|| {
            AsmError::new(
                self.line_no,
                last_col(self.tokens),
                AsmErrorKind::Expected("register"),
            )
        })?;
        match &token.kind {
            TokenKind::Ident => {
                let idx = encode::register(&token.text).ok_or_else(|| {
                    AsmError::new(
                        self.line_no,
                        token.col,
                        AsmErrorKind::UnknownRegister(token.text.clone()),
                    )
                })?;
                self.cursor += 1;
                Ok(idx)
            }
            _ => Err(AsmError::new(
                self.line_no,
                token.col,
                AsmErrorKind::Expected("register"),
            )),
        }
    }

    fn comma(&mut self) -> Result<(), AsmError> {
        match self.tokens.get(self.cursor) {
            Some(t) if t.kind == TokenKind::Comma => {
                self.cursor += 1;
                Ok(())
            }
            Some(t) => Err(AsmError::new(
                self.line_no,
                t.col,
                AsmErrorKind::Expected("comma"),
            )),
            None => Err(AsmError::new(
                self.line_no,
                last_col(self.tokens),
                AsmErrorKind::Expected("comma"),
            )),
        }
    }

    /// A signed immediate fitting `width` bits.
    fn imm(&mut self, width: u32) -> Result<i64, AsmError> {
        let (value, col) = expect_integer(self.tokens, &mut self.cursor, self.line_no)?;
        let lo = -(1i64 << (width - 1));
        let hi = (1i64 << (width - 1)) - 1;
        if !(lo..=hi).contains(&value) {
            return Err(AsmError::new(
                self.line_no,
                col,
                AsmErrorKind::ImmediateRange { value, width },
            ));
        }
        Ok(value)
    }

    /// An `imm(rs1)` memory operand.
    fn displacement(&mut self) -> Result<(i64, u32), AsmError> {
        let imm = self.imm(12)?;
        match self.tokens.get(self.cursor) {
            Some(t) if t.kind == TokenKind::LParen => self.cursor += 1,
            _ => {
                return Err(AsmError::new(
                    self.line_no,
                    last_col(self.tokens),
                    AsmErrorKind::Expected("'(' of displacement operand"),
                ))
            }
        }
        let rs1 = self.reg()?;
        match self.tokens.get(self.cursor) {
            Some(t) if t.kind == TokenKind::RParen => self.cursor += 1,
            _ => {
                return Err(AsmError::new(
                    self.line_no,
                    last_col(self.tokens),
                    AsmErrorKind::Expected("')' of displacement operand"),
                ))
            }
        }
        Ok((imm, rs1))
    }

    /// A branch/jump target: a label (resolved relative to the
    /// instruction address, in bytes) or a literal displacement.
    fn target(&mut self, width: u32) -> Result<i64, AsmError> {
        let token = self.tokens.get(self.cursor).ok_or_else(|| {
            AsmError::new(
                self.line_no,
                last_col(self.tokens),
                AsmErrorKind::Expected("branch target"),
            )
        })?;
        let (offset, col) = match &token.kind {
            TokenKind::Ident => {
                let target = self.labels.get(&token.text).ok_or_else(|| {
                    AsmError::new(
                        self.line_no,
                        token.col,
                        AsmErrorKind::UnknownLabel(token.text.clone()),
                    )
                })?;
                self.cursor += 1;
                (*target as i64 - self.addr as i64, token.col)
            }
            TokenKind::Integer(value) => {
                self.cursor += 1;
                (*value, token.col)
            }
            _ => {
                return Err(AsmError::new(
                    self.line_no,
                    token.col,
                    AsmErrorKind::Expected("branch target"),
                ))
            }
        };

        if offset % 2 != 0 {
            return Err(AsmError::new(
                self.line_no,
                col,
                AsmErrorKind::OddDisplacement(offset),
            ));
        }
        let lo = -(1i64 << (width - 1));
        let hi = (1i64 << (width - 1)) - 1;
        if !(lo..=hi).contains(&offset) {
            return Err(AsmError::new(
                self.line_no,
                col,
                AsmErrorKind::ImmediateRange {
                    value: offset,
                    width,
                },
            ));
        }
        Ok(offset)
    }
}

/// A leading `name:` label at `pos`, if present.
fn peek_label(tokens: &[Token], pos: usize) -> Option<(String, usize)> {
    match (tokens.get(pos), tokens.get(pos + 1)) {
        (Some(name), Some(colon))
            if name.kind == TokenKind::Ident && colon.kind == TokenKind::Colon =>
        {
            Some((name.text.clone(), name.col))
        }
        _ => None,
    }
}

fn expect_integer(
    tokens: &[Token],
    cursor: &mut usize,
    line_no: usize,
) -> Result<(i64, usize), AsmError> {
    match tokens.get(*cursor) {
        Some(Token {
            kind: TokenKind::Integer(value),
            col,
            ..
        }) => {
            *cursor += 1;
            Ok((*value, *col))
        }
        Some(t) => Err(AsmError::new(
            line_no,
            t.col,
            AsmErrorKind::Expected("integer"),
        )),
        None => Err(AsmError::new(
            line_no,
            last_col(tokens),
            AsmErrorKind::Expected("integer"),
        )),
    }
}

fn expect_string(
    tokens: &[Token],
    cursor: &mut usize,
    line_no: usize,
) -> Result<String, AsmError> {
    match tokens.get(*cursor) {
        Some(Token {
            kind: TokenKind::Str(value),
            ..
        }) => {
            *cursor += 1;
            Ok(value.clone())
        }
        Some(t) => Err(AsmError::new(
            line_no,
            t.col,
            AsmErrorKind::Expected("string literal"),
        )),
        None => Err(AsmError::new(
            line_no,
            last_col(tokens),
            AsmErrorKind::Expected("string literal"),
        )),
    }
}

fn expect_end(tokens: &[Token], cursor: usize, line_no: usize) -> Result<(), AsmError> {
    match tokens.get(cursor) {
        None => Ok(()),
        Some(t) => Err(AsmError::new(
            line_no,
            t.col,
            AsmErrorKind::Expected("end of line"),
        )),
    }
}

fn last_col(tokens: &[Token]) -> usize {
    tokens.last().map(|t| t.col + t.text.len()).unwrap_or(1)
}

fn check_data_range(value: i64, size: u32, line_no: usize, col: usize) -> Result<(), AsmError> {
    if size >= 8 {
        return Ok(());
    }
    let bits = 8 * size;
    let lo = -(1i64 << (bits - 1));
    let hi = (1i64 << bits) - 1;
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(AsmError::new(
            line_no,
            col,
            AsmErrorKind::ImmediateRange { value, width: bits },
        ))
    }
}
