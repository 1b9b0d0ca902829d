/*!
  The instruction model of normalized Redcode.

  Every field of an instruction is a closed tag except the two operands. Opcodes and modifiers
  get their mnemonics from `strum` derives, so there is exactly one place where the text of a
  tag is spelled out: the variant name. Addressing modes are single characters, which do not
  make valid identifiers, so they are bound to their symbols by `MODE_SYMBOLS` instead. Both
  the parser and the formatter go through these tables.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use bimap::BiMap;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Operands and END offsets are signed. Upstream tooling reduces them modulo the core size,
/// but nothing here depends on that.
pub type OperandType = i64;

/// The nineteen opcodes of ICWS'94 Redcode, including the pMARS extensions `LDP`, `STP`,
/// and `NOP`.
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter,
  Clone,        Copy,          Eq, PartialEq,  Debug,  Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum OpCode {
  Dat,
  Mov,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Jmp,
  Jmz,
  Jmn,
  Djn,
  Spl,
  Cmp,
  Seq,
  Sne,
  Slt,
  Ldp,
  Stp,
  Nop,
}

/// Instruction modifiers select which fields of the source and destination take part.
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter,
  Clone,        Copy,          Eq, PartialEq,  Debug,  Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum Modifier {
  F,
  A,
  B,
  Ab,
  Ba,
  X,
  I,
}

#[derive(EnumIter, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
pub enum AddressingMode {
  Immediate,
  Direct,
  AIndirect,
  BIndirect,
  AIndirectPredecrement,
  BIndirectPredecrement,
  AIndirectPostincrement,
  BIndirectPostincrement,
}

/**
  The symbol of each addressing mode, listed in declaration order so that a mode's
  discriminant indexes its own row. `AddressingMode::symbol` relies on that ordering.
*/
const MODE_SYMBOL_ROWS: [(AddressingMode, char); 8] = [
  (AddressingMode::Immediate,              '#'),
  (AddressingMode::Direct,                 '$'),
  (AddressingMode::AIndirect,              '*'),
  (AddressingMode::BIndirect,              '@'),
  (AddressingMode::AIndirectPredecrement,  '{'),
  (AddressingMode::BIndirectPredecrement,  '<'),
  (AddressingMode::AIndirectPostincrement, '}'),
  (AddressingMode::BIndirectPostincrement, '>'),
];

lazy_static! {
  pub static ref MODE_SYMBOLS: BiMap<AddressingMode, char> =
    MODE_SYMBOL_ROWS.iter().copied().collect();
}

#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
#[error("`{0}` is not an addressing mode")]
pub struct UnknownAddressingMode(pub char);

impl AddressingMode {
  /// The prefix character written in front of an operand.
  pub fn symbol(&self) -> char {
    MODE_SYMBOL_ROWS[*self as usize].1
  }
}

impl TryFrom<char> for AddressingMode {
  type Error = UnknownAddressingMode;

  fn try_from(symbol: char) -> Result<Self, Self::Error> {
    MODE_SYMBOLS
      .get_by_right(&symbol)
      .copied()
      .ok_or(UnknownAddressingMode(symbol))
  }
}

impl Display for AddressingMode {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.symbol())
  }
}

/**
  A single normalized instruction. Two instructions are the same instruction if and only if
  all six fields are equal; there is no notion of identity beyond that.
*/
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Instruction {
  pub opcode   : OpCode,
  pub modifier : Modifier,
  pub mode_a   : AddressingMode,
  pub a        : OperandType,
  pub mode_b   : AddressingMode,
  pub b        : OperandType,
}

impl Instruction {
  pub fn new(
    opcode   : OpCode,
    modifier : Modifier,
    mode_a   : AddressingMode,
    a        : OperandType,
    mode_b   : AddressingMode,
    b        : OperandType
  ) -> Instruction {
    Instruction{ opcode, modifier, mode_a, a, mode_b, b }
  }
}

/// Renders the unpadded canonical form, e.g. `MOV.I $0, $1`.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}.{} {}{}, {}{}",
      self.opcode, self.modifier, self.mode_a, self.a, self.mode_b, self.b
    )
  }
}
