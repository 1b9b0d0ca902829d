/*!
  Normalized Redcode: the instruction model, the canonical assembly parser, and the formatter
  that renders a parsed warrior back to canonical assembly.

  Canonical assembly is what an external assembler emits once labels, macros, `EQU`s, and
  expressions have been resolved against a particular core size. Nothing in this module
  resolves any of those things. It only reads and writes the resolved listing, which is why a
  program parsed here can be compared structurally but says nothing about how it behaves.
*/

mod assembly;
mod instruction;
mod program;

pub use assembly::{parse, parse_instruction, parse_metadata, parse_with_source, Metadata, ParseError};
pub use instruction::{
  AddressingMode, Instruction, Modifier, OpCode, OperandType, UnknownAddressingMode, MODE_SYMBOLS
};
pub use program::{FormatOptions, ParsedProgram};
