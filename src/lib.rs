/*!
  Structural comparison of normalized Redcode warriors.

  The pipeline is:
    ```text
    canonical assembly -> [`redcode::parse`] -> `ParsedProgram` ->⋯

    ⋯-> [`fingerprint`]                  -> content digest
    ⋯-> [`distance`] / [`similarity`]    -> how far apart two warriors are
    ⋯-> [`edit_script`]                  -> why they are that far apart
    ```

  Canonical assembly comes from an external assembler; nothing here assembles, links, or runs a
  warrior. Every function is a pure computation over its arguments.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod distance;
pub mod edit;
pub mod fingerprint;
pub mod redcode;

pub use distance::{
  distance, operand_distance, similarity, substitution_cost, DistanceWeights, DEFAULT_CORE_SIZE
};
pub use edit::{edit_script, EditKind, EditOperation, EditScript};
pub use fingerprint::{fingerprint, FingerprintOptions};
pub use redcode::{
  parse, parse_metadata, parse_with_source, AddressingMode, FormatOptions, Instruction, Metadata,
  Modifier, OpCode, OperandType, ParseError, ParsedProgram
};
