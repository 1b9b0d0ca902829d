//! A parsed warrior and its rendering back to canonical assembly.

use std::fmt::{Display, Formatter, Write};

use string_cache::DefaultAtom;

use super::instruction::{Instruction, OperandType};
use crate::distance::{distance, similarity, DistanceWeights};
use crate::edit::{edit_script, EditScript};
use crate::fingerprint::{fingerprint, FingerprintOptions};

/**
  A warrior as an ordered instruction listing. Index 0 of `instructions` is the base address the
  warrior is loaded at, and `end` is the entry point relative to it. As with all strings in this
  crate, `name` and `author` are interned.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ParsedProgram {
  pub name         : Option<DefaultAtom>,
  pub author       : Option<DefaultAtom>,
  pub end          : OperandType,
  pub instructions : Vec<Instruction>,
}

/// Which optional lines `ParsedProgram::format` emits. The default emits all of them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FormatOptions {
  pub include_name   : bool,
  pub include_author : bool,
  pub include_end    : bool,
}

impl Default for FormatOptions {
  fn default() -> Self {
    FormatOptions {
      include_name   : true,
      include_author : true,
      include_end    : true,
    }
  }
}

impl ParsedProgram {
  pub fn new(
    name         : Option<DefaultAtom>,
    author       : Option<DefaultAtom>,
    end          : OperandType,
    instructions : Vec<Instruction>
  ) -> ParsedProgram {
    ParsedProgram{ name, author, end, instructions }
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }

  /**
    Renders the program as unpadded canonical assembly:

      ```text
      ;name <name>
      ;author <author>
      <OPCODE>.<MODIFIER> <mode><a>, <mode><b>
      ...
      END <end>
      ```

    Metadata lines are only written when the corresponding option is set and the field is
    present and non-empty. Every line but the END line is newline terminated.
  */
  pub fn format(&self, options: &FormatOptions) -> String {
    let mut text = String::new();

    // Writing to a `String` cannot fail.
    if options.include_name {
      if let Some(name) = non_empty(&self.name) {
        let _ = writeln!(text, ";name {}", name);
      }
    }
    if options.include_author {
      if let Some(author) = non_empty(&self.author) {
        let _ = writeln!(text, ";author {}", author);
      }
    }
    for instruction in &self.instructions {
      let _ = writeln!(text, "{}", instruction);
    }
    if options.include_end {
      let _ = write!(text, "END {}", self.end);
    }

    text
  }

  /// The fingerprint under `FingerprintOptions::default()`.
  pub fn fingerprint(&self) -> String {
    fingerprint(self, &FingerprintOptions::default())
  }

  pub fn distance_to(&self, other: &ParsedProgram, weights: &DistanceWeights) -> f64 {
    distance(&self.instructions, &other.instructions, weights)
  }

  pub fn similarity_to(&self, other: &ParsedProgram, weights: &DistanceWeights) -> f64 {
    similarity(&self.instructions, &other.instructions, weights)
  }

  pub fn edit_script_to(&self, other: &ParsedProgram, weights: &DistanceWeights) -> EditScript {
    edit_script(&self.instructions, &other.instructions, weights)
  }
}

/// An empty atom carries no metadata and is written the same way as `None`.
fn non_empty(field: &Option<DefaultAtom>) -> Option<&DefaultAtom> {
  field.as_ref().filter(|value| !value.is_empty())
}

impl Display for ParsedProgram {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.format(&FormatOptions::default()))
  }
}
