/*!
  Canonical assembly is the normalized, one-instruction-per-line listing produced by an external
  assembler once labels, macros, and expressions have been resolved:

    ```text
    ;name Imp
    MOV.I $     0, $     1
    END 0
    ```

  The instruction grammar is

    ```text
    <line>     ::= <opcode> '.' <modifier> <ws>+ <operand> <ws>* ',' <ws>* <operand>
    <operand>  ::= <mode> <ws>* <integer>
    <mode>     ::= '#' | '$' | '*' | '@' | '{' | '<' | '}' | '>'
    <integer>  ::= ('+' | '-')? <digit>+
    ```

  Upstream tooling right-aligns operands, so any amount of padding may sit between a mode and
  its operand. Opcodes and modifiers are matched without regard to case. The listing is
  terminated by an `END <integer>` line. Lines beginning with `;` are comments, of which
  `;name` and `;author` are meaningful.

  This module leverages the `strum` derives of the instruction tags to turn tokens into
  opcodes and modifiers, so the mnemonics are never spelled out here.
*/

use std::convert::TryFrom;
use std::str::FromStr;

use nom::{
  bytes::complete::tag_no_case,
  character::complete::{
    alpha1,
    anychar,
    char as one_char,
    digit1,
    one_of,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_res, opt, recognize},
  sequence::{delimited, pair, preceded, terminated, tuple},
  IResult
};
use string_cache::DefaultAtom;
use thiserror::Error;
use tracing::debug;

use super::instruction::{AddressingMode, Instruction, Modifier, OpCode, OperandType};
use super::program::ParsedProgram;

const COMMENT_PREFIX : char = ';';
const NAME_PREFIX    : &str = ";name";
const AUTHOR_PREFIX  : &str = ";author";
const END_KEYWORD    : &str = "END";

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
  /// A body line that does not follow the instruction grammar. `line` counts from 1.
  #[error("Error on line {line}: malformed instruction `{text}`")]
  MalformedLine {
    line: usize,
    text: String
  },
  #[error("Missing END line")]
  MissingEndLine,
}

fn malformed(line: usize, text: &str) -> ParseError {
  ParseError::MalformedLine{ line, text: text.to_string() }
}

/// Optional labelling scraped from `;name` and `;author` comments.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Metadata {
  pub name   : Option<DefaultAtom>,
  pub author : Option<DefaultAtom>,
}

/**
  Collects `Metadata` from comment lines. The first `;name` and the first `;author` comment
  settle their field, even when nothing follows the prefix; later ones are ignored.
*/
#[derive(Default)]
struct MetadataScanner {
  metadata    : Metadata,
  name_seen   : bool,
  author_seen : bool,
}

impl MetadataScanner {
  fn observe(&mut self, line: &str) {
    if let Some(value) = comment_value(line, NAME_PREFIX) {
      if !self.name_seen {
        self.name_seen     = true;
        self.metadata.name = value;
      }
    } else if let Some(value) = comment_value(line, AUTHOR_PREFIX) {
      if !self.author_seen {
        self.author_seen     = true;
        self.metadata.author = value;
      }
    }
  }

  fn is_settled(&self) -> bool {
    self.name_seen && self.author_seen
  }

  fn finish(self) -> Metadata {
    self.metadata
  }
}

/**
  If the trimmed `line` starts with `prefix` (ignoring ASCII case), yields the trimmed remainder
  of the line. An empty remainder yields `Some(None)`: the comment is present but the value is
  empty.
*/
fn comment_value(line: &str, prefix: &str) -> Option<Option<DefaultAtom>> {
  let head = line.get(..prefix.len())?;
  if !head.eq_ignore_ascii_case(prefix) {
    return None;
  }
  let value = line[prefix.len()..].trim();
  match value.is_empty() {
    true  => Some(None),
    false => Some(Some(DefaultAtom::from(value)))
  }
}

// region Parser combinators

fn integer_p(input: &str) -> IResult<&str, OperandType> {
  map_res(
    recognize(pair(opt(one_of("+-")), digit1)),
    |digits: &str| digits.parse::<OperandType>()
  )(input)
}

fn mode_p(input: &str) -> IResult<&str, AddressingMode> {
  map_res(anychar, |symbol: char| AddressingMode::try_from(symbol))(input)
}

fn operand_p(input: &str) -> IResult<&str, (AddressingMode, OperandType)> {
  pair(terminated(mode_p, space0), integer_p)(input)
}

fn instruction_p(input: &str) -> IResult<&str, Instruction> {
  map(
    all_consuming(delimited(
      space0,
      tuple((
        terminated(map_res(alpha1, OpCode::from_str), one_char('.')),
        terminated(map_res(alpha1, Modifier::from_str), space1),
        operand_p,
        delimited(space0, one_char(','), space0),
        operand_p,
      )),
      space0
    )),
    |(opcode, modifier, (mode_a, a), _, (mode_b, b))| {
      Instruction{ opcode, modifier, mode_a, a, mode_b, b }
    }
  )(input)
}

fn end_p(input: &str) -> IResult<&str, OperandType> {
  all_consuming(delimited(
    space0,
    preceded(terminated(tag_no_case(END_KEYWORD), space1), integer_p),
    space0
  ))(input)
}

// endregion

/// Whether the first whitespace-delimited token of the line is `END` in any case.
fn is_end_line(line: &str) -> bool {
  line
    .split_whitespace()
    .next()
    .map_or(false, |token| token.eq_ignore_ascii_case(END_KEYWORD))
}

/// Parses a single canonical instruction line, padded or not.
pub fn parse_instruction(line: &str) -> Option<Instruction> {
  instruction_p(line).ok().map(|(_rest, instruction)| instruction)
}

impl FromStr for Instruction {
  type Err = ParseError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    parse_instruction(text).ok_or_else(|| malformed(1, text))
  }
}

/**
  Parses canonical assembly into a program. Name and author come from the first `;name` and
  `;author` comments of the listing itself, if any. Everything after the END line is ignored.

  Either the whole listing parses or nothing is returned.
*/
pub fn parse(text: &str) -> Result<ParsedProgram, ParseError> {
  let mut scanner      = MetadataScanner::default();
  let mut instructions = Vec::new();

  for (idx, raw) in text.lines().enumerate() {
    let line_number = idx + 1;
    let line = raw.trim();

    if line.is_empty() {
      continue;
    }

    if line.starts_with(COMMENT_PREFIX) {
      scanner.observe(line);
      continue;
    }

    if is_end_line(line) {
      let end = match end_p(line) {
        Ok((_rest, end)) => end,
        Err(_e) => {
          debug!(line = line_number, text = raw, "malformed END line");
          return Err(malformed(line_number, raw));
        }
      };
      debug!(instructions = instructions.len(), end, "parsed canonical assembly");
      let metadata = scanner.finish();
      return Ok(ParsedProgram{
        name   : metadata.name,
        author : metadata.author,
        end,
        instructions
      });
    }

    match parse_instruction(line) {
      Some(instruction) => instructions.push(instruction),
      None => {
        debug!(line = line_number, text = raw, "malformed instruction line");
        return Err(malformed(line_number, raw));
      }
    }
  }

  debug!(instructions = instructions.len(), "canonical assembly has no END line");
  Err(ParseError::MissingEndLine)
}

/**
  Scans the author's original, pre-assembly source for `;name` and `;author` comments. The
  first occurrence of each wins. This never fails; absent fields are `None`.
*/
pub fn parse_metadata(source: &str) -> Metadata {
  let mut scanner = MetadataScanner::default();
  for raw in source.lines() {
    let line = raw.trim();
    if line.starts_with(COMMENT_PREFIX) {
      scanner.observe(line);
    }
    if scanner.is_settled() {
      break;
    }
  }
  scanner.finish()
}

/**
  Builds a program from the two texts an assembler round trip yields: the instructions and END
  offset come from `canonical`, the name and author from the original `source`. Metadata
  comments inside `canonical` are ignored in favor of the source's.
*/
pub fn parse_with_source(canonical: &str, source: &str) -> Result<ParsedProgram, ParseError> {
  let program  = parse(canonical)?;
  let metadata = parse_metadata(source);
  Ok(ParsedProgram{
    name   : metadata.name,
    author : metadata.author,
    ..program
  })
}
