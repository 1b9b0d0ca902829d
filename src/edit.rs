/*!
  Edit scripts: the individual operations behind a weighted edit distance.

  `edit_script` fills the full `(n+1)×(m+1)` lattice of `crate::distance` and, next to it, a
  choice table recording which neighbour each cell was reached from. Walking the choice table
  back from the bottom right corner yields the operations in reverse.

  Both tables live in flat, pre-sized vectors, and the walk back is a loop, so the only limit
  on warrior length is memory.

  When two ways into a cell cost the same to within `1e-9`, the diagonal wins over a deletion,
  and a deletion wins over an insertion. The order is arbitrary, but it is fixed, so the same
  inputs always produce the same script.
*/

use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use prettytable::{format as TableFormat, Table};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};
#[cfg(feature = "trace_alignment")]
use tracing::trace;

use crate::distance::{cheapest_step, substitution_cost, DistanceWeights, Step, TIE_EPSILON};
use crate::redcode::Instruction;

/// What an edit operation does. The `u8` codes are stable, for callers that store scripts
/// compactly.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum EditKind {
  /// A diagonal step between identical instructions.
  Keep,
  Substitute,
  Insert,
  Delete,
}

/// The choice recorded for a lattice cell. Keeps are told apart from substitutions on the way back.
fn recorded_kind(step: Step) -> EditKind {
  match step {
    Step::Diagonal => EditKind::Substitute,
    Step::Delete   => EditKind::Delete,
    Step::Insert   => EditKind::Insert,
  }
}

/**
  One step of an edit script. `a_index` is the position in sequence A the operation consumes and
  `b_index` the position in sequence B, both counting from 0. An insertion consumes nothing
  from A and a deletion nothing from B.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct EditOperation {
  pub kind    : EditKind,
  pub a_index : Option<usize>,
  pub b_index : Option<usize>,
  pub from    : Option<Instruction>,
  pub to      : Option<Instruction>,
  pub cost    : f64,
}

impl EditOperation {
  fn delete(a_index: usize, from: Instruction, cost: f64) -> EditOperation {
    EditOperation{
      kind    : EditKind::Delete,
      a_index : Some(a_index),
      b_index : None,
      from    : Some(from),
      to      : None,
      cost
    }
  }

  fn insert(b_index: usize, to: Instruction, cost: f64) -> EditOperation {
    EditOperation{
      kind    : EditKind::Insert,
      a_index : None,
      b_index : Some(b_index),
      from    : None,
      to      : Some(to),
      cost
    }
  }

  fn diagonal(a_index: usize, from: Instruction, b_index: usize, to: Instruction, cost: f64)
    -> EditOperation
  {
    let kind = match cost.abs() < TIE_EPSILON {
      true  => EditKind::Keep,
      false => EditKind::Substitute
    };
    EditOperation{
      kind,
      a_index : Some(a_index),
      b_index : Some(b_index),
      from    : Some(from),
      to      : Some(to),
      cost
    }
  }

  /// The index into A, or -1 for an insertion.
  pub fn source_index(&self) -> isize {
    self.a_index.map_or(-1, |i| i as isize)
  }

  /// The index into B, or -1 for a deletion.
  pub fn target_index(&self) -> isize {
    self.b_index.map_or(-1, |j| j as isize)
  }
}

fn display_index(index: Option<usize>) -> String {
  index.map_or_else(|| "-".to_string(), |i| i.to_string())
}

fn display_instruction(instruction: &Option<Instruction>) -> String {
  instruction.map_or_else(String::new, |i| i.to_string())
}

impl Display for EditOperation {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.kind {
      EditKind::Insert => {
        write!(f, "insert B[{}] {} ({})", display_index(self.b_index), display_instruction(&self.to), self.cost)
      }
      EditKind::Delete => {
        write!(f, "delete A[{}] {} ({})", display_index(self.a_index), display_instruction(&self.from), self.cost)
      }
      kind => {
        write!(
          f,
          "{} A[{}] {} -> B[{}] {} ({})",
          kind,
          display_index(self.a_index), display_instruction(&self.from),
          display_index(self.b_index), display_instruction(&self.to),
          self.cost
        )
      }
    }
  }
}

/// An ordered sequence of edit operations turning sequence A into sequence B.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditScript(Vec<EditOperation>);

impl EditScript {
  /**
    The sum of the operation costs, accumulated from the first operation to the last. This is
    the same sequence of additions the lattice performs along the chosen path, so it equals
    `crate::distance::distance` exactly.
  */
  pub fn total_cost(&self) -> f64 {
    self.0.iter().fold(0.0, |total, operation| total + operation.cost)
  }

  /// The number of operations of the given kind.
  pub fn count(&self, kind: EditKind) -> usize {
    self.0.iter().filter(|operation| operation.kind == kind).count()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, EditOperation> {
    self.0.iter()
  }

  pub fn operations(&self) -> &[EditOperation] {
    &self.0
  }

  pub fn into_inner(self) -> Vec<EditOperation> {
    self.0
  }
}

impl<'a> IntoIterator for &'a EditScript {
  type Item = &'a EditOperation;
  type IntoIter = std::slice::Iter<'a, EditOperation>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

impl IntoIterator for EditScript {
  type Item = EditOperation;
  type IntoIter = std::vec::IntoIter<EditOperation>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

/// The cost lattice and the choice table, side by side, row major.
struct Lattice {
  columns : usize,
  costs   : Vec<f64>,
  choices : Vec<EditKind>,
}

impl Lattice {
  fn new(rows: usize, columns: usize) -> Lattice {
    Lattice{
      columns,
      costs   : vec![0.0; rows * columns],
      choices : vec![EditKind::Keep; rows * columns],
    }
  }

  #[inline]
  fn idx(&self, i: usize, j: usize) -> usize {
    i * self.columns + j
  }

  #[inline]
  fn cost(&self, i: usize, j: usize) -> f64 {
    self.costs[self.idx(i, j)]
  }

  #[inline]
  fn set(&mut self, i: usize, j: usize, cost: f64, choice: EditKind) {
    let idx = self.idx(i, j);
    self.costs[idx]   = cost;
    self.choices[idx] = choice;
  }

  #[inline]
  fn choice(&self, i: usize, j: usize) -> EditKind {
    self.choices[self.idx(i, j)]
  }
}

fn fill_lattice(a: &[Instruction], b: &[Instruction], weights: &DistanceWeights) -> Lattice {
  let (n, m) = (a.len(), b.len());
  let mut lattice = Lattice::new(n + 1, m + 1);

  for i in 1..=n {
    let cost = lattice.cost(i - 1, 0) + weights.delete;
    lattice.set(i, 0, cost, EditKind::Delete);
  }
  for j in 1..=m {
    let cost = lattice.cost(0, j - 1) + weights.insert;
    lattice.set(0, j, cost, EditKind::Insert);
  }

  for i in 1..=n {
    for j in 1..=m {
      let (cost, step) = cheapest_step(
        lattice.cost(i - 1, j - 1) + substitution_cost(&a[i - 1], &b[j - 1], weights),
        lattice.cost(i - 1, j)     + weights.delete,
        lattice.cost(i, j - 1)     + weights.insert
      );
      lattice.set(i, j, cost, recorded_kind(step));
    }
  }

  lattice
}

/**
  Computes a cheapest sequence of operations turning `a` into `b` under `weights`. The costs of
  the operations sum to `distance(a, b, weights)`.

  Diagonal steps between identical instructions are reported as `EditKind::Keep` with cost 0.
*/
pub fn edit_script(a: &[Instruction], b: &[Instruction], weights: &DistanceWeights) -> EditScript {
  let lattice = fill_lattice(a, b, weights);
  let mut operations = Vec::with_capacity(a.len().max(b.len()));

  let (mut i, mut j) = (a.len(), b.len());
  while i > 0 || j > 0 {
    let operation = match lattice.choice(i, j) {
      EditKind::Insert => {
        j -= 1;
        EditOperation::insert(j, b[j], weights.insert)
      }
      EditKind::Delete => {
        i -= 1;
        EditOperation::delete(i, a[i], weights.delete)
      }
      EditKind::Keep | EditKind::Substitute => {
        i -= 1;
        j -= 1;
        EditOperation::diagonal(i, a[i], j, b[j], substitution_cost(&a[i], &b[j], weights))
      }
    };

    #[cfg(feature = "trace_alignment")]
    trace!(cell = ?(i, j), operation = %operation, "backtrace step");

    operations.push(operation);
  }

  operations.reverse();
  EditScript(operations)
}

lazy_static! {
  /// Borderless columns with a double rule under the titles and a single rule above the total.
  static ref SCRIPT_TABLE_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator(' ')
      .separators(
        &[TableFormat::LinePosition::Title],
        TableFormat::LineSeparator::new('═', '═', '═', '═')
      )
      .separators(
        &[TableFormat::LinePosition::Bottom],
        TableFormat::LineSeparator::new('─', '─', '─', '─')
      )
      .padding(0, 2)
      .build();
}

impl EditScript {
  fn make_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*SCRIPT_TABLE_FORMAT);
    table.set_titles(row![ubr->"#", ubl->"Kind", ubr->"A", ubl->"From", ubr->"B", ubl->"To", ubr->"Cost"]);

    for (step, operation) in self.0.iter().enumerate() {
      table.add_row(row![
        r->step,
        operation.kind,
        r->display_index(operation.a_index),
        display_instruction(&operation.from),
        r->display_index(operation.b_index),
        display_instruction(&operation.to),
        r->format!("{:.6}", operation.cost)
      ]);
    }
    table
  }
}

/// Renders the script as a table followed by its total cost.
impl Display for EditScript {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}Total cost: {}", self.make_table(), self.total_cost())
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use crate::distance::distance;
  use crate::redcode::{parse, AddressingMode::*, Modifier, OpCode, OperandType};

  fn mov_i(a: OperandType, b: OperandType) -> Instruction {
    Instruction::new(OpCode::Mov, Modifier::I, Direct, a, Direct, b)
  }

  fn dat_f() -> Instruction {
    Instruction::new(OpCode::Dat, Modifier::F, Immediate, 0, Immediate, 0)
  }

  #[test]
  fn single_substitution(){
    let weights = DistanceWeights::default();
    let script = edit_script(&[mov_i(0, 1)], &[mov_i(0, 2)], &weights);
    assert_eq!(script.len(), 1);
    let operation = &script.operations()[0];
    assert_eq!(operation.kind, EditKind::Substitute);
    assert_eq!(operation.cost, 0.000125);
    assert_eq!((operation.source_index(), operation.target_index()), (0, 0));
    assert_eq!(operation.from, Some(mov_i(0, 1)));
    assert_eq!(operation.to, Some(mov_i(0, 2)));
    assert_eq!(script.total_cost(), 0.000125);
  }

  #[test]
  fn single_deletion(){
    let script = edit_script(&[dat_f()], &[], &DistanceWeights::default());
    assert_eq!(
      script.into_inner(),
      vec![EditOperation::delete(0, dat_f(), 1.0)]
    );
  }

  #[test]
  fn insertions_only(){
    let b = vec![mov_i(0, 1), dat_f()];
    let script = edit_script(&[], &b, &DistanceWeights::default());
    let kinds: Vec<EditKind> = script.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![EditKind::Insert, EditKind::Insert]);
    assert_eq!(script.operations()[0].target_index(), 0);
    assert_eq!(script.operations()[1].target_index(), 1);
    assert_eq!(script.operations()[0].source_index(), -1);
  }

  #[test]
  fn empty_to_empty(){
    let script = edit_script(&[], &[], &DistanceWeights::default());
    assert!(script.is_empty());
    assert_eq!(script.total_cost(), 0.0);
  }

  #[test]
  fn keeps_around_an_insertion(){
    let a = vec![mov_i(0, 1), mov_i(2, 3)];
    let b = vec![mov_i(0, 1), dat_f(), mov_i(2, 3)];
    let script = edit_script(&a, &b, &DistanceWeights::default());
    let summary: Vec<(EditKind, isize, isize)> =
      script.iter().map(|op| (op.kind, op.source_index(), op.target_index())).collect();
    assert_eq!(
      summary,
      vec![
        (EditKind::Keep,   0,  0),
        (EditKind::Insert, -1, 1),
        (EditKind::Keep,   1,  2),
      ]
    );
    assert_eq!(script.count(EditKind::Keep), 2);
    assert_eq!(script.total_cost(), 1.0);
  }

  #[test]
  fn tie_prefers_diagonal_then_delete(){
    // Substituting costs exactly as much as deleting and inserting.
    let weights = DistanceWeights{
      opcode: 1.0, modifier: 0.5, mode_a: 0.5, mode_b: 0.0, ..DistanceWeights::default()
    };
    let a = vec![Instruction::new(OpCode::Mov, Modifier::I, Direct, 0, Immediate, 0)];
    let b = vec![Instruction::new(OpCode::Dat, Modifier::F, Immediate, 0, Immediate, 0)];
    assert_eq!(substitution_cost(&a[0], &b[0], &weights), 2.0);

    let script = edit_script(&a, &b, &weights);
    assert_eq!(script.len(), 1);
    assert_eq!(script.operations()[0].kind, EditKind::Substitute);

    // Now the diagonal is strictly worse. Entering the last cell by deletion beats entering it
    // by insertion, so the deletion comes last.
    let weights = DistanceWeights{ opcode: 5.0, ..weights };
    let script = edit_script(&a, &b, &weights);
    let kinds: Vec<EditKind> = script.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![EditKind::Insert, EditKind::Delete]);
    assert_eq!(script.total_cost(), 2.0);
  }

  #[test]
  fn lattice_records_every_choice(){
    let a = vec![mov_i(0, 1), mov_i(2, 3)];
    let b = vec![mov_i(0, 1), dat_f(), mov_i(2, 3)];
    let lattice = fill_lattice(&a, &b, &DistanceWeights::default());
    assert_eq!(lattice.choice(0, 0), EditKind::Keep);
    assert_eq!(lattice.choice(2, 0), EditKind::Delete);
    assert_eq!(lattice.choice(0, 3), EditKind::Insert);
    assert_eq!(lattice.choice(1, 1), EditKind::Substitute);
    assert_eq!(lattice.choice(1, 2), EditKind::Insert);
    assert_eq!(lattice.choice(2, 3), EditKind::Substitute);
    assert_eq!(lattice.cost(2, 3), 1.0);
  }

  #[test]
  fn costs_sum_to_distance(){
    let a = parse("SPL.B #0, <-20\nMOV.I $1, }-1\nMOV.I $-2, >-2\nJMP.B $-2, <-100\nDAT.F #0, #0\nEND 0").unwrap();
    let b = parse("SPL.B #0, <-21\nMOV.I $1, }-1\nJMP.B $-1, <-100\nDAT.F #0, #1\nDAT.F #0, #0\nEND 0").unwrap();
    let weights = DistanceWeights{ insert: 0.7, delete: 1.3, ..DistanceWeights::default() };
    let script = a.edit_script_to(&b, &weights);
    assert_eq!(script.total_cost(), distance(&a.instructions, &b.instructions, &weights));
    assert_eq!(script.total_cost(), a.distance_to(&b, &weights));
  }

  #[test]
  fn kind_names(){
    assert_eq!(EditKind::Keep.to_string(), "keep");
    assert_eq!(EditKind::Substitute.to_string(), "substitute");
    assert_eq!(u8::from(EditKind::Insert), 2);
    assert_eq!(EditKind::try_from(3u8), Ok(EditKind::Delete));
    assert!(EditKind::try_from(4u8).is_err());
  }

  #[test]
  fn operation_display(){
    let script = edit_script(&[mov_i(0, 1)], &[mov_i(0, 2)], &DistanceWeights::default());
    assert_eq!(
      script.operations()[0].to_string(),
      "substitute A[0] MOV.I $0, $1 -> B[0] MOV.I $0, $2 (0.000125)"
    );
    assert_eq!(
      EditOperation::insert(3, dat_f(), 1.0).to_string(),
      "insert B[3] DAT.F #0, #0 (1)"
    );
  }

  #[test]
  fn table_rendering(){
    let a = vec![mov_i(0, 1), dat_f()];
    let b = vec![mov_i(0, 2)];
    let weights = DistanceWeights::default();
    let script = edit_script(&a, &b, &weights);
    let text = script.to_string();
    assert!(text.contains("substitute"));
    assert!(text.contains("delete"));
    assert!(text.contains("MOV.I $0, $2"));
    assert!(text.ends_with(&format!("Total cost: {}", distance(&a, &b, &weights))));
  }

}
