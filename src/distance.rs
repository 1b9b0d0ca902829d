/*!
  Weighted edit distance between instruction sequences.

  The distance is the cheapest way to turn sequence A into sequence B by deleting instructions
  of A, inserting instructions of B, and substituting an instruction of A with one of B. A
  substitution costs the sum of the mismatch costs of the fields that differ, so replacing
  `MOV.I $0, $1` with `MOV.I $0, $2` is far cheaper than deleting one and inserting the other.

  Operands are compared on the torus of the core: in a core of 8000 cells, operands `0` and
  `7999` address neighbouring cells, so they are `1/8000` apart, not `7999/8000`.

  The dynamic program here and the lattice in `crate::edit` make their choices with the same
  candidate order and the same tie tolerance, so the two always agree to the last bit.
*/

use crate::redcode::{Instruction, OperandType};

/// The core size of the standard '94 hill.
pub const DEFAULT_CORE_SIZE: i64 = 8000;

/// Two costs closer than this are considered tied. See `crate::edit` for the tie-break order.
pub(crate) const TIE_EPSILON: f64 = 1e-9;

/**
  The costs of the edit operations. `core_size` is the size of the circular core operands live
  in. A `core_size` of zero or less is a degenerate configuration in which any two differing
  operands are exactly 1 apart.

  None of the values are validated. Negative costs make for a meaningless distance.
*/
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceWeights {
  pub insert    : f64,
  pub delete    : f64,
  pub opcode    : f64,
  pub modifier  : f64,
  pub mode_a    : f64,
  pub mode_b    : f64,
  pub operand_a : f64,
  pub operand_b : f64,
  pub core_size : i64,
}

impl Default for DistanceWeights {
  fn default() -> Self {
    DistanceWeights {
      insert    : 1.0,
      delete    : 1.0,
      opcode    : 1.0,
      modifier  : 0.5,
      mode_a    : 0.5,
      mode_b    : 0.5,
      operand_a : 1.0,
      operand_b : 1.0,
      core_size : DEFAULT_CORE_SIZE,
    }
  }
}

impl DistanceWeights {
  pub fn with_core_size(self, core_size: i64) -> DistanceWeights {
    DistanceWeights{ core_size, ..self }
  }
}

/**
  The distance between two operands in `[0, 1]`.

  With a positive `core_size`, the difference is reduced modulo the core size and measured the
  short way around, then scaled by the core size. Otherwise the result is `min(1, |x - y|)`.
*/
pub fn operand_distance(x: OperandType, y: OperandType, core_size: i64) -> f64 {
  let delta: u128 = (x as i128 - y as i128).unsigned_abs();

  if core_size <= 0 {
    return (delta as f64).min(1.0);
  }

  let core      = core_size as u128;
  let remainder = delta % core;
  let wrapped   = remainder.min(core - remainder);
  wrapped as f64 / core_size as f64
}

/// The cost of substituting `b` for `a`. Identical instructions cost exactly zero.
pub fn substitution_cost(a: &Instruction, b: &Instruction, weights: &DistanceWeights) -> f64 {
  if a == b {
    return 0.0;
  }

  let mut cost = 0.0;
  if a.opcode != b.opcode {
    cost += weights.opcode;
  }
  if a.modifier != b.modifier {
    cost += weights.modifier;
  }
  if a.mode_a != b.mode_a {
    cost += weights.mode_a;
  }
  if a.mode_b != b.mode_b {
    cost += weights.mode_b;
  }
  cost += weights.operand_a * operand_distance(a.a, b.a, weights.core_size);
  cost += weights.operand_b * operand_distance(a.b, b.b, weights.core_size);
  cost
}

/**
  Chooses among the three ways into a lattice cell. The diagonal is the incumbent; deletion
  and then insertion only displace it when they are cheaper by more than `TIE_EPSILON`.
  Returns the cost of the cell and which way was taken.
*/
#[inline]
pub(crate) fn cheapest_step(diagonal: f64, deletion: f64, insertion: f64) -> (f64, Step) {
  let mut best = (diagonal, Step::Diagonal);
  if deletion + TIE_EPSILON < best.0 {
    best = (deletion, Step::Delete);
  }
  if insertion + TIE_EPSILON < best.0 {
    best = (insertion, Step::Insert);
  }
  best
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Step {
  Diagonal,
  Delete,
  Insert,
}

/**
  The weighted edit distance between `a` and `b`. Runs in `O(len(a)·len(b))` time and keeps only
  two rows of the lattice.

  An empty `a` costs one insertion per instruction of `b`, and an empty `b` one deletion per
  instruction of `a`. Those costs are accumulated one addition at a time, exactly as
  `EditScript::total_cost` accumulates them, so they equal `len(b)·insert` (resp.
  `len(a)·delete`) only when the repeated sums are exact, as they are for integral and small
  dyadic costs such as the defaults. With a cost like `0.1`, ten insertions come to
  `0.9999999999999999`, not `1.0`.
*/
pub fn distance(a: &[Instruction], b: &[Instruction], weights: &DistanceWeights) -> f64 {
  let columns = b.len() + 1;
  let mut previous = vec![0.0f64; columns];
  let mut current  = vec![0.0f64; columns];

  for j in 1..columns {
    previous[j] = previous[j - 1] + weights.insert;
  }

  for source in a {
    current[0] = previous[0] + weights.delete;
    for (j, target) in b.iter().enumerate() {
      let (cost, _step) = cheapest_step(
        previous[j]     + substitution_cost(source, target, weights),
        previous[j + 1] + weights.delete,
        current[j]      + weights.insert
      );
      current[j + 1] = cost;
    }
    std::mem::swap(&mut previous, &mut current);
  }

  previous[columns - 1]
}

/**
  A score in `[0, 1]` where 1 means identical sequences and 0 means the sequences are at least
  as far apart as deleting all of the longer side would make them:

    ```text
    similarity = clamp(1 - distance / max(len(a)·delete, len(b)·insert), 0, 1)
    ```

  Two empty sequences are identical. With heavy field weights a substitution can cost more
  than a deletion plus an insertion would normalize to, in which case the score bottoms out
  at 0.
*/
pub fn similarity(a: &[Instruction], b: &[Instruction], weights: &DistanceWeights) -> f64 {
  let denominator = (a.len() as f64 * weights.delete).max(b.len() as f64 * weights.insert);
  if denominator <= 0.0 {
    return 1.0;
  }

  let score = 1.0 - distance(a, b, weights) / denominator;
  score.max(0.0).min(1.0)
}
