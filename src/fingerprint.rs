/*!
  Content fingerprints of parsed warriors.

  A fingerprint is the SHA-256 digest of the warrior's canonical assembly, written as 64
  lowercase hex digits. Since the digest is taken over the formatter's output rather than the
  text the warrior was parsed from, padding and letter case in the input never affect it.
*/

use sha2::{Digest, Sha256};

use crate::redcode::{FormatOptions, ParsedProgram};

/**
  Selects which parts of a warrior the digest covers. The default ignores the name and author,
  so the fingerprint follows the code rather than its labelling, but includes the END offset,
  since where execution starts changes what the code does.
*/
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FingerprintOptions {
  pub include_name   : bool,
  pub include_author : bool,
  pub include_end    : bool,
}

impl Default for FingerprintOptions {
  fn default() -> Self {
    FingerprintOptions {
      include_name   : false,
      include_author : false,
      include_end    : true,
    }
  }
}

impl From<FingerprintOptions> for FormatOptions {
  fn from(options: FingerprintOptions) -> Self {
    FormatOptions {
      include_name   : options.include_name,
      include_author : options.include_author,
      include_end    : options.include_end,
    }
  }
}

pub fn fingerprint(program: &ParsedProgram, options: &FingerprintOptions) -> String {
  let text = program.format(&FormatOptions::from(*options));
  format!("{:x}", Sha256::digest(text.as_bytes()))
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::redcode::parse;
  use string_cache::DefaultAtom;

  const IMP: &str = ";name Imp\n;author A. K. Dewdney\nMOV.I $0, $1\nEND 0";

  #[test]
  fn digest_shape(){
    let print = parse(IMP).unwrap().fingerprint();
    assert_eq!(print.len(), 64);
    assert!(print.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn known_digest(){
    // SHA-256 of the empty string.
    let empty = ParsedProgram::default();
    let options = FingerprintOptions{ include_name: false, include_author: false, include_end: false };
    assert_eq!(
      fingerprint(&empty, &options),
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }

  #[test]
  fn padding_is_invisible(){
    let padded = parse("mov.i $     0, $     1\n  END   0").unwrap();
    let plain  = parse(IMP).unwrap();
    assert_eq!(padded.fingerprint(), plain.fingerprint());
  }

  #[test]
  fn default_ignores_metadata(){
    let original = parse(IMP).unwrap();
    let renamed  = ParsedProgram{
      name   : Some(DefaultAtom::from("Not An Imp")),
      author : None,
      ..original.clone()
    };
    assert_eq!(original.fingerprint(), renamed.fingerprint());

    let with_name = FingerprintOptions{ include_name: true, ..FingerprintOptions::default() };
    assert_ne!(fingerprint(&original, &with_name), fingerprint(&renamed, &with_name));
  }

  #[test]
  fn end_offset_matters_only_when_included(){
    let original = parse(IMP).unwrap();
    let moved    = ParsedProgram{ end: 1, ..original.clone() };
    assert_ne!(original.fingerprint(), moved.fingerprint());

    let without_end = FingerprintOptions{ include_end: false, ..FingerprintOptions::default() };
    assert_eq!(fingerprint(&original, &without_end), fingerprint(&moved, &without_end));
  }

  #[test]
  fn instructions_matter(){
    let original = parse(IMP).unwrap();
    let changed  = parse("MOV.I $0, $2\nEND 0").unwrap();
    assert_ne!(original.fingerprint(), changed.fingerprint());
  }

}
