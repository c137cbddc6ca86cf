//! Enum label dictionaries between the dashboard and the backend.

/// Which way a value is being translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// Dashboard label → backend value.
  ToWire,
  /// Backend value → dashboard label.
  FromWire,
}

/// A bijective table of `(label, wire value)` pairs.
#[derive(Debug)]
pub struct Dictionary {
  pub name:  &'static str,
  pub pairs: &'static [(&'static str, &'static str)],
}

pub static DOCUMENT_TYPES: Dictionary = Dictionary {
  name:  "document type",
  pairs: &[("Cédula", "Citizen ID"), ("Tarjeta de identidad", "ID Card")],
};

pub static GENDERS: Dictionary = Dictionary {
  name:  "gender",
  pairs: &[
    ("Masculino", "Male"),
    ("Femenino", "Female"),
    ("No binario", "Non-binary"),
    ("Prefiero no reportar", "Prefer not to say"),
  ],
};

impl Dictionary {
  /// Strict lookup: `None` when `value` is not in the table.
  pub fn lookup(&self, value: &str, direction: Direction) -> Option<&'static str> {
    self.pairs.iter().find_map(|&(label, wire)| match direction {
      Direction::ToWire if label == value => Some(wire),
      Direction::FromWire if wire == value => Some(label),
      _ => None,
    })
  }

  /// Lenient lookup: values outside the table come back unchanged.
  pub fn translate<'a>(&self, value: &'a str, direction: Direction) -> &'a str {
    match self.lookup(value, direction) {
      Some(mapped) => mapped,
      None => {
        if !value.is_empty() {
          tracing::debug!(dictionary = self.name, value, ?direction, "unmapped value passed through");
        }
        value
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_label_round_trips() {
    for dict in [&DOCUMENT_TYPES, &GENDERS] {
      for &(label, wire) in dict.pairs {
        assert_eq!(dict.translate(label, Direction::ToWire), wire);
        assert_eq!(
          dict.translate(dict.translate(label, Direction::ToWire), Direction::FromWire),
          label
        );
      }
    }
  }

  #[test]
  fn exact_wire_values() {
    assert_eq!(DOCUMENT_TYPES.lookup("Cédula", Direction::ToWire), Some("Citizen ID"));
    assert_eq!(DOCUMENT_TYPES.lookup("ID Card", Direction::FromWire), Some("Tarjeta de identidad"));
    assert_eq!(GENDERS.lookup("No binario", Direction::ToWire), Some("Non-binary"));
    assert_eq!(GENDERS.lookup("Prefer not to say", Direction::FromWire), Some("Prefiero no reportar"));
  }

  #[test]
  fn unmapped_values_pass_through() {
    assert_eq!(GENDERS.lookup("Otro", Direction::ToWire), None);
    assert_eq!(GENDERS.translate("Otro", Direction::ToWire), "Otro");
    assert_eq!(DOCUMENT_TYPES.translate("Passport", Direction::FromWire), "Passport");
  }

  #[test]
  fn lookup_is_direction_aware() {
    // A wire value is not a label.
    assert_eq!(GENDERS.lookup("Male", Direction::ToWire), None);
    assert_eq!(GENDERS.lookup("Masculino", Direction::FromWire), None);
  }
}
