//! Filament type inference from job names, plus the per-material tables used to
//! turn a filament length into weight and volume.
//!
//! The printer never reports which material is loaded, so the only hint is the
//! job name. Slicer output tends to carry the material somewhere in the file
//! name (`PLA_HOLDER_PETG_M5.gcode`), and when more than one appears the last
//! properly delimited one wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Materials the classifier knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilamentType {
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "ABS")]
    Abs,
    #[serde(rename = "PETG")]
    Petg,
    Nylon,
    #[serde(rename = "TPU")]
    Tpu,
    #[serde(rename = "PC")]
    Pc,
    Wood,
    #[serde(rename = "CF")]
    CarbonFiber,
    #[serde(rename = "HIPS")]
    Hips,
    #[serde(rename = "PVA")]
    Pva,
    #[serde(rename = "ASA")]
    Asa,
    #[serde(rename = "PP")]
    Polypropylene,
    #[serde(rename = "POM")]
    Acetal,
    #[serde(rename = "PMMA")]
    Pmma,
    #[serde(rename = "FPE")]
    Fpe,
    #[default]
    Unknown,
}

/// Search order for tokens. `Unknown` is deliberately absent.
pub const KNOWN_FILAMENTS: [FilamentType; 15] = [
    FilamentType::Pla,
    FilamentType::Abs,
    FilamentType::Petg,
    FilamentType::Nylon,
    FilamentType::Tpu,
    FilamentType::Pc,
    FilamentType::Wood,
    FilamentType::CarbonFiber,
    FilamentType::Hips,
    FilamentType::Pva,
    FilamentType::Asa,
    FilamentType::Polypropylene,
    FilamentType::Acetal,
    FilamentType::Pmma,
    FilamentType::Fpe,
];

impl FilamentType {
    /// Human readable name, as shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            FilamentType::Pla => "PLA",
            FilamentType::Abs => "ABS",
            FilamentType::Petg => "PETG",
            FilamentType::Nylon => "Nylon",
            FilamentType::Tpu => "TPU",
            FilamentType::Pc => "PC",
            FilamentType::Wood => "Wood",
            FilamentType::CarbonFiber => "CF",
            FilamentType::Hips => "HIPS",
            FilamentType::Pva => "PVA",
            FilamentType::Asa => "ASA",
            FilamentType::Polypropylene => "PP",
            FilamentType::Acetal => "POM",
            FilamentType::Pmma => "PMMA",
            FilamentType::Fpe => "FPE",
            FilamentType::Unknown => "Unknown",
        }
    }

    /// Upper-case token searched for in job names.
    fn token(&self) -> &'static str {
        match self {
            FilamentType::Nylon => "NYLON",
            FilamentType::Wood => "WOOD",
            other => other.name(),
        }
    }

    /// Grams per metre of 1.75 mm filament. Unlisted materials use PLA.
    pub fn weight_per_meter(&self) -> f64 {
        match self {
            FilamentType::Pla | FilamentType::Unknown => 2.98,
            FilamentType::Abs => 2.50,
            FilamentType::Petg => 3.05,
            FilamentType::Nylon => 3.65,
            FilamentType::Tpu => 2.91,
            FilamentType::Pc => 3.13,
            FilamentType::Wood => 3.08,
            FilamentType::CarbonFiber => 3.13,
            FilamentType::Hips => 2.48,
            FilamentType::Pva => 2.96,
            FilamentType::Asa => 2.52,
            FilamentType::Polypropylene => 2.16,
            FilamentType::Acetal => 3.37,
            FilamentType::Pmma => 2.84,
            FilamentType::Fpe => 5.19,
        }
    }

    /// Density in g/cm³. Unlisted materials use PLA.
    pub fn density(&self) -> f64 {
        match self {
            FilamentType::Pla | FilamentType::Unknown => 1.24,
            FilamentType::Abs => 1.04,
            FilamentType::Petg => 1.27,
            FilamentType::Nylon => 1.52,
            FilamentType::Tpu => 1.21,
            FilamentType::Pc => 1.30,
            FilamentType::Wood => 1.28,
            FilamentType::CarbonFiber => 1.30,
            FilamentType::Hips => 1.03,
            FilamentType::Pva => 1.23,
            FilamentType::Asa => 1.05,
            FilamentType::Polypropylene => 0.90,
            FilamentType::Acetal => 1.40,
            FilamentType::Pmma => 1.18,
            FilamentType::Fpe => 2.16,
        }
    }
}

impl fmt::Display for FilamentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token occurrence inside a job name, as byte offsets.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    filament: FilamentType,
}

/// Guess the material from a job name.
///
/// Every occurrence of every known token is collected, then the candidates are
/// checked from the rightmost one backwards. The first candidate that stands as
/// a whole word (delimited by the string edge, punctuation or an underscore)
/// wins. Returns [`FilamentType::Unknown`] when nothing qualifies.
pub fn classify(job_name: &str) -> FilamentType {
    // ASCII upper-casing keeps byte offsets aligned with `job_name`.
    let haystack = job_name.to_ascii_uppercase();
    let mut candidates = Vec::new();

    for filament in KNOWN_FILAMENTS {
        let token = filament.token();
        let mut from = 0;
        while let Some(pos) = haystack[from..].find(token) {
            let start = from + pos;
            candidates.push(Candidate {
                start,
                end: start + token.len(),
                filament,
            });
            from = start + 1;
        }
    }

    candidates.sort_by_key(|c| c.start);

    candidates
        .iter()
        .rev()
        .find(|c| is_whole_word(job_name, c.start, c.end))
        .map(|c| c.filament)
        .unwrap_or(FilamentType::Unknown)
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    is_delimiter(before) && is_delimiter(after)
}

fn is_delimiter(c: Option<char>) -> bool {
    match c {
        None => true,
        Some('_') => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_delimited_token_wins() {
        assert_eq!(classify("PLA_HOLDER_PETG_M5.gcode"), FilamentType::Petg);
        assert_eq!(classify("NYLON_PETG_PLA_ABS.gcode"), FilamentType::Abs);
        assert_eq!(classify("PETG_HOLDER_M5.gcode"), FilamentType::Petg);
    }

    #[test]
    fn test_embedded_tokens_are_rejected() {
        assert_eq!(classify("Playground_Part_1.gcode"), FilamentType::Unknown);
        assert_eq!(classify("notpla.gcode"), FilamentType::Unknown);
        assert_eq!(classify("PLANET.gcode"), FilamentType::Unknown);
        assert_eq!(classify("PCTG_bracket.gcode"), FilamentType::Unknown);
    }

    #[test]
    fn test_embedded_token_does_not_hide_an_earlier_valid_one() {
        // "PLANET" is rightmost but invalid, so the earlier ASA is used.
        assert_eq!(classify("ASA_PLANET.gcode"), FilamentType::Asa);
    }

    #[test]
    fn test_case_and_punctuation() {
        assert_eq!(classify("pla.gcode"), FilamentType::Pla);
        assert_eq!(classify("pla+.gcode"), FilamentType::Pla);
        assert_eq!(classify("nYlOn.gcode"), FilamentType::Nylon);
        assert_eq!(classify("benchy-tpu.gcode"), FilamentType::Tpu);
        assert_eq!(classify("vase (pmma).gcode"), FilamentType::Pmma);
    }

    #[test]
    fn test_no_token() {
        assert_eq!(classify(""), FilamentType::Unknown);
        assert_eq!(classify("calibration_cube.gcode"), FilamentType::Unknown);
    }

    #[test]
    fn test_unknown_uses_pla_tables() {
        assert_eq!(FilamentType::Unknown.weight_per_meter(), FilamentType::Pla.weight_per_meter());
        assert_eq!(FilamentType::Unknown.density(), FilamentType::Pla.density());
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&FilamentType::CarbonFiber).unwrap();
        assert_eq!(json, "\"CF\"");
        assert_eq!(FilamentType::Nylon.to_string(), "Nylon");
    }
}
