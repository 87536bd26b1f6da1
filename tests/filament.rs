use ankermake_monitor::filament::{KNOWN_FILAMENTS, classify};
use ankermake_monitor::FilamentType;

#[test]
fn test_reference_names() {
    assert_eq!(classify("PLA_HOLDER_PETG_M5.gcode"), FilamentType::Petg);
    assert_eq!(classify("NYLON_PETG_PLA_ABS.gcode"), FilamentType::Abs);
    assert_eq!(classify("pla+.gcode"), FilamentType::Pla);
    assert_eq!(classify("notpla.gcode"), FilamentType::Unknown);
    assert_eq!(classify("Playground_Part_1.gcode"), FilamentType::Unknown);
}

#[test]
fn test_names_without_tokens_are_unknown() {
    for name in [
        "benchy.gcode",
        "Calibration Cube 20mm.gcode",
        "phone_stand_v2_M5.gcode",
        "",
        "____",
    ] {
        assert_eq!(classify(name), FilamentType::Unknown, "{name}");
    }
}

#[test]
fn test_single_whole_word_token_in_any_case() {
    for filament in KNOWN_FILAMENTS {
        let upper = filament.name().to_ascii_uppercase();
        let lower = filament.name().to_ascii_lowercase();
        for name in [
            format!("{upper}.gcode"),
            format!("{lower}.gcode"),
            format!("bracket_{lower}_0.2mm_M5.gcode"),
            format!("holder-{upper}+.gcode"),
        ] {
            assert_eq!(classify(&name), filament, "{name}");
        }
    }
}

#[test]
fn test_embedded_in_longer_words() {
    assert_eq!(classify("absolute_unit.gcode"), FilamentType::Unknown);
    assert_eq!(classify("woodland_sign.gcode"), FilamentType::Unknown);
    assert_eq!(classify("pet_bowl.gcode"), FilamentType::Unknown);
    assert_eq!(classify("PLA2.gcode"), FilamentType::Unknown);
}

#[test]
fn test_rightmost_valid_token_wins() {
    assert_eq!(classify("abs_insert_for_pla_body.gcode"), FilamentType::Pla);
    assert_eq!(classify("TPU_gasket_ASA_housing_notpc.gcode"), FilamentType::Asa);
    assert_eq!(classify("PETG.PLA.gcode"), FilamentType::Pla);
}
