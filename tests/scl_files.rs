use std::path::PathBuf;

use assert_approx_eq::assert_approx_eq;
use scala_notemap::{
    midi::PitchWheel,
    note_map::{MapperConfig, NoteMap, NoteMapper},
    scala::{self, LoadError, ScaleDegrees, SclParseErrorKind},
};

fn test_file(file_name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data", file_name]
        .iter()
        .collect()
}

#[test]
fn load_harmonics() {
    let note_map = scala::load_note_map(test_file("harm6.scl"), MapperConfig::default()).unwrap();

    assert_eq!(note_map.ratio_of(60), 1.0);
    assert_eq!(note_map.ratio_of(61), 9.0 / 8.0);
    assert_eq!(note_map.ratio_of(62), 5.0 / 4.0);
    assert_eq!(note_map.ratio_of(63), 11.0 / 8.0);
    assert_eq!(note_map.ratio_of(64), 3.0 / 2.0);
    assert_eq!(note_map.ratio_of(65), 7.0 / 4.0);
    assert_eq!(note_map.ratio_of(66), 2.0 / 1.0);

    assert_eq!(note_map.frequency_of(60), 261.63);
}

#[test]
fn load_description() {
    let degrees = ScaleDegrees::load(test_file("riley_albion.scl")).unwrap();

    assert_eq!(
        degrees.description(),
        "Terry Riley's Harp of New Albion scale, inverse Malcolm's Monochord, 1/1=C#"
    );
    assert_eq!(degrees.num_degrees(), 12);

    let note_map = NoteMap::build(&degrees, MapperConfig::default());
    assert_eq!(note_map.ratio_of(67), 1.5);
    assert_approx_eq!(note_map.ratio_of(48), 0.5);
}

#[test]
fn load_scale_that_is_too_big_for_midi() {
    let note_map =
        scala::load_note_map(test_file("fortune.scl"), MapperConfig::default()).unwrap();

    let map_size = note_map.size();
    assert_eq!(map_size, 613);
    assert_eq!(note_map.ratio_of(612), 2.0);
    assert_eq!(note_map.ratio_of(map_size as i32 - 1), 2.0);
    assert_eq!(note_map.ratio_of(0), 1.0);
    assert_approx_eq!(note_map.ratio_of(306), 2f64.sqrt());
    assert_eq!(note_map.ratio_of(1000), 2.0);
}

#[test]
fn parse_error() {
    let result = scala::load_note_map(test_file("parse_error.scl"), MapperConfig::default());

    match result {
        Err(LoadError::Parse(err)) => {
            assert_eq!(err.kind, SclParseErrorKind::EntryCountMismatch)
        }
        other => panic!("Expected parse error but got {other:?}"),
    }
}

#[test]
fn non_existent_file() {
    let result = scala::load_note_map(test_file("non_existent.scl"), MapperConfig::default());

    match result {
        Err(LoadError::ResourceNotFound { path, .. }) => {
            assert_eq!(path, test_file("non_existent.scl"))
        }
        other => panic!("Expected file not found but got {other:?}"),
    }
}

#[test]
fn mapper_switches_between_files() {
    let mut mapper = NoteMapper::new(MapperConfig {
        center_frequency: 440.0,
        pitch_bend_range_up: 1,
        pitch_bend_range_down: 1,
        ..MapperConfig::default()
    });

    mapper.load_scl_file(test_file("harm6.scl")).unwrap();
    let harmonics = mapper.snapshot();

    assert!(mapper.load_scl_file(test_file("parse_error.scl")).is_err());
    assert_eq!(mapper.snapshot(), harmonics);

    mapper.load_scl_file(test_file("riley_albion.scl")).unwrap();
    let albion = mapper.snapshot();

    assert_approx_eq!(harmonics.frequency_of(64), 660.0);
    assert_approx_eq!(
        harmonics.frequency_with_pitch_wheel(63, PitchWheel::MAX),
        660.0
    );
    assert_approx_eq!(albion.frequency_of(64), 550.0);
}
