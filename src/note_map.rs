//! Lookup tables from note numbers to pitch ratios and frequencies.

use std::{path::Path, sync::Arc};

use crate::{
    math,
    midi::PitchWheel,
    scala::{LoadError, ScaleDegrees},
};

/// Note number mapped to the unison (`1.0`) when nothing else is configured.
pub const DEFAULT_CENTER_NOTE: i32 = 60;

/// Frequency of [`DEFAULT_CENTER_NOTE`]. C at 261.63 Hz puts the A above at 440 Hz.
pub const DEFAULT_CENTER_FREQUENCY: f64 = 261.63;

/// Default pitch-bend range in scale degrees, both up and down.
pub const DEFAULT_PITCH_BEND_RANGE: i32 = 12;

/// Number of entries of a periodically expanded table (MIDI notes 0..=127).
pub const NUM_MIDI_NOTES: usize = 128;

/// Scales with more degrees than this are used verbatim instead of being repeated.
pub const MAX_PERIODIC_DEGREES: usize = 127;

// Octave ratios at or below this value are replaced by 1.0
const MIN_OCTAVE_RATIO: f64 = 1e-8;

/// Settings that determine how a [`NoteMap`] is built and queried.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapperConfig {
    /// The note mapped to the unison and to `center_frequency`.
    pub center_note: i32,
    /// Frequency in Hz of `center_note`.
    pub center_frequency: f64,
    /// Scale degrees reached by a pitch wheel at its upper end.
    pub pitch_bend_range_up: i32,
    /// Scale degrees reached by a pitch wheel at its lower end.
    pub pitch_bend_range_down: i32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            center_note: DEFAULT_CENTER_NOTE,
            center_frequency: DEFAULT_CENTER_FREQUENCY,
            pitch_bend_range_up: DEFAULT_PITCH_BEND_RANGE,
            pitch_bend_range_down: DEFAULT_PITCH_BEND_RANGE,
        }
    }
}

/// An immutable table mapping note numbers to ratios relative to the center note.
///
/// Scales with up to [`MAX_PERIODIC_DEGREES`] degrees are repeated up and down from the center note, filling all [`NUM_MIDI_NOTES`] entries.
/// The octave does not need to be 2, so shrunk or stretched scales repeat accordingly.
/// Larger scales are available as is, i.e. entry `n` is degree `n` of the scale, so an octave can be divided into hundreds of parts.
///
/// Queries never fail. Note numbers out of range are clamped to the first or last entry.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::note_map::{MapperConfig, NoteMap};
/// # use scala_notemap::scala::ScaleDegrees;
/// let degrees = ScaleDegrees::from_ratios("Tritave", [5.0 / 3.0, 3.0]);
/// let note_map = NoteMap::build(&degrees, MapperConfig::default());
///
/// assert_eq!(note_map.size(), 128);
/// assert_approx_eq!(note_map.ratio_of(60), 1.0);
/// assert_approx_eq!(note_map.ratio_of(61), 5.0 / 3.0);
/// assert_approx_eq!(note_map.ratio_of(62), 3.0);
/// assert_approx_eq!(note_map.ratio_of(59), 5.0 / 9.0);
/// assert_approx_eq!(note_map.ratio_at(60.5), 4.0 / 3.0);
/// assert_approx_eq!(note_map.frequency_of(62), 3.0 * 261.63);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NoteMap {
    ratios: Vec<f64>,
    config: MapperConfig,
}

impl NoteMap {
    /// Builds the table for the given scale.
    ///
    /// A scale without any degree besides the unison falls back to 12-TET.
    pub fn build(degrees: &ScaleDegrees, config: MapperConfig) -> Self {
        let num_degrees = degrees.num_degrees();
        let ratios = match num_degrees {
            0 => {
                log::warn!(
                    "Scale '{}' has no degrees, falling back to 12-TET",
                    degrees.description()
                );
                equal_temperament_ratios(config.center_note)
            }
            1..=MAX_PERIODIC_DEGREES => expand_periodically(degrees.ratios(), config.center_note),
            _ => degrees.ratios().to_vec(),
        };

        log::debug!(
            "Built note map '{}' with {} degrees, octave ratio {} and {} entries",
            degrees.description(),
            num_degrees,
            degrees.octave_ratio(),
            ratios.len()
        );

        Self { ratios, config }
    }

    /// Builds a 12-TET table, i.e. `ratio_of(n) == 2^((n - center_note) / 12)`.
    pub fn equal_temperament(config: MapperConfig) -> Self {
        Self {
            ratios: equal_temperament_ratios(config.center_note),
            config,
        }
    }

    pub fn config(&self) -> MapperConfig {
        self.config
    }

    pub fn center_frequency(&self) -> f64 {
        self.config.center_frequency
    }

    /// Pitch-bend range as `(up, down)` in scale degrees.
    pub fn pitch_bend_range(&self) -> (i32, i32) {
        (
            self.config.pitch_bend_range_up,
            self.config.pitch_bend_range_down,
        )
    }

    /// Number of entries. Typically [`NUM_MIDI_NOTES`] but larger for scales with many degrees.
    pub fn size(&self) -> usize {
        self.ratios.len()
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Ratio of the given note, e.g. `1.0` at the center note and `2.0` one octave above in a scale with a 2/1 octave.
    pub fn ratio_of(&self, note: i32) -> f64 {
        let index = usize::try_from(note).unwrap_or(0).min(self.max_index());
        self.ratios[index]
    }

    /// Ratio of a fractional note, interpolated linearly between the two neighboring entries.
    pub fn ratio_at(&self, note: f64) -> f64 {
        let note = if note.is_nan() {
            0.0
        } else {
            note.clamp(0.0, self.max_index() as f64)
        };

        let lower_note = note.floor();
        let upper_note = note.ceil();
        let lower_ratio = self.ratios[lower_note as usize];
        if lower_note == upper_note {
            return lower_ratio;
        }

        let upper_ratio = self.ratios[upper_note as usize];
        math::lerp(lower_ratio, upper_ratio, note - lower_note)
    }

    /// Ratio of the given note, bent by up to the configured pitch-bend range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use assert_approx_eq::assert_approx_eq;
    /// # use scala_notemap::midi::PitchWheel;
    /// # use scala_notemap::note_map::NoteMap;
    /// let note_map = NoteMap::default();
    ///
    /// assert_approx_eq!(note_map.ratio_with_pitch_wheel(60, PitchWheel::CENTER), 1.0);
    /// assert_approx_eq!(note_map.ratio_with_pitch_wheel(60, PitchWheel::MAX), 2.0);
    /// assert_approx_eq!(note_map.ratio_with_pitch_wheel(60, PitchWheel::MIN), 0.5);
    /// ```
    pub fn ratio_with_pitch_wheel(&self, note: i32, pitch_wheel: PitchWheel) -> f64 {
        let deflection = pitch_wheel.as_fraction();
        let (range_up, range_down) = self.pitch_bend_range();
        let range = if deflection > 0.0 {
            range_up
        } else {
            range_down
        };
        self.ratio_at(f64::from(note) + f64::from(range) * deflection)
    }

    /// Frequency in Hz of the given note.
    pub fn frequency_of(&self, note: i32) -> f64 {
        self.ratio_of(note) * self.config.center_frequency
    }

    /// Frequency in Hz of a fractional note. See [`NoteMap::ratio_at`].
    pub fn frequency_at(&self, note: f64) -> f64 {
        self.ratio_at(note) * self.config.center_frequency
    }

    /// Frequency in Hz of a pitch-bent note. See [`NoteMap::ratio_with_pitch_wheel`].
    pub fn frequency_with_pitch_wheel(&self, note: i32, pitch_wheel: PitchWheel) -> f64 {
        self.ratio_with_pitch_wheel(note, pitch_wheel) * self.config.center_frequency
    }

    fn max_index(&self) -> usize {
        self.ratios.len() - 1
    }
}

impl Default for NoteMap {
    fn default() -> Self {
        Self::equal_temperament(MapperConfig::default())
    }
}

fn equal_temperament_ratios(center_note: i32) -> Vec<f64> {
    (0..NUM_MIDI_NOTES as i32)
        .map(|note| (f64::from(note) - f64::from(center_note)) / 12.0)
        .map(f64::exp2)
        .collect()
}

fn expand_periodically(ratios: &[f64], center_note: i32) -> Vec<f64> {
    let num_degrees = ratios.len() - 1;
    let octave_ratio = match ratios[num_degrees] {
        octave_ratio if octave_ratio > MIN_OCTAVE_RATIO => octave_ratio,
        octave_ratio => {
            log::warn!("Octave ratio {octave_ratio} is not positive, using 1.0 instead");
            1.0
        }
    };

    // num_degrees is at most MAX_PERIODIC_DEGREES
    let num_degrees = num_degrees as u16;

    (0..NUM_MIDI_NOTES as i32)
        .map(|note| {
            let relative_note = note.saturating_sub(center_note);
            let (num_octaves, index_in_octave) = math::floor_div_mod(relative_note, num_degrees);
            let octaves_away = i32::try_from(num_octaves.unsigned_abs()).unwrap_or(i32::MAX);
            let octave_factor = octave_ratio.powi(octaves_away);
            let octave_base_ratio = if relative_note < 0 {
                1.0 / octave_factor
            } else {
                octave_factor
            };
            octave_base_ratio * ratios[usize::from(index_in_octave)]
        })
        .collect()
}

/// Owner of a [`MapperConfig`] and a scale that publishes a new [`NoteMap`] snapshot on every change.
///
/// Snapshots handed out by [`NoteMapper::snapshot`] are never modified, so they can be shared with other threads while the mapper is reconfigured.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::note_map::NoteMapper;
/// # use scala_notemap::scala::ScaleDegrees;
/// let mut mapper = NoteMapper::default();
/// let twelve_tet = mapper.snapshot();
///
/// mapper.set_degrees(ScaleDegrees::equal_temperament(5, 2.0));
/// mapper.set_center_note(69);
/// mapper.set_center_frequency(440.0);
///
/// assert_approx_eq!(twelve_tet.frequency_of(72), 2.0 * 261.63);
/// assert_approx_eq!(mapper.snapshot().frequency_of(74), 880.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct NoteMapper {
    degrees: Option<ScaleDegrees>,
    config: MapperConfig,
    note_map: Arc<NoteMap>,
}

impl NoteMapper {
    /// Creates a mapper in 12-TET.
    pub fn new(config: MapperConfig) -> Self {
        Self {
            degrees: None,
            config,
            note_map: Arc::new(NoteMap::equal_temperament(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<NoteMap> {
        self.note_map.clone()
    }

    pub fn config(&self) -> MapperConfig {
        self.config
    }

    /// The scale in use or [`None`] in 12-TET.
    pub fn degrees(&self) -> Option<&ScaleDegrees> {
        self.degrees.as_ref()
    }

    pub fn set_degrees(&mut self, degrees: ScaleDegrees) {
        self.degrees = Some(degrees);
        self.rebuild();
    }

    /// Loads the scale from a Scala file. On failure, the current scale stays in use.
    pub fn load_scl_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        match ScaleDegrees::load(path) {
            Ok(degrees) => {
                self.set_degrees(degrees);
                Ok(())
            }
            Err(err) => {
                log::warn!("Keeping current tuning: {err}");
                Err(err)
            }
        }
    }

    pub fn reset_to_12_tet(&mut self) {
        self.degrees = None;
        self.rebuild();
    }

    pub fn set_center_note(&mut self, center_note: i32) {
        self.config.center_note = center_note;
        self.rebuild();
    }

    pub fn set_center_frequency(&mut self, center_frequency: f64) {
        self.config.center_frequency = center_frequency;
        self.rebuild();
    }

    pub fn set_pitch_bend_range(&mut self, up: i32, down: i32) {
        self.config.pitch_bend_range_up = up;
        self.config.pitch_bend_range_down = down;
        self.rebuild();
    }

    /// Pitch-bend range as `(up, down)` in scale degrees.
    pub fn pitch_bend_range(&self) -> (i32, i32) {
        (
            self.config.pitch_bend_range_up,
            self.config.pitch_bend_range_down,
        )
    }

    fn rebuild(&mut self) {
        let note_map = match &self.degrees {
            Some(degrees) => NoteMap::build(degrees, self.config),
            None => NoteMap::equal_temperament(self.config),
        };
        self.note_map = Arc::new(note_map);
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn harmonics() -> ScaleDegrees {
        ScaleDegrees::from_ratios(
            "Harmonics 6 to 12",
            [9.0 / 8.0, 5.0 / 4.0, 11.0 / 8.0, 3.0 / 2.0, 7.0 / 4.0, 2.0],
        )
    }

    fn albion() -> ScaleDegrees {
        ScaleDegrees::from_ratios(
            "Riley Albion",
            [
                16.0 / 15.0,
                9.0 / 8.0,
                6.0 / 5.0,
                5.0 / 4.0,
                4.0 / 3.0,
                64.0 / 45.0,
                3.0 / 2.0,
                8.0 / 5.0,
                5.0 / 3.0,
                16.0 / 9.0,
                15.0 / 8.0,
                2.0,
            ],
        )
    }

    #[test]
    fn default_is_12_tet() {
        let note_map = NoteMap::default();

        assert_eq!(note_map.size(), NUM_MIDI_NOTES);
        assert_eq!(note_map.ratio_of(60), 1.0);
        assert_eq!(note_map.frequency_of(60), 261.63);
        for note in 0..128 {
            assert_approx_eq!(
                note_map.ratio_of(note),
                (f64::from(note - 60) / 12.0).exp2()
            );
        }
    }

    #[test]
    fn harmonics_around_center() {
        let note_map = NoteMap::build(&harmonics(), MapperConfig::default());

        assert_eq!(note_map.size(), NUM_MIDI_NOTES);
        assert_eq!(note_map.ratio_of(60), 1.0);
        assert_eq!(note_map.ratio_of(61), 9.0 / 8.0);
        assert_eq!(note_map.ratio_of(62), 5.0 / 4.0);
        assert_eq!(note_map.ratio_of(63), 11.0 / 8.0);
        assert_eq!(note_map.ratio_of(64), 3.0 / 2.0);
        assert_eq!(note_map.ratio_of(65), 7.0 / 4.0);
        assert_eq!(note_map.ratio_of(66), 2.0);
        assert_eq!(note_map.ratio_of(67), 2.0 * 9.0 / 8.0);
        assert_eq!(note_map.frequency_of(60), 261.63);
    }

    #[test]
    fn harmonics_below_center() {
        let note_map = NoteMap::build(&harmonics(), MapperConfig::default());

        assert_approx_eq!(note_map.ratio_of(59), 7.0 / 8.0);
        assert_approx_eq!(note_map.ratio_of(55), 9.0 / 16.0);
        assert_approx_eq!(note_map.ratio_of(54), 0.5);
        assert_approx_eq!(note_map.ratio_of(53), 7.0 / 16.0);
        assert_approx_eq!(note_map.ratio_of(48), 0.25);
    }

    #[test]
    fn octave_property() {
        for degrees in [harmonics(), albion(), ScaleDegrees::from_ratios("", [1.2, 1.5])] {
            let note_map = NoteMap::build(&degrees, MapperConfig::default());
            let num_degrees = degrees.num_degrees() as i32;

            for note in 0..128 - num_degrees {
                assert_approx_eq!(
                    note_map.ratio_of(note + num_degrees),
                    degrees.octave_ratio() * note_map.ratio_of(note)
                );
            }
        }
    }

    #[test]
    fn albion_fifth() {
        let note_map = NoteMap::build(&albion(), MapperConfig::default());

        assert_eq!(note_map.ratio_of(67), 1.5);
        assert_eq!(note_map.ratio_of(72), 2.0);
        assert_approx_eq!(note_map.ratio_of(55), 0.75);
    }

    #[test]
    fn shifted_center_note() {
        let config = MapperConfig {
            center_note: 48,
            ..MapperConfig::default()
        };
        let note_map = NoteMap::build(&harmonics(), config);

        assert_eq!(note_map.ratio_of(48), 1.0);
        assert_eq!(note_map.ratio_of(54), 2.0);
        assert_eq!(note_map.frequency_of(48), 261.63);
    }

    #[test]
    fn center_note_outside_of_table() {
        let config = MapperConfig {
            center_note: 200,
            ..MapperConfig::default()
        };
        let note_map = NoteMap::build(&harmonics(), config);

        assert_approx_eq!(note_map.ratio_of(200 - 6 * 13), 2f64.powi(-13));
        assert!(note_map.ratios().iter().all(|ratio| ratio.is_finite()));

        let config = MapperConfig {
            center_note: i32::MIN,
            ..MapperConfig::default()
        };
        let note_map = NoteMap::build(&ScaleDegrees::from_ratios("", [1.0]), config);
        assert_eq!(note_map.ratio_of(0), 1.0);
    }

    #[test]
    fn stretched_octave() {
        let degrees = ScaleDegrees::from_ratios("Stretched", [1.1, 1.5, 2.1]);
        let note_map = NoteMap::build(&degrees, MapperConfig::default());

        assert_approx_eq!(note_map.ratio_of(63), 2.1);
        assert_approx_eq!(note_map.ratio_of(66), 2.1 * 2.1);
        assert_approx_eq!(note_map.ratio_of(57), 1.0 / 2.1);
        assert_approx_eq!(note_map.ratio_of(58), 1.1 / 2.1);
    }

    #[test]
    fn non_positive_octave_is_clamped() {
        let degrees = ScaleDegrees::from_ratios("Broken", [1.5, 0.0]);
        let note_map = NoteMap::build(&degrees, MapperConfig::default());

        assert_eq!(note_map.ratio_of(60), 1.0);
        assert_eq!(note_map.ratio_of(61), 1.5);
        assert_eq!(note_map.ratio_of(62), 1.0);
        assert_eq!(note_map.ratio_of(57), 1.5);
        assert!(note_map.ratios().iter().all(|ratio| ratio.is_finite()));
    }

    #[test]
    fn single_degree_repeats_octave() {
        let degrees = ScaleDegrees::from_ratios("Tritaves", [3.0]);
        let note_map = NoteMap::build(&degrees, MapperConfig::default());

        assert_eq!(note_map.size(), NUM_MIDI_NOTES);
        assert_eq!(note_map.ratio_of(60), 1.0);
        assert_eq!(note_map.ratio_of(61), 3.0);
        assert_eq!(note_map.ratio_of(62), 9.0);
        assert_approx_eq!(note_map.ratio_of(59), 1.0 / 3.0);
    }

    #[test]
    fn unison_only_falls_back_to_12_tet() {
        let degrees = ScaleDegrees::from_ratios("Unison", []);
        let note_map = NoteMap::build(&degrees, MapperConfig::default());

        assert_eq!(note_map, NoteMap::default());
    }

    #[test]
    fn large_scale_is_used_verbatim() {
        let degrees = ScaleDegrees::equal_temperament(200, 2.0);
        let note_map = NoteMap::build(&degrees, MapperConfig::default());

        assert_eq!(note_map.size(), 201);
        assert_eq!(note_map.ratios(), degrees.ratios());
        assert_eq!(note_map.ratio_of(0), 1.0);
        assert_approx_eq!(note_map.ratio_of(200), 2.0);
        assert_approx_eq!(note_map.ratio_of(100), 2f64.sqrt());
    }

    #[test]
    fn clamp_out_of_range_notes() {
        let note_map = NoteMap::build(&harmonics(), MapperConfig::default());

        assert_eq!(note_map.ratio_of(-5), note_map.ratio_of(0));
        assert_eq!(note_map.ratio_of(9999), note_map.ratio_of(127));
        assert_eq!(note_map.ratio_at(-0.5), note_map.ratio_of(0));
        assert_eq!(note_map.ratio_at(1e9), note_map.ratio_of(127));
        assert_eq!(note_map.ratio_at(f64::NAN), note_map.ratio_of(0));
        assert_eq!(note_map.frequency_of(i32::MIN), note_map.frequency_of(0));
    }

    #[test]
    fn interpolate_linearly_in_ratio_space() {
        let note_map = NoteMap::build(&harmonics(), MapperConfig::default());

        for note in 0..127 {
            assert_approx_eq!(
                note_map.ratio_at(f64::from(note) + 0.5),
                (note_map.ratio_of(note) + note_map.ratio_of(note + 1)) / 2.0
            );
        }
        assert_eq!(note_map.ratio_at(62.0), 5.0 / 4.0);
        assert_approx_eq!(note_map.ratio_at(61.25), 9.0 / 8.0 + 1.0 / 32.0);
        assert_approx_eq!(
            note_map.frequency_at(60.5),
            (1.0 + 9.0 / 8.0) / 2.0 * 261.63
        );
    }

    #[test]
    fn pitch_wheel() {
        let config = MapperConfig {
            pitch_bend_range_up: 2,
            pitch_bend_range_down: 6,
            ..MapperConfig::default()
        };
        let note_map = NoteMap::build(&harmonics(), config);

        for note in [-3, 0, 60, 63, 127, 500] {
            assert_eq!(
                note_map.ratio_with_pitch_wheel(note, PitchWheel::CENTER),
                note_map.ratio_of(note)
            );
        }
        assert_approx_eq!(note_map.ratio_with_pitch_wheel(60, PitchWheel::MAX), 5.0 / 4.0);
        assert_approx_eq!(note_map.ratio_with_pitch_wheel(60, PitchWheel::MIN), 0.5);
        assert_approx_eq!(
            note_map.ratio_with_pitch_wheel(60, PitchWheel::from_u14(4096)),
            11.0 / 16.0
        );
        assert_approx_eq!(
            note_map.frequency_with_pitch_wheel(60, PitchWheel::MAX),
            5.0 / 4.0 * 261.63
        );
    }

    #[test]
    fn mapper_publishes_new_snapshots() {
        let mut mapper = NoteMapper::default();
        let twelve_tet = mapper.snapshot();

        mapper.set_degrees(harmonics());
        let harmonics_at_60 = mapper.snapshot();
        mapper.set_center_note(54);
        mapper.set_pitch_bend_range(3, 4);

        assert_eq!(*twelve_tet, NoteMap::default());
        assert_eq!(harmonics_at_60.ratio_of(66), 2.0);
        assert_eq!(mapper.snapshot().ratio_of(60), 2.0);
        assert_eq!(mapper.snapshot().pitch_bend_range(), (3, 4));
        assert_eq!(mapper.pitch_bend_range(), (3, 4));

        mapper.reset_to_12_tet();
        assert!(mapper.degrees().is_none());
        assert_approx_eq!(mapper.snapshot().ratio_of(66), 2.0);
    }

    #[test]
    fn mapper_keeps_scale_after_failed_load() {
        let mut mapper = NoteMapper::default();
        mapper.set_degrees(harmonics());

        let result = mapper.load_scl_file("does/not/exist.scl");

        assert!(matches!(result, Err(LoadError::ResourceNotFound { .. })));
        assert_eq!(mapper.degrees(), Some(&harmonics()));
        assert_eq!(mapper.snapshot().ratio_of(61), 9.0 / 8.0);
    }

    #[test]
    fn snapshots_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoteMap>();
        assert_send_sync::<NoteMapper>();
    }
}
