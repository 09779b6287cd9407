use std::{io, path::PathBuf};

use scala_notemap::{
    math,
    midi::PitchWheel,
    note_map::{MapperConfig, NoteMap},
    scala::ScaleDegrees,
};
use structopt::{clap::AppSettings, StructOpt};

use crate::{
    dto::{NoteMapDto, NoteMapFileDto},
    error::ResultExt,
    App, CliError, CliResult,
};

#[derive(StructOpt)]
pub(crate) struct DumpOptions {
    /// Lowest note to print
    #[structopt(long = "lo-key", default_value = "0")]
    lower_note: i32,

    /// Highest note to print [default: last note of the table]
    #[structopt(long = "up-key")]
    upper_note: Option<i32>,

    #[structopt(flatten)]
    mapper: MapperOptions,

    #[structopt(subcommand)]
    source: ScaleSource,
}

#[derive(StructOpt)]
pub(crate) struct ExportOptions {
    #[structopt(flatten)]
    mapper: MapperOptions,

    #[structopt(subcommand)]
    source: ScaleSource,
}

#[derive(StructOpt)]
#[structopt(setting = AppSettings::AllowNegativeNumbers)]
pub(crate) struct QueryOptions {
    /// Note to look up, e.g. 61 or 61.5
    note: f64,

    /// 14-bit pitch wheel position (0..16383, 8192 = no bend)
    #[structopt(long = "wheel")]
    pitch_wheel: Option<u16>,

    #[structopt(flatten)]
    mapper: MapperOptions,

    #[structopt(subcommand)]
    source: ScaleSource,
}

#[derive(StructOpt)]
struct MapperOptions {
    /// Note mapped to the unison
    #[structopt(long = "center-note", default_value = "60")]
    center_note: i32,

    /// Frequency of the center note in Hz
    #[structopt(long = "center-freq", default_value = "261.63")]
    center_frequency: f64,

    /// Pitch-bend range up in scale degrees
    #[structopt(long = "bend-up", default_value = "12")]
    pitch_bend_range_up: i32,

    /// Pitch-bend range down in scale degrees
    #[structopt(long = "bend-down", default_value = "12")]
    pitch_bend_range_down: i32,
}

impl MapperOptions {
    fn to_config(&self) -> MapperConfig {
        MapperConfig {
            center_note: self.center_note,
            center_frequency: self.center_frequency,
            pitch_bend_range_up: self.pitch_bend_range_up,
            pitch_bend_range_down: self.pitch_bend_range_down,
        }
    }
}

#[derive(StructOpt)]
enum ScaleSource {
    /// Import scl file
    #[structopt(name = "import")]
    Import {
        /// The location of the file to import
        file_name: PathBuf,
    },

    /// Equal temperament
    #[structopt(name = "equal")]
    EqualTemperament {
        /// Number of steps per octave, e.g. 12
        num_steps: u16,

        /// Octave ratio
        #[structopt(short = "o", long = "octave", default_value = "2")]
        octave: f64,
    },
}

impl ScaleSource {
    fn to_degrees(&self) -> CliResult<ScaleDegrees> {
        Ok(match self {
            ScaleSource::Import { file_name } => {
                ScaleDegrees::load(file_name).handle_error::<CliError>("Could not import scale")?
            }
            &ScaleSource::EqualTemperament { num_steps, octave } => {
                if !(octave.is_finite() && octave > 0.0) {
                    return Err(format!("Octave must be positive but was {octave}").into());
                }
                ScaleDegrees::equal_temperament(num_steps, octave)
            }
        })
    }
}

fn build_note_map(
    mapper: &MapperOptions,
    source: &ScaleSource,
) -> CliResult<(ScaleDegrees, NoteMap)> {
    let degrees = source.to_degrees()?;
    let note_map = NoteMap::build(&degrees, mapper.to_config());
    Ok((degrees, note_map))
}

impl DumpOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let (degrees, note_map) = build_note_map(&self.mapper, &self.source)?;

        let last_note = note_map.size() as i32 - 1;
        let lower_note = self.lower_note.max(0);
        let upper_note = self.upper_note.unwrap_or(last_note).min(last_note);

        let mut printer = NoteTablePrinter {
            app,
            center_note: note_map.config().center_note,
        };

        printer.print_table_header(degrees.description(), degrees.num_degrees())?;
        for note in lower_note..=upper_note {
            printer.print_table_row(note, note_map.ratio_of(note), note_map.frequency_of(note))?;
        }
        Ok(())
    }
}

impl ExportOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let (degrees, note_map) = build_note_map(&self.mapper, &self.source)?;

        let dto = NoteMapFileDto::NoteMap(NoteMapDto::from_note_map(
            degrees.description(),
            &note_map,
        ));

        app.write(
            serde_yaml::to_string(&dto).handle_error::<CliError>("Could not write note map")?,
        )
        .map_err(Into::into)
    }
}

impl QueryOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let (_, note_map) = build_note_map(&self.mapper, &self.source)?;

        let (ratio, frequency) = match self.pitch_wheel {
            Some(pitch_wheel) => {
                if self.note.fract() != 0.0 {
                    return Err(format!(
                        "Pitch wheel queries require an integer note but got {}",
                        self.note
                    )
                    .into());
                }
                if pitch_wheel > PitchWheel::MAX.as_u14() {
                    log::warn!("Pitch wheel value {pitch_wheel} is clamped to 14 bits");
                }
                let note = self.note as i32;
                let pitch_wheel = PitchWheel::from_u14(pitch_wheel);
                (
                    note_map.ratio_with_pitch_wheel(note, pitch_wheel),
                    note_map.frequency_with_pitch_wheel(note, pitch_wheel),
                )
            }
            None => (
                note_map.ratio_at(self.note),
                note_map.frequency_at(self.note),
            ),
        };

        app.writeln(format_args!("ratio: {ratio:.6}"))?;
        app.writeln(format_args!("cents: {:+.3}", math::ratio_to_cents(ratio)))?;
        app.writeln(format_args!("frequency: {frequency:.3} Hz"))?;
        Ok(())
    }
}

struct NoteTablePrinter<'a, 'b> {
    app: &'a mut App<'b>,
    center_note: i32,
}

impl NoteTablePrinter<'_, '_> {
    fn print_table_header(&mut self, description: &str, num_degrees: usize) -> io::Result<()> {
        self.app
            .writeln(format_args!("{description} ({num_degrees} degrees)"))?;
        self.app.writeln(format_args!(
            "  {note:-^6} ‖ {ratio:-^12} ‖ {cents:-^11} ‖ {pitch:-^14}",
            note = "Note",
            ratio = "Ratio",
            cents = "Cents",
            pitch = "Pitch"
        ))
    }

    fn print_table_row(&mut self, note: i32, ratio: f64, frequency: f64) -> io::Result<()> {
        if note == self.center_note {
            self.app.write(format_args!("> "))?;
        } else {
            self.app.write(format_args!("  "))?;
        }

        self.app.writeln(format_args!(
            "{note:>6} ‖ {ratio:>12.6} ‖ {cents:>+10.3}¢ ‖ {frequency:>11.3} Hz",
            cents = math::ratio_to_cents(ratio),
        ))
    }
}
