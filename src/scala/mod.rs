//! Interop with [Scala](http://www.huygens-fokker.org/scala/) tuning files.

mod import;

use std::{
    fmt::{self, Display, Formatter},
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::note_map::{MapperConfig, NoteMap};

pub use self::import::*;

/// The ordered pitch ratios of one scale period as found in a Scala file according to <http://www.huygens-fokker.org/scala/scl_format.html>.
///
/// The first ratio is always the implicit unison `1.0` which is not part of the file. The last ratio is the octave (period) at which the scale repeats.
/// The ratios in between do not need to be ascending.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::scala::ScaleDegrees;
/// let degrees = ScaleDegrees::parse("Pentatonic\n5\n9/8\n5/4\n3/2\n5/3\n2/1\n").unwrap();
///
/// assert_eq!(degrees.description(), "Pentatonic");
/// assert_eq!(degrees.num_degrees(), 5);
/// assert_approx_eq!(degrees.ratios()[0], 1.0);
/// assert_approx_eq!(degrees.ratios()[4], 5.0 / 3.0);
/// assert_approx_eq!(degrees.octave_ratio(), 2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleDegrees {
    description: String,
    ratios: Vec<f64>,
}

impl ScaleDegrees {
    /// Creates a sequence from explicit degrees. The unison is prepended automatically.
    pub fn from_ratios(
        description: impl Into<String>,
        degrees: impl IntoIterator<Item = f64>,
    ) -> Self {
        Self {
            description: description.into(),
            ratios: std::iter::once(1.0).chain(degrees).collect(),
        }
    }

    /// Divides `octave` into `num_steps` equal steps.
    ///
    /// # Examples
    ///
    /// ```
    /// # use assert_approx_eq::assert_approx_eq;
    /// # use scala_notemap::scala::ScaleDegrees;
    /// let degrees = ScaleDegrees::equal_temperament(12, 2.0);
    ///
    /// assert_eq!(degrees.num_degrees(), 12);
    /// assert_approx_eq!(degrees.ratios()[7], 1.498307);
    /// assert_approx_eq!(degrees.octave_ratio(), 2.0);
    /// ```
    pub fn equal_temperament(num_steps: u16, octave: f64) -> Self {
        let num_steps_f64 = f64::from(num_steps);
        Self::from_ratios(
            format!("{num_steps} equal divisions of {octave}"),
            (1..=num_steps).map(|step| octave.powf(f64::from(step) / num_steps_f64)),
        )
    }

    /// Parses the content of a Scala file. See [`parse_scl`].
    pub fn parse(scl_text: &str) -> Result<Self, SclParseError> {
        parse_scl(scl_text)
    }

    /// Reads and parses the Scala file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let scl_text =
            fs::read_to_string(path).map_err(|source| LoadError::ResourceNotFound {
                path: path.to_owned(),
                source,
            })?;
        Ok(parse_scl(&scl_text)?)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// All ratios including the leading unison.
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Number of degrees excluding the unison.
    pub fn num_degrees(&self) -> usize {
        self.ratios.len() - 1
    }

    /// The ratio at which the scale repeats. A unison-only sequence repeats at `1.0`.
    pub fn octave_ratio(&self) -> f64 {
        self.ratios[self.num_degrees()]
    }
}

impl FromStr for ScaleDegrees {
    type Err = SclParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scl(s)
    }
}

/// Reads the Scala file at `path` and builds a [`NoteMap`] from it.
///
/// Either the whole map is returned or the first error encountered.
pub fn load_note_map(path: impl AsRef<Path>, config: MapperConfig) -> Result<NoteMap, LoadError> {
    let degrees = ScaleDegrees::load(path)?;
    Ok(NoteMap::build(&degrees, config))
}

/// Error reported when a Scala file cannot be turned into [`ScaleDegrees`].
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    ResourceNotFound { path: PathBuf, source: io::Error },
    /// The file content is not a valid Scala scale.
    Parse(SclParseError),
}

impl From<SclParseError> for LoadError {
    fn from(v: SclParseError) -> Self {
        Self::Parse(v)
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LoadError::ResourceNotFound { path, source } => {
                write!(f, "Could not read scl file {}: {}", path.display(), source)
            }
            LoadError::Parse(err) => write!(f, "Could not parse scl file: {}", err),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::ResourceNotFound { source, .. } => Some(source),
            LoadError::Parse(err) => Some(err),
        }
    }
}
