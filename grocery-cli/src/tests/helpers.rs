//! Test helpers shared by the CLI unit and behaviour tests.

use super::*;
use crate::locate::PlacesSearchBuilder;
use geo::Coord;
use grocery_core::test_support::StubPlacesSearch;
use grocery_core::{PlaceCandidate, PlacesSearch};
use grocery_data::places::HttpPlacesSearchConfig;
use tempfile::TempDir;

/// Origin used by the locate scenarios: Trafalgar Square.
pub(super) const ORIGIN: Coord<f64> = Coord {
    x: -0.1281,
    y: 51.5080,
};

const METERS_PER_DEGREE_LAT: f64 = 111_250.0;

/// A temporary directory holding the database for one test.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) database: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            database: root.join("state").join("grocery.db"),
            _dir: dir,
        }
    }
}

/// Places builder answering every search with a fixed list.
#[derive(Debug, Default, Clone)]
pub(super) struct StubPlacesBuilder {
    pub(super) places: Vec<PlaceCandidate>,
}

impl PlacesSearchBuilder for StubPlacesBuilder {
    fn build(&self, _config: &HttpPlacesSearchConfig) -> Result<Box<dyn PlacesSearch>, CliError> {
        Ok(Box::new(StubPlacesSearch::with_places(self.places.clone())))
    }
}

/// A grocer `meters` due north of [`ORIGIN`].
pub(super) fn grocer_north(name: &str, meters: f64) -> PlaceCandidate {
    PlaceCandidate::new(
        name,
        name.to_lowercase().replace(' ', "-"),
        Coord {
            x: ORIGIN.x,
            y: ORIGIN.y + meters / METERS_PER_DEGREE_LAT,
        },
    )
}

/// Parse `argv` and run the resulting command, capturing stdout.
pub(super) fn run_argv(
    argv: &[String],
    places: &dyn PlacesSearchBuilder,
    stdout: &mut Vec<u8>,
) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(argv).map_err(CliError::from)?;
    run_command(cli.command, places, stdout)
}
