use std::{error::Error, fmt, str::FromStr};

use rampart_core::{TileCoord, TowerKind};

/// Separates the tower type from its tile in `kind@column,row`.
const KIND_DELIMITER: char = '@';
/// Separates the column from the row.
const COORD_DELIMITER: char = ',';

/// Tower requested on the command line before the first tick.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TowerPlacement {
    /// Type of tower to build.
    pub(crate) kind: TowerKind,
    /// Tile to build on.
    pub(crate) tile: TileCoord,
}

impl FromStr for TowerPlacement {
    type Err = PlacementParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlacementParseError::Empty);
        }

        let (kind, tile) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| PlacementParseError::MissingTile(trimmed.to_owned()))?;
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(PlacementParseError::MissingKind(trimmed.to_owned()));
        }

        Ok(Self {
            kind: TowerKind::from(kind),
            tile: parse_tile(tile)?,
        })
    }
}

impl fmt::Display for TowerPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KIND_DELIMITER}{}{COORD_DELIMITER}{}",
            self.kind,
            self.tile.column(),
            self.tile.row()
        )
    }
}

/// Errors that can occur while parsing `--tower` arguments.
#[derive(Debug, PartialEq)]
pub(crate) enum PlacementParseError {
    /// The argument was empty or contained only whitespace.
    Empty,
    /// No `@` separated the tower type from the tile.
    MissingTile(String),
    /// Nothing preceded the `@`.
    MissingKind(String),
    /// The tile was not two unsigned integers separated by a comma.
    InvalidTile(String),
}

impl fmt::Display for PlacementParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tower placement was empty"),
            Self::MissingTile(value) => {
                write!(f, "tower placement '{value}' is missing '@column,row'")
            }
            Self::MissingKind(value) => {
                write!(f, "tower placement '{value}' is missing the tower type")
            }
            Self::InvalidTile(tile) => write!(f, "could not parse tile '{tile}'"),
        }
    }
}

impl Error for PlacementParseError {}

fn parse_tile(tile: &str) -> Result<TileCoord, PlacementParseError> {
    let (column, row) = tile
        .split_once(COORD_DELIMITER)
        .ok_or_else(|| PlacementParseError::InvalidTile(tile.to_owned()))?;

    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|_| PlacementParseError::InvalidTile(tile.to_owned()))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|_| PlacementParseError::InvalidTile(tile.to_owned()))?;

    Ok(TileCoord::new(column, row))
}
