//! Genre enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// The fixed set of catalog genres.
///
/// The wire and display name of each genre is its title-cased English name,
/// with `Sci-Fi` hyphenated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    #[default]
    Action,
    Comedy,
    Drama,
    Horror,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Romance,
    Thriller,
    Fantasy,
    Animation,
    Documentary,
    Adventure,
    Mystery,
}

impl Genre {
    /// Every genre, in presentation order.
    pub const ALL: [Genre; 12] = [
        Genre::Action,
        Genre::Comedy,
        Genre::Drama,
        Genre::Horror,
        Genre::SciFi,
        Genre::Romance,
        Genre::Thriller,
        Genre::Fantasy,
        Genre::Animation,
        Genre::Documentary,
        Genre::Adventure,
        Genre::Mystery,
    ];

    /// Returns the display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Horror => "Horror",
            Genre::SciFi => "Sci-Fi",
            Genre::Romance => "Romance",
            Genre::Thriller => "Thriller",
            Genre::Fantasy => "Fantasy",
            Genre::Animation => "Animation",
            Genre::Documentary => "Documentary",
            Genre::Adventure => "Adventure",
            Genre::Mystery => "Mystery",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = Error;

    /// Parses a genre name, ignoring case. `scifi` and `sci_fi` are accepted
    /// for `Sci-Fi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if normalized == "scifi" {
            return Ok(Genre::SciFi);
        }

        Genre::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                InvalidInputError::Genre {
                    value: s.to_string(),
                }
                .into()
            })
    }
}
