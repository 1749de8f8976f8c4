//! Reference item type and bundled sample catalog

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::source::StaticSource;

const SAMPLE_CATALOG: &str = include_str!("../data/beers.json");

/// Names longer than this are shortened for display
const MAX_DISPLAY_NAME: usize = 12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub name: String,
    pub image_url: String,
    /// Alcohol by volume, in percent
    pub abv: f64,
}

impl Beer {
    /// Name as shown on a card: long names are cut to their first two words
    pub fn display_name(&self) -> String {
        if self.name.chars().count() <= MAX_DISPLAY_NAME {
            return self.name.clone();
        }
        self.name
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The bundled 13-beer catalog
    pub fn sample_catalog() -> Result<StaticSource<Beer>, SourceError> {
        StaticSource::from_json(SAMPLE_CATALOG)
    }
}
