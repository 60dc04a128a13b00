use std::{num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("palette has no colors")]
    Empty,

    #[error("invalid color: {0}, expected #rrggbb")]
    InvalidColor(String),
}

/// An sRGB color written as `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Color {
    type Err = PaletteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let valid = value.len() == 7
            && value.starts_with('#')
            && value[1..].chars().all(|c| c.is_ascii_hexdigit());

        if valid {
            Ok(Color(value.to_ascii_lowercase()))
        } else {
            Err(PaletteError::InvalidColor(value.to_string()))
        }
    }
}

impl TryFrom<String> for Color {
    type Error = PaletteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const DEFAULT_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Ordered, non-empty list of vehicle colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { colors })
    }

    /// Parses a comma separated list such as `#ff0000,#00ff00`.
    pub fn parse_list(list: &str) -> Result<Self, PaletteError> {
        let colors = list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Color::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> &Color {
        &self.colors[index % self.colors.len()]
    }

    /// A fresh cycle starting at the first color.
    pub fn cycle(&self) -> ColorCycle {
        ColorCycle::new(NonZeroUsize::new(self.colors.len()).unwrap_or(NonZeroUsize::MIN))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|color| Color((*color).to_string()))
                .collect(),
        }
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = PaletteError;

    fn try_from(colors: Vec<Color>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

/// Endless sequence of palette indices, `0, 1, .., len - 1, 0, 1, ..`, one
/// per vehicle.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    len: NonZeroUsize,
    calls: usize,
}

impl ColorCycle {
    pub fn new(len: NonZeroUsize) -> Self {
        Self { len, calls: 0 }
    }
}

impl Iterator for ColorCycle {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = self.calls % self.len.get();
        self.calls += 1;
        Some(index)
    }
}
