use crate::NetworkError;
use std::{fmt, str::FromStr};

/// A place description such as `"Madison, Dane County, Wisconsin, USA"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    components: Vec<String>,
}

impl Place {
    pub fn parse(description: &str) -> Result<Self, NetworkError> {
        let components: Vec<String> = description
            .split(',')
            .map(|component| component.trim().to_owned())
            .collect();
        if components.iter().any(String::is_empty) {
            return Err(NetworkError::InvalidPlace(description.to_owned()));
        }
        Ok(Self { components })
    }

    /// Returns the most specific component, e.g. the city.
    pub fn name(&self) -> &str {
        &self.components[0]
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }
}

impl FromStr for Place {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.components.join(", "))
    }
}
