use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    cache::{Cache, IsCache, BLOCK_SIZE},
    error::ConfigError,
    mapping::{direct::DirectMapped, fully::FifoState, fully::FullyAssociative},
    organization::Caches,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Mapping {
    DirectMapped,
    FullyAssociative,
}

impl FromStr for Mapping {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dm" | "direct-mapped" => Ok(Mapping::DirectMapped),
            "fa" | "fully-associative" => Ok(Mapping::FullyAssociative),
            _ => Err(ConfigError::UnknownMapping(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Mapping {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mapping::DirectMapped => "direct-mapped",
            Mapping::FullyAssociative => "fully-associative",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Organization {
    Unified,
    Split,
}

impl FromStr for Organization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uc" | "unified" => Ok(Organization::Unified),
            "sc" | "split" => Ok(Organization::Split),
            _ => Err(ConfigError::UnknownOrganization(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Organization {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Organization::Unified => "unified",
            Organization::Split => "split",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub cache_size: u32,
    pub mapping: Mapping,
    pub organization: Organization,
}

impl Config {
    pub fn new(cache_size: u32, mapping: Mapping, organization: Organization) -> Self {
        Config {
            cache_size,
            mapping,
            organization,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.cache_size % BLOCK_SIZE != 0 {
            return Err(ConfigError::NotBlockMultiple(self.cache_size));
        }
        let lines = self.cache_size / BLOCK_SIZE;
        if !lines.is_power_of_two() {
            tracing::warn!(
                cache_size = self.cache_size,
                lines,
                "line count is not a power of two, index width is rounded down"
            );
        }
        Ok(())
    }

    /// Builds the line stores for this configuration. Split stores each get
    /// the full `cache_size`.
    pub fn build_caches(&self) -> Result<Caches, ConfigError> {
        self.validate()?;
        let caches = match self.organization {
            Organization::Unified => Caches::Unified(self.make_cache("unified")),
            Organization::Split => Caches::Split {
                instruction: self.make_cache("instruction"),
                data: self.make_cache("data"),
            },
        };
        Ok(caches)
    }

    fn make_cache(&self, name: &str) -> Box<dyn IsCache> {
        match self.mapping {
            Mapping::DirectMapped => {
                Box::new(Cache::<(), DirectMapped>::new(name, self.cache_size)) as Box<dyn IsCache>
            }
            Mapping::FullyAssociative => Box::new(Cache::<FifoState, FullyAssociative>::new(
                name,
                self.cache_size,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("dm", Mapping::DirectMapped)]
    #[case("direct-mapped", Mapping::DirectMapped)]
    #[case("fa", Mapping::FullyAssociative)]
    #[case("fully-associative", Mapping::FullyAssociative)]
    fn parses_mapping(#[case] token: &str, #[case] expected: Mapping) {
        assert_eq!(token.parse::<Mapping>(), Ok(expected));
    }

    #[rstest]
    #[case("uc", Organization::Unified)]
    #[case("unified", Organization::Unified)]
    #[case("sc", Organization::Split)]
    #[case("split", Organization::Split)]
    fn parses_organization(#[case] token: &str, #[case] expected: Organization) {
        assert_eq!(token.parse::<Organization>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(
            "sa".parse::<Mapping>(),
            Err(ConfigError::UnknownMapping("sa".into()))
        );
        assert_eq!(
            "DM".parse::<Mapping>(),
            Err(ConfigError::UnknownMapping("DM".into()))
        );
        assert_eq!(
            "xc".parse::<Organization>(),
            Err(ConfigError::UnknownOrganization("xc".into()))
        );
    }

    #[rstest]
    #[case(0, Err(ConfigError::ZeroSize))]
    #[case(100, Err(ConfigError::NotBlockMultiple(100)))]
    #[case(64, Ok(()))]
    #[case(192, Ok(()))]
    #[case(4096, Ok(()))]
    fn validates_size(#[case] size: u32, #[case] expected: Result<(), ConfigError>) {
        let config = Config::new(size, Mapping::DirectMapped, Organization::Unified);
        assert_eq!(config.validate(), expected);
    }

    #[test]
    fn reads_json_config() {
        let config: Config =
            serde_json::from_str(r#"{"cache_size":1024,"mapping":"fa","organization":"split"}"#)
                .unwrap();
        assert_eq!(
            config,
            Config::new(1024, Mapping::FullyAssociative, Organization::Split)
        );
    }

    #[test]
    fn rejects_bad_json_mapping() {
        let err = serde_json::from_str::<Config>(
            r#"{"cache_size":1024,"mapping":"lru","organization":"uc"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown cache mapping"));
    }

    #[test]
    fn writes_long_names() {
        let config = Config::new(256, Mapping::DirectMapped, Organization::Unified);
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"cache_size":256,"mapping":"direct-mapped","organization":"unified"}"#
        );
    }

    #[test]
    fn split_stores_are_full_size() {
        let caches = Config::new(512, Mapping::FullyAssociative, Organization::Split)
            .build_caches()
            .unwrap();
        let stats = caches.stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "instruction");
        assert_eq!(stats[1].name, "data");
        assert!(stats.iter().all(|s| s.lines == 8));
    }
}
