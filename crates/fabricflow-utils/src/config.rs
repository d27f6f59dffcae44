//! Topology configuration files.

use std::path::Path;

use fabricflow_core::{Bandwidth, TopologyKind, TopologyParams};

use crate::{Error, Format};

/// A topology configuration, as written in JSON or Dhall files.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TopologyConfig {
    /// Fabric shape.
    pub topology: TopologyKind,
    /// Number of servers.
    #[serde(rename = "numberOfServer")]
    pub servers: usize,
    /// Number of leaf switches.
    #[serde(rename = "numberOfLeaf")]
    pub leaves: usize,
    /// Number of spine switches.
    #[serde(rename = "numberOfSpine")]
    pub spines: usize,
    /// Servers per leaf.
    #[serde(rename = "numberOfServersPerLeaf")]
    pub servers_per_leaf: usize,
    /// Candidate capacities for server-leaf and leaf-spine links.
    #[serde(rename = "capacityList")]
    pub capacities: Vec<Bandwidth>,
    /// Candidate capacities for leaf-leaf links.
    #[serde(
        rename = "block2blockCapacityList",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub block_capacities: Option<Vec<Bandwidth>>,
    /// Number of servers attached to the source.
    #[serde(rename = "numberOfSource")]
    pub sources: usize,
    /// Number of servers attached to the sink.
    #[serde(rename = "numberofSink")]
    pub sinks: usize,
    /// Whether to render the annotated graph.
    #[serde(rename = "drawGraph", default)]
    pub draw_graph: bool,
}

impl TopologyConfig {
    /// Builder parameters for this configuration. Validation happens when the fabric is built.
    pub fn params(&self) -> TopologyParams {
        TopologyParams {
            servers: self.servers,
            leaves: self.leaves,
            spines: self.spines,
            servers_per_leaf: self.servers_per_leaf,
            capacities: self.capacities.clone(),
            block_capacities: self.block_capacities.clone(),
            sources: self.sources,
            sinks: self.sinks,
        }
    }
}

/// Reads a [`TopologyConfig`] from a file in JSON or Dhall format.
pub fn read_config(path: impl AsRef<Path>) -> Result<TopologyConfig, Error> {
    let path = path.as_ref();
    let format = Format::of(path)?;
    let contents = std::fs::read_to_string(path)?;
    let config = match format {
        Format::Json => serde_json::from_str(&contents)?,
        Format::Dhall => serde_dhall::from_str(&contents).parse().map_err(Box::new)?,
        Format::MsgPack => return Err(Error::UnknownFileType(path.into())),
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fabricflow_core::ConfigError;
    use rand::prelude::*;

    use super::*;

    const CLOS_JSON: &str = r#"{
        "topology": "clos",
        "numberOfServer": 8,
        "numberOfLeaf": 4,
        "numberOfSpine": 2,
        "numberOfServersPerLeaf": 2,
        "capacityList": [10, 40, 100],
        "numberOfSource": 2,
        "numberofSink": 3,
        "drawGraph": true
    }"#;

    fn write_temp(suffix: &str, contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut f = tempfile::Builder::new().suffix(suffix).tempfile()?;
        f.write_all(contents.as_bytes())?;
        Ok(f)
    }

    #[test]
    fn json_config_parses() -> anyhow::Result<()> {
        let f = write_temp(".json", CLOS_JSON)?;
        let config = read_config(f.path())?;
        assert_eq!(config.topology, TopologyKind::Clos);
        assert_eq!(config.servers, 8);
        assert_eq!(config.sinks, 3);
        assert_eq!(config.capacities[1], Bandwidth::new(40.0));
        assert_eq!(config.block_capacities, None);
        assert!(config.draw_graph);
        Ok(())
    }

    #[test]
    fn dhall_config_parses() -> anyhow::Result<()> {
        let dhall = r#"
            { topology = < clos | block2block >.block2block
            , numberOfServer = 8
            , numberOfLeaf = 4
            , numberOfSpine = 2
            , numberOfServersPerLeaf = 2
            , capacityList = [ 10, 40 ]
            , block2blockCapacityList = Some [ 5, 15 ]
            , numberOfSource = 1
            , numberofSink = 1
            , drawGraph = False
            }
        "#;
        let f = write_temp(".dhall", dhall)?;
        let config = read_config(f.path())?;
        assert_eq!(config.topology, TopologyKind::Block2Block);
        assert_eq!(
            config.block_capacities,
            Some(vec![Bandwidth::new(5.0), Bandwidth::new(15.0)])
        );
        assert!(!config.draw_graph);
        Ok(())
    }

    #[test]
    fn config_builds_fabric() -> anyhow::Result<()> {
        let config: TopologyConfig = serde_json::from_str(CLOS_JSON)?;
        let topo = config
            .topology
            .build(&config.params(), StdRng::seed_from_u64(0))?;
        assert_eq!(topo.sinks.len(), 3);
        Ok(())
    }

    #[test]
    fn missing_block_list_is_rejected_at_build() -> anyhow::Result<()> {
        let mut config: TopologyConfig = serde_json::from_str(CLOS_JSON)?;
        config.topology = TopologyKind::Block2Block;
        let res = config
            .topology
            .build(&config.params(), StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(ConfigError::MissingBlockCapacities)));
        Ok(())
    }

    #[test]
    fn unknown_extension_fails() -> anyhow::Result<()> {
        let f = write_temp(".yaml", CLOS_JSON)?;
        assert!(matches!(read_config(f.path()), Err(Error::UnknownFileType(..))));
        Ok(())
    }
}
