use accord_common::{AccordError, ClusterParams, NodeId, Result, Value};

use crate::cli::Args;

/// Static wiring of one node: identity, cluster sizing, transport ports and
/// the initial consensus value.
#[derive(Debug, Clone)]
pub struct Config {
    pub node_id: NodeId,
    pub params: ClusterParams,
    pub base_port: u16,
    pub initial: Value,
    pub faulty: bool,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let node_id = args
            .node_id
            .parse::<usize>()
            .map_err(|e| AccordError::Config(format!("--node-id: {e}")))?;
        let n = args
            .nodes
            .parse::<usize>()
            .map_err(|e| AccordError::Config(format!("--nodes: {e}")))?;
        let f = args
            .faults
            .parse::<usize>()
            .map_err(|e| AccordError::Config(format!("--faults: {e}")))?;
        let base_port = args
            .base_port
            .parse::<u16>()
            .map_err(|e| AccordError::Config(format!("--base-port: {e}")))?;
        let initial = args
            .initial
            .parse::<Value>()
            .map_err(|e| AccordError::Config(format!("--initial: {e}")))?;

        let config = Self {
            node_id: NodeId(node_id),
            params: ClusterParams::new(n, f),
            base_port,
            initial,
            faulty: args.faulty,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.params.n == 0 {
            return Err(AccordError::Config(
                "cluster must have at least one node".to_string(),
            ));
        }
        if self.node_id.0 >= self.params.n {
            return Err(AccordError::Config(format!(
                "node id {} out of range for a cluster of {}",
                self.node_id, self.params.n
            )));
        }
        Ok(())
    }

    /// HTTP port this node listens on.
    pub fn port(&self) -> u16 {
        self.base_port + self.node_id.0 as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(node_id: &str, nodes: &str) -> Args {
        Args {
            node_id: node_id.to_string(),
            nodes: nodes.to_string(),
            faults: "1".to_string(),
            base_port: "3000".to_string(),
            initial: "1".to_string(),
            faulty: false,
        }
    }

    #[test]
    fn builds_from_valid_args() {
        let config = Config::from_args(&args("2", "4")).unwrap();
        assert_eq!(config.node_id, NodeId(2));
        assert_eq!(config.params, ClusterParams::new(4, 1));
        assert_eq!(config.initial, Value::One);
        assert_eq!(config.port(), 3002);
    }

    #[test]
    fn rejects_out_of_range_node_id() {
        let err = Config::from_args(&args("4", "4")).unwrap_err();
        assert!(matches!(err, AccordError::Config(_)));
    }

    #[test]
    fn rejects_malformed_initial_value() {
        let mut bad = args("0", "4");
        bad.initial = "2".to_string();
        let err = Config::from_args(&bad).unwrap_err();
        assert!(matches!(err, AccordError::Config(_)));
    }
}
