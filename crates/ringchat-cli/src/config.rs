//! Ringchat CLI configuration management
//!
//! Layered configuration: defaults, then an optional `ringchat.toml`, then
//! command-line overrides. Defaults mirror the reference deployment: port
//! 5555 on group 239.255.255.250, a 2 second join timeout with three
//! attempts, a 2.5 second token hold, and a 20% simulated drop rate.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use ringchat_core::{NodeName, ProtocolConfig};

use crate::cli::Cli;
use crate::error::Result;

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for a ringchat node process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Identity and process lifecycle
    pub node: NodeSection,

    /// Protocol timing and retry budgets
    pub protocol: ProtocolSection,

    /// Multicast endpoint
    pub network: NetworkSection,

    /// Simulated loss and delay on inbound datagrams
    pub faults: FaultSection,

    /// Durable log location
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Node name; generated when absent.
    pub name: Option<String>,

    /// Found the network on a cold start.
    pub bootstrap: bool,

    /// Delay before the protocol starts, in milliseconds.
    pub startup_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolSection {
    pub join_timeout_ms: u64,
    pub max_join_attempts: u32,
    pub token_hold_ms: u64,
    pub broadcast_redundancy: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    pub port: u16,
    pub multicast_group: Ipv4Addr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultSection {
    pub drop_probability: f64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: PathBuf,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for ProtocolSection {
    fn default() -> Self {
        Self {
            join_timeout_ms: 2000,
            max_join_attempts: 3,
            token_hold_ms: 2500,
            broadcast_redundancy: 3,
        }
    }
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            port: 5555,
            multicast_group: Ipv4Addr::new(239, 255, 255, 250),
        }
    }
}

impl Default for FaultSection {
    fn default() -> Self {
        Self {
            drop_probability: 0.2,
            max_delay_ms: 0,
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

// ----------------------------------------------------------------------------
// Loading and Overrides
// ----------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(name) = &cli.name {
            self.node.name = Some(name.clone());
        }
        if cli.bootstrap {
            self.node.bootstrap = true;
        }
        if let Some(delay) = cli.startup_delay_ms {
            self.node.startup_delay_ms = delay;
        }
        if let Some(data_dir) = &cli.data_dir {
            self.storage.data_dir = data_dir.clone();
        }
        if let Some(p) = cli.drop_probability {
            self.faults.drop_probability = p;
        }
    }

    /// The configured node name, or a freshly generated one.
    pub fn node_name(&self) -> NodeName {
        match &self.node.name {
            Some(name) => NodeName::new(name.clone()),
            None => {
                let suffix: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(6)
                    .map(char::from)
                    .collect();
                NodeName::new(format!("node-{}", suffix.to_lowercase()))
            }
        }
    }

    /// Where this node's durable log lives.
    pub fn log_path(&self, name: &NodeName) -> PathBuf {
        self.storage
            .data_dir
            .join(format!("{}_messages.jsonl", name))
    }

    pub fn protocol_config(&self) -> ProtocolConfig {
        ProtocolConfig {
            join_response_timeout: Duration::from_millis(self.protocol.join_timeout_ms),
            max_join_attempts: self.protocol.max_join_attempts,
            token_hold_duration: Duration::from_millis(self.protocol.token_hold_ms),
            broadcast_redundancy: self.protocol.broadcast_redundancy,
            bootstrap: self.node.bootstrap,
        }
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.node.startup_delay_ms)
    }

    pub fn max_fault_delay(&self) -> Duration {
        Duration::from_millis(self.faults.max_delay_ms)
    }
}
