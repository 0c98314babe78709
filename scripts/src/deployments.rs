//! The per-network configuration file & the deployment record it carries

use std::{
    collections::{btree_map, BTreeMap},
    fs,
    path::Path,
    str::FromStr,
};

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{constants::DEPLOYED_ADDRESS_KEY, errors::ScriptError};

/// The static configuration of one network
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Addresses of the contracts deployed so far, by logical name
    #[serde(default)]
    pub deployed_address: DeploymentRecord,
    /// External price feeds, by feed key (e.g. `BTCUSD`)
    #[serde(default)]
    pub chainlink_price_feed: BTreeMap<String, Address>,
    /// Protocol addresses owned by other deployments (e.g. `wethAddress`)
    #[serde(default)]
    pub default_address: BTreeMap<String, Address>,
}

impl NetworkConfig {
    /// Read the config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }

    /// The address of a price feed
    pub fn price_feed(&self, key: &str) -> Result<Address, ScriptError> {
        self.chainlink_price_feed
            .get(key)
            .copied()
            .ok_or_else(|| ScriptError::MissingConfig(format!("chainlinkPriceFeed.{key}")))
    }

    /// The address of an externally owned protocol contract
    pub fn default_address(&self, key: &str) -> Result<Address, ScriptError> {
        self.default_address
            .get(key)
            .copied()
            .ok_or_else(|| ScriptError::MissingConfig(format!("defaultAddress.{key}")))
    }
}

/// Logical contract name -> deployed address
///
/// Entries are only ever added. Names mapped to an empty string in the
/// config file are treated as not yet deployed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentRecord(BTreeMap<String, Address>);

impl DeploymentRecord {
    /// The recorded address of `name`, if any
    pub fn get(&self, name: &str) -> Option<Address> {
        self.0.get(name).copied()
    }

    /// The recorded address of `name`, or an error naming the missing entry
    pub fn require(&self, name: &str) -> Result<Address, ScriptError> {
        self.get(name)
            .ok_or_else(|| ScriptError::MissingConfig(format!("{DEPLOYED_ADDRESS_KEY}.{name}")))
    }

    /// Record the address of `name`
    ///
    /// Re-recording the same address is a no-op; recording a different one is an error.
    pub fn record(&mut self, name: &str, address: Address) -> Result<(), ScriptError> {
        match self.0.entry(name.to_string()) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(address);
                Ok(())
            }
            btree_map::Entry::Occupied(entry) if *entry.get() == address => Ok(()),
            btree_map::Entry::Occupied(entry) => Err(ScriptError::RecordConflict(format!(
                "{name} is recorded at {:#x}, refusing to replace it with {address:#x}",
                entry.get()
            ))),
        }
    }

    /// The number of recorded contracts
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the recorded contracts in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.0.iter().map(|(name, address)| (name.as_str(), *address))
    }
}

impl<'de> Deserialize<'de> for DeploymentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut record = BTreeMap::new();
        for (name, value) in raw {
            if value.trim().is_empty() {
                continue;
            }

            let address = Address::from_str(value.trim())
                .map_err(|e| serde::de::Error::custom(format!("{name}: {e}")))?;
            record.insert(name, address);
        }

        Ok(DeploymentRecord(record))
    }
}

impl Serialize for DeploymentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, address)| (name, format!("{address:#x}"))))
    }
}

/// Write a deployed address into the config file's `deployedAddress` section
///
/// The rest of the document is left as it was. The file is created if it doesn't exist.
pub fn write_deployed_address(
    file_path: &Path,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut parsed_json: Value = if file_path.exists() {
        let contents = fs::read_to_string(file_path)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?
    } else {
        Value::Object(Default::default())
    };

    let root = parsed_json.as_object_mut().ok_or_else(|| {
        ScriptError::WriteDeployments("config file is not a JSON object".to_string())
    })?;
    let deployed = root
        .entry(DEPLOYED_ADDRESS_KEY)
        .or_insert_with(|| Value::Object(Default::default()))
        .as_object_mut()
        .ok_or_else(|| {
            ScriptError::WriteDeployments(format!("`{DEPLOYED_ADDRESS_KEY}` is not a JSON object"))
        })?;
    deployed.insert(contract_key.to_string(), Value::String(format!("{address:#x}")));

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}
