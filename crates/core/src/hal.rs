//! Small enumerations shared by manifests and matrices

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the vendor interface a document describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// Vendor / ODM partitions
    Device,
    /// System / product partitions
    Framework,
}

impl SchemaType {
    /// The other side: a device manifest is checked against a framework matrix
    /// and vice versa.
    pub const fn counterpart(&self) -> SchemaType {
        match self {
            SchemaType::Device => SchemaType::Framework,
            SchemaType::Framework => SchemaType::Device,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Device => write!(f, "device"),
            SchemaType::Framework => write!(f, "framework"),
        }
    }
}

/// How a served HAL is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Not declared, or no such instance
    #[default]
    Empty,
    /// Binderized over hwbinder
    Hwbinder,
    /// Loaded in-process
    Passthrough,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Empty => write!(f, ""),
            Transport::Hwbinder => write!(f, "hwbinder"),
            Transport::Passthrough => write!(f, "passthrough"),
        }
    }
}
