// Active application record

use serde::{Deserialize, Serialize};

/// Application the controller believes is running
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveApplicationRecord {
    pub name: String,
    pub start_time: i64, // epoch ms
    pub command: String,
}
