//! Upload purposes and the storage prefix each one maps to.

use crate::services::object_service::StorageError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Why a file is being uploaded. Only used to pick the key prefix.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Avatar,
    Resume,
    Project,
}

impl Purpose {
    /// Key prefix inside the bucket.
    pub fn prefix(self) -> &'static str {
        match self {
            Purpose::Avatar => "avatars",
            Purpose::Resume => "resumes",
            Purpose::Project => "projectImages",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Avatar => "avatar",
            Purpose::Resume => "resume",
            Purpose::Project => "project",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = StorageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "avatar" => Ok(Purpose::Avatar),
            "resume" => Ok(Purpose::Resume),
            "project" => Ok(Purpose::Project),
            "" => Err(StorageError::InvalidInput("no purpose provided".into())),
            other => Err(StorageError::InvalidInput(format!(
                "invalid purpose `{}`",
                other
            ))),
        }
    }
}
