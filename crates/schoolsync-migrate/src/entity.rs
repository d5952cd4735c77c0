//! The four record types a run repairs, in run order.

use crate::account::normalize_account;
use crate::grade::normalize_grade;
use crate::group::normalize_group;
use crate::message::normalize_message;
use schoolsync_store::{Fields, Patch};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Account,
    Group,
    Message,
    Grade,
}

impl Entity {
    /// Passes run in exactly this order.
    pub const ALL: [Self; 4] = [Self::Account, Self::Group, Self::Message, Self::Grade];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Group => "group",
            Self::Message => "message",
            Self::Grade => "grade",
        }
    }

    pub fn default_collection(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Group => "groups",
            Self::Message => "messages",
            Self::Grade => "grades",
        }
    }

    /// Whether applied writes also stamp `updatedAt`.
    pub fn stamps_updated_at(self) -> bool {
        matches!(self, Self::Account)
    }

    /// The pure repair decision for one record of this type.
    pub fn normalize(self, fields: &Fields) -> Patch {
        match self {
            Self::Account => normalize_account(fields),
            Self::Group => normalize_group(fields),
            Self::Message => normalize_message(fields),
            Self::Grade => normalize_grade(fields),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
