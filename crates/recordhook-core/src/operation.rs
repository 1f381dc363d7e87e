//! Record mutation kinds.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Kind of mutation applied to a record.
///
/// The string forms (`insert`, `update`, `delete`) are the values stored in a
/// subscription's operation filter and sent as the envelope's `op` field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// A record was created.
    Insert,
    /// A record was modified.
    Update,
    /// A record was removed.
    Delete,
}

impl Operation {
    /// All operation kinds, in lifecycle order.
    pub const ALL: [Operation; 3] = [Operation::Insert, Operation::Update, Operation::Delete];

    /// Returns the wire name of this operation.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
