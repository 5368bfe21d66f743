// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

/// Requests understood by the tree data provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// `get_base_size`: no arguments, answers a [`crate::BaseSize`].
    GetBaseSize,
    /// `get_group_locations`: no arguments, answers a list of [`crate::GroupLocation`].
    GetGroupLocations,
    /// `get_nodes_for_group`: takes [`crate::GroupNodesArgs`], answers a list of [`crate::Node`].
    GetNodesForGroup,
}

impl Command {
    /// All commands, in wire-table order.
    pub const ALL: [Self; 3] = [
        Self::GetBaseSize,
        Self::GetGroupLocations,
        Self::GetNodesForGroup,
    ];

    /// Wire name of the command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetBaseSize => "get_base_size",
            Self::GetGroupLocations => "get_group_locations",
            Self::GetNodesForGroup => "get_nodes_for_group",
        }
    }

    /// Looks a command up by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
