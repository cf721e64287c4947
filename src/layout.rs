//! Column layouts for the member tables found in different export flavours.
//!
//! Each layout is a descriptor: the ordered cell kinds a row must start with
//! and the positions of the canonical name, short name, and flags columns.
use std::fmt;
use std::str::FromStr;

/// Markup cell kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// `<td>`
    Data,
    /// `<th>`
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportLayout {
    /// CN, name, SAM name, created, changed, last logon, flags.
    #[default]
    Detailed,
    /// CN, SAM name, flags.
    Minimal,
    /// CN in a header cell, then SAM name and flags.
    HeaderCell,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown export layout: {0} (expected detailed, minimal or header-cell)")]
pub struct UnknownLayout(pub String);

impl ExportLayout {
    pub const ALL: [ExportLayout; 3] = [Self::Detailed, Self::Minimal, Self::HeaderCell];

    pub fn name(self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Minimal => "minimal",
            Self::HeaderCell => "header-cell",
        }
    }

    /// Leading cell kinds a row fragment must present.
    pub fn cells(self) -> &'static [CellKind] {
        use CellKind::*;
        match self {
            Self::Detailed => &[Data, Data, Data, Data, Data, Data, Data],
            Self::Minimal => &[Data, Data, Data],
            Self::HeaderCell => &[Header, Data, Data],
        }
    }

    pub fn column_count(self) -> usize {
        self.cells().len()
    }

    pub fn canonical_index(self) -> usize {
        0
    }

    pub fn short_index(self) -> usize {
        match self {
            Self::Detailed => 2,
            Self::Minimal | Self::HeaderCell => 1,
        }
    }

    pub fn flags_index(self) -> usize {
        match self {
            Self::Detailed => 6,
            Self::Minimal | Self::HeaderCell => 2,
        }
    }
}

impl fmt::Display for ExportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportLayout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|l| l.name() == wanted)
            .ok_or_else(|| UnknownLayout(s.to_string()))
    }
}
