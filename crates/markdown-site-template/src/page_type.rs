use std::fmt;

/// Kind of page being assembled. Carried for navigation-highlight intent;
/// the emitted markup is currently identical for every variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PageType {
    Readme,
    QuickReference,
    Notebook,
    Index,
}

impl PageType {
    pub const ALL: &'static [PageType] = &[
        PageType::Readme,
        PageType::QuickReference,
        PageType::Notebook,
        PageType::Index,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Readme => "readme",
            PageType::QuickReference => "quick-reference",
            PageType::Notebook => "notebook",
            PageType::Index => "index",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageType {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "readme" => Ok(PageType::Readme),
            "quick-reference" => Ok(PageType::QuickReference),
            "notebook" => Ok(PageType::Notebook),
            "index" => Ok(PageType::Index),
            _ => Err(()),
        }
    }
}
