//! Person records as they come out of the record file.
//!
//! A [`PersonRecord`] is the flat, typed form of one row. It carries no
//! derived relations: the parent reference is still a raw identifier and is
//! only resolved when the tree is built.

use std::fmt;

/// Sex of a person.
///
/// The declaration order is significant: spouses in a family row are sorted
/// by `(Sex, id)`, which places male spouses before female ones and unknown
/// ones last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Interprets a free-form sex marker.
    ///
    /// `male`/`m` and `female`/`f` are accepted in any case; everything else
    /// (including an empty marker) is [`Sex::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use stemma_core::person::Sex;
    /// assert_eq!(Sex::from_marker("M"), Sex::Male);
    /// assert_eq!(Sex::from_marker("female"), Sex::Female);
    /// assert_eq!(Sex::from_marker("?"), Sex::Unknown);
    /// ```
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Unknown,
        }
    }

    pub fn is_male(self) -> bool {
        self == Self::Male
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One person of the family file.
///
/// Descriptive fields are kept verbatim; dates in particular are free text
/// (`"1874"`, `"ca. 1790"`, `"12/03/1901"`) and are never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonRecord {
    id: String,
    lineage: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    sex: Sex,
    birth: Option<String>,
    death: Option<String>,
    wedding: Option<String>,
    parent_ref: Option<String>,
}

impl PersonRecord {
    /// Creates a record with the given identifier.
    ///
    /// The record starts out as a spouse (not lineage) of unknown sex,
    /// attached beneath the root.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Marks the record as a blood descendant (or not).
    pub fn with_lineage(mut self, lineage: bool) -> Self {
        self.lineage = lineage;
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_first_name(mut self, first_name: Option<String>) -> Self {
        self.first_name = first_name;
        self
    }

    pub fn with_last_name(mut self, last_name: Option<String>) -> Self {
        self.last_name = last_name;
        self
    }

    pub fn with_birth(mut self, birth: Option<String>) -> Self {
        self.birth = birth;
        self
    }

    pub fn with_death(mut self, death: Option<String>) -> Self {
        self.death = death;
        self
    }

    pub fn with_wedding(mut self, wedding: Option<String>) -> Self {
        self.wedding = wedding;
        self
    }

    /// Sets the identifier this record attaches beneath.
    ///
    /// `None` attaches the record directly under the root.
    pub fn with_parent_ref(mut self, parent_ref: Option<String>) -> Self {
        self.parent_ref = parent_ref;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lineage(&self) -> bool {
        self.lineage
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn birth(&self) -> Option<&str> {
        self.birth.as_deref()
    }

    pub fn death(&self) -> Option<&str> {
        self.death.as_deref()
    }

    pub fn wedding(&self) -> Option<&str> {
        self.wedding.as_deref()
    }

    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_ref.as_deref()
    }

    /// Returns the display name: first and last name joined by a space.
    ///
    /// Falls back to the identifier when both names are missing.
    pub fn display_name(&self) -> String {
        match (self.first_name(), self.last_name()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.id.clone(),
        }
    }
}
