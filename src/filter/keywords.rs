use std::fmt;
use std::str::FromStr;

/// Keywords with engine-defined semantics. Each one appears at most once in a
/// filter, and `Sort`/`SortReverse` exclude each other.
///
/// Declaration order is the canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaKeyword {
    ApplyOverrides,
    Levels,
    Rows,
    MinQod,
    First,
    Sort,
    SortReverse,
}

impl MetaKeyword {
    pub const ALL: [MetaKeyword; 7] = [
        MetaKeyword::ApplyOverrides,
        MetaKeyword::Levels,
        MetaKeyword::Rows,
        MetaKeyword::MinQod,
        MetaKeyword::First,
        MetaKeyword::Sort,
        MetaKeyword::SortReverse,
    ];

    /// Look up a meta keyword by its (already lower-cased) name.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "apply_overrides" => Some(MetaKeyword::ApplyOverrides),
            "levels" => Some(MetaKeyword::Levels),
            "rows" => Some(MetaKeyword::Rows),
            "min_qod" => Some(MetaKeyword::MinQod),
            "first" => Some(MetaKeyword::First),
            "sort" => Some(MetaKeyword::Sort),
            "sort-reverse" => Some(MetaKeyword::SortReverse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKeyword::ApplyOverrides => "apply_overrides",
            MetaKeyword::Levels => "levels",
            MetaKeyword::Rows => "rows",
            MetaKeyword::MinQod => "min_qod",
            MetaKeyword::First => "first",
            MetaKeyword::Sort => "sort",
            MetaKeyword::SortReverse => "sort-reverse",
        }
    }

    /// The keyword that cannot coexist with this one, if any.
    pub fn exclusive_with(&self) -> Option<MetaKeyword> {
        match self {
            MetaKeyword::Sort => Some(MetaKeyword::SortReverse),
            MetaKeyword::SortReverse => Some(MetaKeyword::Sort),
            _ => None,
        }
    }

    /// Pagination and ordering keywords, i.e. the ones that describe how a
    /// result page is cut rather than which entities match.
    pub fn is_paging(&self) -> bool {
        matches!(
            self,
            MetaKeyword::First | MetaKeyword::Rows | MetaKeyword::Sort | MetaKeyword::SortReverse
        )
    }

    /// Whether `value` is well-formed for this keyword.
    ///
    /// Ill-formed values are still kept in the filter; typed accessors treat
    /// them as absent.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            MetaKeyword::ApplyOverrides => matches!(value, "0" | "1"),
            MetaKeyword::Levels => value.parse::<SeverityLevels>().is_ok(),
            MetaKeyword::Rows => value.parse::<u32>().is_ok(),
            MetaKeyword::MinQod => value.parse::<u8>().is_ok_and(|qod| qod <= 100),
            MetaKeyword::First => value.parse::<u32>().is_ok_and(|first| first >= 1),
            MetaKeyword::Sort | MetaKeyword::SortReverse => !value.is_empty(),
        }
    }
}

impl fmt::Display for MetaKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity classes selectable through the `levels` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityClass {
    High,
    Medium,
    Low,
    Log,
}

impl SeverityClass {
    pub fn code(&self) -> char {
        match self {
            SeverityClass::High => 'h',
            SeverityClass::Medium => 'm',
            SeverityClass::Low => 'l',
            SeverityClass::Log => 'g',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'h' => Some(SeverityClass::High),
            'm' => Some(SeverityClass::Medium),
            'l' => Some(SeverityClass::Low),
            'g' => Some(SeverityClass::Log),
            _ => None,
        }
    }
}

/// The `levels` mask. Keeps the order the classes were given in, so that
/// `levels=hml` is written back as `hml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityLevels {
    classes: Vec<SeverityClass>,
}

impl SeverityLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: SeverityClass) -> Self {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn contains(&self, class: SeverityClass) -> bool {
        self.classes.contains(&class)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromStr for SeverityLevels {
    type Err = char;

    /// Fails with the first character that is not a severity class code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars().try_fold(SeverityLevels::new(), |levels, c| {
            SeverityClass::from_code(c)
                .map(|class| levels.with(class))
                .ok_or(c)
        })
    }
}

impl fmt::Display for SeverityLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.classes
            .iter()
            .try_for_each(|class| write!(f, "{}", class.code()))
    }
}
