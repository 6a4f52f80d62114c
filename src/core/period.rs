//! Budget keys - the calendar month a budget row covers and whether it is overall or per-category.
//!
//! At the storage boundary a month is a two-digit zero-padded string (`"01"`..`"12"`) and the
//! year is a plain integer; an overall budget is a row whose `category_id` is NULL. These types
//! keep the two cases apart in code and convert at the edge.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Month, Utc};
use std::fmt;

/// A calendar month/year that a budget row is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BudgetPeriod {
    year: i32,
    month: u32,
}

impl BudgetPeriod {
    /// Builds a period, rejecting months outside `1..=12`.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth {
                month: month.to_string(),
            });
        }
        Ok(Self { year, month })
    }

    /// The period containing the current UTC time.
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(&Utc::now())
    }

    /// The period a transaction dated `date` is booked against.
    #[must_use]
    pub fn from_date(date: &DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses a month as either digits (`"09"`, `"9"`) or an English name (`"September"`, `"sep"`).
    pub fn parse(month: &str, year: i32) -> Result<Self> {
        let trimmed = month.trim();
        let invalid = || Error::InvalidMonth {
            month: trimmed.to_string(),
        };

        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            let number: u32 = trimmed.parse().map_err(|_| invalid())?;
            return Self::new(number, year);
        }

        trimmed
            .parse::<Month>()
            .map(|m| Self {
                year,
                month: m.number_from_month(),
            })
            .map_err(|_| invalid())
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Storage representation of the month, e.g. `"03"`.
    #[must_use]
    pub fn month_key(self) -> String {
        format!("{:02}", self.month)
    }

    /// The month before this one, rolling back into December of the prior year.
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Steps back `months` calendar months.
    #[must_use]
    pub fn months_back(self, months: u32) -> Self {
        (0..months).fold(self, |period, _| period.previous())
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Which budget row a key refers to: the user's overall row or one category's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetScope {
    /// All-up monthly budget, stored with a NULL category
    Overall,
    /// Budget for a single category
    Category(i64),
}

impl BudgetScope {
    /// Nullable column value for this scope.
    #[must_use]
    pub const fn category_id(self) -> Option<i64> {
        match self {
            Self::Overall => None,
            Self::Category(id) => Some(id),
        }
    }
}

impl From<Option<i64>> for BudgetScope {
    fn from(category_id: Option<i64>) -> Self {
        category_id.map_or(Self::Overall, Self::Category)
    }
}

impl fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => f.write_str("overall"),
            Self::Category(id) => write!(f, "category {id}"),
        }
    }
}
