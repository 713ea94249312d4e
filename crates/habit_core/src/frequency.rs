use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HabitError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] = [
        PeriodType::Day,
        PeriodType::Week,
        PeriodType::Month,
        PeriodType::Year,
    ];

    /// Upper bound of tickable days in a single unit of this period.
    pub fn max_units(self) -> u32 {
        match self {
            PeriodType::Day => 1,
            PeriodType::Week => 7,
            PeriodType::Month => 31,
            PeriodType::Year => 366,
        }
    }

    pub fn code(self) -> char {
        match self {
            PeriodType::Day => 'd',
            PeriodType::Week => 'w',
            PeriodType::Month => 'm',
            PeriodType::Year => 'y',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'd' | 'D' => Some(PeriodType::Day),
            'w' | 'W' => Some(PeriodType::Week),
            'm' | 'M' => Some(PeriodType::Month),
            'y' | 'Y' => Some(PeriodType::Year),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PeriodType::Day => "day",
            PeriodType::Week => "week",
            PeriodType::Month => "month",
            PeriodType::Year => "year",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PeriodType {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            if let Some(period_type) = PeriodType::from_code(code) {
                return Ok(period_type);
            }
        }
        PeriodType::ALL
            .into_iter()
            .find(|candidate| candidate.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| HabitError::UnknownPeriodType(trimmed.to_string()))
    }
}

/// How often a habit should be ticked: `target_count` ticks within every block of
/// `period_count` units of `period_type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawFrequency")]
pub struct HabitFrequency {
    period_type: PeriodType,
    period_count: u32,
    target_count: u32,
}

#[derive(Deserialize)]
struct RawFrequency {
    period_type: PeriodType,
    period_count: u32,
    target_count: u32,
}

impl TryFrom<RawFrequency> for HabitFrequency {
    type Error = HabitError;

    fn try_from(raw: RawFrequency) -> Result<Self, Self::Error> {
        HabitFrequency::new(raw.period_type, raw.period_count, raw.target_count)
    }
}

impl HabitFrequency {
    pub const EVERY_DAY: HabitFrequency = HabitFrequency {
        period_type: PeriodType::Day,
        period_count: 1,
        target_count: 1,
    };

    pub fn new(
        period_type: PeriodType,
        period_count: u32,
        target_count: u32,
    ) -> Result<Self, HabitError> {
        let max = period_type.max_units().saturating_mul(period_count);
        if target_count == 0 || target_count > max {
            return Err(HabitError::InvalidFrequency {
                period_type,
                period_count,
                target_count,
                max,
            });
        }
        Ok(Self {
            period_type,
            period_count,
            target_count,
        })
    }

    pub fn period_type(&self) -> PeriodType {
        self.period_type
    }

    pub fn period_count(&self) -> u32 {
        self.period_count
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn is_every_day(&self) -> bool {
        *self == Self::EVERY_DAY
    }
}

impl Default for HabitFrequency {
    fn default() -> Self {
        Self::EVERY_DAY
    }
}

impl fmt::Display for HabitFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}{}",
            self.target_count,
            self.period_count,
            self.period_type.code()
        )
    }
}

impl FromStr for HabitFrequency {
    type Err = HabitError;

    /// Parses `<target>/<count><unit>`, e.g. `3/1w`. The count may be omitted (`3/w`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || HabitError::FrequencyParse(s.to_string());
        let (target, period) = s.trim().split_once('/').ok_or_else(parse_error)?;
        let target_count = target.trim().parse::<u32>().map_err(|_| parse_error())?;

        let period = period.trim();
        let digits_len = period.chars().take_while(|c| c.is_ascii_digit()).count();
        let period_count = if digits_len == 0 {
            1
        } else {
            period[..digits_len].parse::<u32>().map_err(|_| parse_error())?
        };
        let mut unit = period[digits_len..].chars();
        let period_type = match (unit.next(), unit.next()) {
            (Some(code), None) => PeriodType::from_code(code).ok_or_else(parse_error)?,
            _ => return Err(parse_error()),
        };

        HabitFrequency::new(period_type, period_count, target_count)
    }
}
