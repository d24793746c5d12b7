//! Sleep quality rating
//!
//! Rated after a night is stopped, on a 0..=5 scale:
//! ```text
//! 0 Very bad
//! 1 Poor
//! 2 So-so
//! 3 OK
//! 4 Pretty good
//! 5 Excellent
//! ```

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::NightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepQuality {
    VeryBad,
    Poor,
    SoSo,
    Ok,
    PrettyGood,
    Excellent,
}

impl SleepQuality {
    pub const ALL: [SleepQuality; 6] = [
        SleepQuality::VeryBad,
        SleepQuality::Poor,
        SleepQuality::SoSo,
        SleepQuality::Ok,
        SleepQuality::PrettyGood,
        SleepQuality::Excellent,
    ];

    /// Numeric score as stored in the database
    pub fn score(&self) -> i64 {
        match self {
            SleepQuality::VeryBad => 0,
            SleepQuality::Poor => 1,
            SleepQuality::SoSo => 2,
            SleepQuality::Ok => 3,
            SleepQuality::PrettyGood => 4,
            SleepQuality::Excellent => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SleepQuality::VeryBad => "Very bad",
            SleepQuality::Poor => "Poor",
            SleepQuality::SoSo => "So-so",
            SleepQuality::Ok => "OK",
            SleepQuality::PrettyGood => "Pretty good",
            SleepQuality::Excellent => "Excellent",
        }
    }
}

impl TryFrom<i64> for SleepQuality {
    type Error = NightError;

    fn try_from(score: i64) -> Result<Self, Self::Error> {
        usize::try_from(score)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(NightError::InvalidQuality(score))
    }
}

impl std::fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ToSql for SleepQuality {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.score()))
    }
}

impl FromSql for SleepQuality {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let score = i64::column_result(value)?;
        SleepQuality::try_from(score).map_err(|_| FromSqlError::OutOfRange(score))
    }
}
