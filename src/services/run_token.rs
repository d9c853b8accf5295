//! Run identifier validation (`YYMMDD`)

use crate::{Error, Result};
use chrono::NaiveDate;

const RUN_TOKEN_LEN: usize = 6;

/// Check that `token` is exactly six digits forming a real `YYMMDD` date.
///
/// Two-digit years 00-68 resolve to 20xx and 69-99 to 19xx.
#[must_use]
pub fn validate(token: &str) -> bool {
    if token.len() != RUN_TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    NaiveDate::parse_from_str(token, "%y%m%d").is_ok()
}

/// A run identifier that passed [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunToken(String);

impl RunToken {
    pub fn parse(token: &str) -> Result<Self> {
        if validate(token) {
            Ok(Self(token.to_string()))
        } else {
            Err(Error::InvalidRunToken(token.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
