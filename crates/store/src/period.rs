use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Competency period (month/year) a batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Competencia {
    pub ano: i32,
    pub mes: u32,
}

impl Competencia {
    /// Either part missing is [`StoreError::MissingPeriod`]; out-of-range
    /// parts are [`StoreError::InvalidPeriod`].
    pub fn new(mes: Option<u32>, ano: Option<i32>) -> Result<Self, StoreError> {
        let (Some(mes), Some(ano)) = (mes, ano) else {
            return Err(StoreError::MissingPeriod);
        };
        if !(1..=12).contains(&mes) {
            return Err(StoreError::InvalidPeriod(format!("month {mes} is not in 1-12")));
        }
        if !(1000..=9999).contains(&ano) {
            return Err(StoreError::InvalidPeriod(format!("year {ano} is not four digits")));
        }
        Ok(Self { ano, mes })
    }

    /// Parse user-entered text. Blank parts count as missing.
    pub fn parse(mes: &str, ano: &str) -> Result<Self, StoreError> {
        let (mes, ano) = (mes.trim(), ano.trim());
        if mes.is_empty() || ano.is_empty() {
            return Err(StoreError::MissingPeriod);
        }
        let mes: u32 = mes
            .parse()
            .map_err(|_| StoreError::InvalidPeriod(format!("month '{mes}' is not a number")))?;
        let ano: i32 = ano
            .parse()
            .map_err(|_| StoreError::InvalidPeriod(format!("year '{ano}' is not a number")))?;
        Self::new(Some(mes), Some(ano))
    }

    /// Parse a stored key (`"2024-03"`).
    pub fn from_key(key: &str) -> Result<Self, StoreError> {
        match key.trim().split_once('-') {
            Some((ano, mes)) => Self::parse(mes, ano),
            None => Err(StoreError::InvalidPeriod(format!("'{key}' is not YYYY-MM"))),
        }
    }

    /// `"<ano>-<mm>"`, the batch identity.
    pub fn key(&self) -> String {
        format!("{}-{:02}", self.ano, self.mes)
    }

    /// `"<mm>/<ano>"`, for display.
    pub fn label(&self) -> String {
        format!("{:02}/{}", self.mes, self.ano)
    }
}

impl fmt::Display for Competencia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
