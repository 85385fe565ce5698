//! Positional layout of the sheets the core reads and writes.
//!
//! Column and cell positions are a fixed contract with the spreadsheet templates.
//! They are named here and validated once, so a format change fails with a clear
//! error instead of silently misreading fields.

use crate::domain::{CellValue, DomainError, PaymentRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Zero-indexed cell position. Renders as a 1-indexed A1-style address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Column letters for a zero-based column index (0 -> A, 12 -> M, 26 -> AA).
    pub fn column_letters(col: usize) -> String {
        let mut n = col + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        String::from_utf8_lossy(&letters).into_owned()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| DomainError::Schema(format!("invalid cell address '{}'", s)))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::Schema(format!("invalid cell address '{}'", s)));
        }
        let row: usize = digits
            .parse()
            .map_err(|_| DomainError::Schema(format!("invalid cell address '{}'", s)))?;
        if row == 0 {
            return Err(DomainError::Schema(format!("invalid cell address '{}'", s)));
        }
        let col = letters
            .chars()
            .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
        Ok(Self {
            row: row - 1,
            col: col - 1,
        })
    }
}

/// Column mapping of the "Invoices paid" log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLogSchema {
    pub recipient: usize,
    pub name: usize,
    pub amount: usize,
    pub currency: usize,
    pub notified: usize,
}

impl Default for PaymentLogSchema {
    fn default() -> Self {
        Self {
            recipient: 0,
            name: 1,
            amount: 3,
            currency: 4,
            notified: 12,
        }
    }
}

impl PaymentLogSchema {
    fn columns(&self) -> [(&'static str, usize); 5] {
        [
            ("recipient", self.recipient),
            ("name", self.name),
            ("amount", self.amount),
            ("currency", self.currency),
            ("notified", self.notified),
        ]
    }

    /// Every field must map to its own column.
    pub fn validate(&self) -> Result<(), DomainError> {
        let cols = self.columns();
        for (i, (a, ca)) in cols.iter().enumerate() {
            for (b, cb) in cols.iter().skip(i + 1) {
                if ca == cb {
                    return Err(DomainError::Schema(format!(
                        "fields '{}' and '{}' both map to column {}",
                        a,
                        b,
                        CellAddress::column_letters(*ca)
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.columns().iter().map(|(_, c)| *c).max().unwrap_or(0) + 1
    }

    /// The header row must span every mapped column; a narrower log has changed format.
    pub fn check_header(&self, header: &[CellValue]) -> Result<(), DomainError> {
        if header.len() < self.width() {
            return Err(DomainError::Schema(format!(
                "header has {} columns, expected at least {} (notified flag in column {})",
                header.len(),
                self.width(),
                CellAddress::column_letters(self.notified)
            )));
        }
        Ok(())
    }

    pub fn row(&self, index: usize, cells: &[CellValue]) -> PaymentRow {
        let cell = |col: usize| cells.get(col).cloned().unwrap_or_default();
        PaymentRow {
            index,
            recipient: cell(self.recipient),
            name: cell(self.name),
            amount: cell(self.amount),
            currency: cell(self.currency),
            notified: cell(self.notified),
        }
    }

    /// Where the notified flag of grid row `index` is persisted.
    pub fn flag_address(&self, index: usize) -> CellAddress {
        CellAddress::new(index, self.notified)
    }
}

/// Fixed cells holding the cross-referenced form ids in the supplier database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsLayout {
    pub sheet: String,
    pub invoice_form_cell: CellAddress,
    pub supplier_form_cell: CellAddress,
}

impl Default for SettingsLayout {
    fn default() -> Self {
        Self {
            sheet: "Settings".to_string(),
            invoice_form_cell: CellAddress::new(0, 1),
            supplier_form_cell: CellAddress::new(1, 1),
        }
    }
}

/// Where the payment log and its message template live inside the log document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailDataLayout {
    pub log_sheet: String,
    pub template_sheet: String,
    pub subject_cell: CellAddress,
    pub body_cell: CellAddress,
}

impl Default for MailDataLayout {
    fn default() -> Self {
        Self {
            log_sheet: "Invoices paid".to_string(),
            template_sheet: "Email data".to_string(),
            subject_cell: CellAddress::new(3, 2),
            body_cell: CellAddress::new(4, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        assert_eq!(CellAddress::new(0, 1).to_string(), "B1");
        assert_eq!(CellAddress::new(4, 2).to_string(), "C5");
        assert_eq!(CellAddress::new(1, 12).to_string(), "M2");
        assert_eq!(CellAddress::new(9, 26).to_string(), "AA10");
    }

    #[test]
    fn test_address_parse() {
        assert_eq!("B2".parse::<CellAddress>().unwrap(), CellAddress::new(1, 1));
        assert_eq!("m14".parse::<CellAddress>().unwrap(), CellAddress::new(13, 12));
        assert_eq!("AB1".parse::<CellAddress>().unwrap(), CellAddress::new(0, 27));
        assert!("B0".parse::<CellAddress>().is_err());
        assert!("12".parse::<CellAddress>().is_err());
        assert!("B".parse::<CellAddress>().is_err());
    }

    #[test]
    fn test_default_schema_flag_column_is_m() {
        let schema = PaymentLogSchema::default();
        schema.validate().unwrap();
        assert_eq!(schema.flag_address(1).to_string(), "M2");
        assert_eq!(schema.width(), 13);
    }

    #[test]
    fn test_schema_rejects_shared_column() {
        let schema = PaymentLogSchema {
            currency: 3,
            ..PaymentLogSchema::default()
        };
        assert!(matches!(schema.validate(), Err(DomainError::Schema(_))));
    }

    #[test]
    fn test_schema_rejects_narrow_header() {
        let schema = PaymentLogSchema::default();
        let header = vec![CellValue::text("Email"); 5];
        assert!(schema.check_header(&header).is_err());
        let header = vec![CellValue::text("col"); 13];
        assert!(schema.check_header(&header).is_ok());
    }

    #[test]
    fn test_row_reads_missing_cells_as_empty() {
        let schema = PaymentLogSchema::default();
        let row = schema.row(3, &[CellValue::text("a@x.com"), CellValue::text("Ann")]);
        assert_eq!(row.index, 3);
        assert!(row.has_recipient());
        assert_eq!(row.amount, CellValue::Empty);
        assert!(row.is_pending());
    }
}
