use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Immutable problem data: roll capacity plus an ordered list of item
/// widths and demands. Produced by [`Instance::from_path`] and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    pub capacity: f64,
    pub widths: Vec<f64>,
    pub demands: Vec<f64>,
}

impl Instance {
    /// Number of item types.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.widths.len()
    }

    /// Load an instance from the plain-text format: first line is the
    /// capacity, each following line is `width demand`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Input(format!("cannot read instance file {}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());
        Self::parse(&name, &text)
    }

    /// Parse instance text. Validates the implicit preconditions the
    /// master problem relies on: positive capacity, positive widths,
    /// nonnegative demands, and every item fitting into one roll.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let capacity: f64 = lines
            .next()
            .ok_or_else(|| Error::Input("empty instance file".to_string()))?
            .trim()
            .parse()
            .map_err(|_| Error::Input("first line must be the roll capacity".to_string()))?;
        if capacity <= 0.0 {
            return Err(Error::Input(format!("capacity must be positive, got {capacity}")));
        }

        let mut widths = Vec::new();
        let mut demands = Vec::new();
        for (lineno, line) in lines.enumerate() {
            let mut fields = line.split_whitespace();
            let parse = |field: Option<&str>| -> Result<f64> {
                field
                    .ok_or_else(|| {
                        Error::Input(format!("line {}: expected `width demand`", lineno + 2))
                    })?
                    .parse()
                    .map_err(|_| Error::Input(format!("line {}: non-numeric value", lineno + 2)))
            };
            let width = parse(fields.next())?;
            let demand = parse(fields.next())?;
            if width <= 0.0 {
                return Err(Error::Input(format!(
                    "line {}: width must be positive, got {width}",
                    lineno + 2
                )));
            }
            if demand < 0.0 {
                return Err(Error::Input(format!(
                    "line {}: demand must be nonnegative, got {demand}",
                    lineno + 2
                )));
            }
            widths.push(width);
            demands.push(demand);
        }

        if widths.is_empty() {
            return Err(Error::Input("instance has no items".to_string()));
        }

        // An item wider than the roll makes its coverage constraint
        // unsatisfiable. Surface that here, before any model exists.
        for (item, &width) in widths.iter().enumerate() {
            if width > capacity {
                return Err(Error::Infeasible { item, width, capacity });
            }
        }

        Ok(Instance {
            name: name.to_string(),
            capacity,
            widths,
            demands,
        })
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Larger piece: {}", self.capacity)?;
        for i in 0..self.num_items() {
            writeln!(
                f,
                "Piece: {}\tSize : {}\tDemand: {}",
                i + 1,
                self.widths[i],
                self.demands[i]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_capacity_and_items() {
        let ins = Instance::parse("t", "10\n4 10\n3 2\n").unwrap();
        assert_eq!(ins.capacity, 10.0);
        assert_eq!(ins.num_items(), 2);
        assert_eq!(ins.widths, vec![4.0, 3.0]);
        assert_eq!(ins.demands, vec![10.0, 2.0]);
    }

    #[test]
    fn skips_blank_lines() {
        let ins = Instance::parse("t", "10\n\n4 10\n\n").unwrap();
        assert_eq!(ins.num_items(), 1);
    }

    #[test]
    fn rejects_empty_and_malformed() {
        assert!(matches!(Instance::parse("t", ""), Err(Error::Input(_))));
        assert!(matches!(Instance::parse("t", "10\n4\n"), Err(Error::Input(_))));
        assert!(matches!(Instance::parse("t", "10\nfoo bar\n"), Err(Error::Input(_))));
        assert!(matches!(Instance::parse("t", "10\n-1 2\n"), Err(Error::Input(_))));
        assert!(matches!(Instance::parse("t", "0\n4 1\n"), Err(Error::Input(_))));
    }

    #[test]
    fn detects_item_wider_than_capacity() {
        let err = Instance::parse("t", "10\n4 1\n12 3\n").unwrap_err();
        match err {
            Error::Infeasible { item, width, capacity } => {
                assert_eq!(item, 1);
                assert_eq!(width, 12.0);
                assert_eq!(capacity, 10.0);
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }
}
