use crate::{Error, Result};
use std::path::Path;

/// Column layout of an `.adc` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcSchema {
    /// Bins named like `IFCB5_2010_264_120337`.
    Legacy,
    /// Bins named like `D20170512T092752_IFCB010`.
    Dated,
}

impl AdcSchema {
    pub fn for_bin(bin: &str) -> Self {
        if crate::pid::is_dated_bin(bin) {
            AdcSchema::Dated
        } else {
            AdcSchema::Legacy
        }
    }

    /// 0-based columns of (width, height, start byte).
    fn geometry_columns(&self) -> (usize, usize, usize) {
        match self {
            AdcSchema::Legacy => (11, 12, 13),
            AdcSchema::Dated => (15, 16, 17),
        }
    }
}

/// Position and size of one ROI inside the `.roi` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiGeometry {
    pub width: u32,
    pub height: u32,
    pub start_byte: u64,
}

impl RoiGeometry {
    pub fn has_image(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn byte_len(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Read `(target, geometry)` for every row of an `.adc` file.
pub fn read_geometry(path: &Path, schema: AdcSchema) -> Result<Vec<(u32, RoiGeometry)>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Backend(format!("cannot read {}: {}", path.display(), e)))?;
    parse_geometry(&text, schema)
        .map_err(|msg| Error::Backend(format!("{}: {}", path.display(), msg)))
}

/// Target numbers are 1-based row numbers; blank lines are ignored.
pub fn parse_geometry(
    text: &str,
    schema: AdcSchema,
) -> std::result::Result<Vec<(u32, RoiGeometry)>, String> {
    let (w_col, h_col, start_col) = schema.geometry_columns();
    let mut rows = Vec::new();

    for (line_no, line) in text.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
        let target = line_no as u32 + 1;
        let cols: Vec<&str> = line.split(',').map(str::trim).collect();

        let field = |idx: usize, name: &str| -> std::result::Result<f64, String> {
            let raw = cols
                .get(idx)
                .ok_or_else(|| format!("row {}: missing {} column", target, name))?;
            raw.parse::<f64>()
                .map_err(|_| format!("row {}: bad {} value {:?}", target, name, raw))
        };

        let width = field(w_col, "width")?;
        let height = field(h_col, "height")?;
        let start = field(start_col, "start byte")?;

        if [width, height, start].iter().any(|v| *v < 0.0 || v.fract() != 0.0) {
            return Err(format!("row {}: geometry must be non-negative integers", target));
        }
        if width > u32::MAX as f64 || height > u32::MAX as f64 || start >= u64::MAX as f64 {
            return Err(format!("row {}: geometry out of range", target));
        }

        rows.push((
            target,
            RoiGeometry {
                width: width as u32,
                height: height as u32,
                start_byte: start as u64,
            },
        ));
    }

    Ok(rows)
}
