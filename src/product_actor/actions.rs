/// Custom actions for Product entities.
///
/// Every stock mutation is expressed as an action so the product actor applies
/// it against the current value; nothing outside the actor ever writes a
/// stock number it read earlier.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Subtracts the amount only if enough stock is available.
    ReserveStock(u32),
    /// Puts previously reserved stock back (compensation after a failed checkout).
    Restock(u32),
    /// Overwrites the stock level (admin correction).
    SetStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction and
/// carry the stock level after the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    ReserveStock(u32),
    Restock(u32),
    SetStock(u32),
}

impl ProductActionResult {
    pub fn stock(&self) -> u32 {
        match self {
            Self::ReserveStock(level)
            | Self::Restock(level)
            | Self::SetStock(level) => *level,
        }
    }
}
