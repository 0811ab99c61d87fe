/// Category label for primary or secondary strata.
/// Examples: `skincare`, `hair_body`, `makeup::lip`
pub type CategoryLabel = String;
/// Column name in an input or output table.
/// Examples: `category_1`, `rating`, `text`
pub type ColumnName = String;
/// Stable record identity: the original row index at ingestion time.
/// Survives filtering, extraction, and balancing unchanged.
pub type RowId = usize;
/// Human-readable note describing a data-availability shortfall.
/// Example: `sentiment neutral: 120 rows short (leftover pool exhausted)`
pub type ShortfallNote = String;
