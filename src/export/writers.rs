use crate::errors::AppResult;
use serde::Serialize;
use std::io::Write;

/// Pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// CSV with a header row derived from the row type.
pub fn write_csv<W: Write, T: Serialize>(out: W, rows: &[T]) -> AppResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
