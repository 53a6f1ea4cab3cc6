use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// First and last day covered by `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
pub fn period_bounds(p: &str) -> Result<(NaiveDate, NaiveDate), String> {
    let p = p.trim();
    let invalid = || format!("Invalid period: {}", p);

    // YYYY-MM-DD
    if let Ok(d) = NaiveDate::parse_from_str(p, "%Y-%m-%d") {
        return Ok((d, d));
    }

    // YYYY-MM
    if let Ok(first) = NaiveDate::parse_from_str(&format!("{}-01", p), "%Y-%m-%d") {
        let last = last_day_of_month(first.year(), first.month()).ok_or_else(invalid)?;
        return Ok((first, last));
    }

    // YYYY
    if p.len() == 4
        && let Ok(year) = p.parse::<i32>()
    {
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
        return Ok((first, last));
    }

    Err(invalid())
}

/// Resolve a period or a `START:END` range of periods to inclusive bounds.
/// `None` means today.
pub fn resolve_range(period: Option<&str>) -> Result<(NaiveDate, NaiveDate), String> {
    let Some(p) = period else {
        let t = today();
        return Ok((t, t));
    };

    if let Some((start, end)) = p.split_once(':') {
        let (from, _) = period_bounds(start)?;
        let (_, to) = period_bounds(end)?;
        if to < from {
            return Err(format!("Invalid range: {} ends before it starts", p));
        }
        return Ok((from, to));
    }

    period_bounds(p)
}
