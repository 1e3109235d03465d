// Calendar helpers for date fields

/// Three-letter month abbreviations, January first
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviation for a 1-based month number
pub fn month_name(month: u8) -> Option<&'static str> {
    match month {
        1..=12 => Some(MONTHS[month as usize - 1]),
        _ => None,
    }
}

/// 1-based month number for an abbreviation (case-sensitive)
pub fn month_number(name: &str) -> Option<u8> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|idx| idx as u8 + 1)
}

/// Gregorian leap year rule
pub fn is_leap_year(year: u64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a 1-based month, or None for an invalid month
pub fn days_in_month(month: u8, year: u64) -> Option<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 if is_leap_year(year) => Some(29),
        2 => Some(28),
        _ => None,
    }
}

/// Check that @day exists in @month of @year
pub fn is_valid_date(day: u64, month: u8, year: u64) -> bool {
    match days_in_month(month, year) {
        Some(days) => day >= 1 && day <= days as u64,
        None => false,
    }
}
