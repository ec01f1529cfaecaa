// Fixed month table shared by every component that needs calendar order.
//
// Names are constants rather than locale lookups so the month columns are
// identical on every machine.

/// `(number, full name, 3-letter lowercase abbreviation)` in calendar order.
pub const MONTHS: [(u32, &str, &str); 12] = [
    (1, "Janeiro", "jan"),
    (2, "Fevereiro", "fev"),
    (3, "Março", "mar"),
    (4, "Abril", "abr"),
    (5, "Maio", "mai"),
    (6, "Junho", "jun"),
    (7, "Julho", "jul"),
    (8, "Agosto", "ago"),
    (9, "Setembro", "set"),
    (10, "Outubro", "out"),
    (11, "Novembro", "nov"),
    (12, "Dezembro", "dez"),
];

/// Full month name for `month` (1-12).
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS.iter().find(|(n, _, _)| *n == month).map(|(_, name, _)| *name)
}

/// Short `"mon/yy"` column label, e.g. `jan/23`.
pub fn short_label(month: u32, year: i32) -> Option<String> {
    MONTHS
        .iter()
        .find(|(n, _, _)| *n == month)
        .map(|(_, _, abbr)| format!("{}/{:02}", abbr, year.rem_euclid(100)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_in_calendar_order() {
        let numbers: Vec<u32> = MONTHS.iter().map(|(n, _, _)| *n).collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_month_name_lookup() {
        assert_eq!(month_name(1), Some("Janeiro"));
        assert_eq!(month_name(12), Some("Dezembro"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label(1, 2023).as_deref(), Some("jan/23"));
        assert_eq!(short_label(9, 2005).as_deref(), Some("set/05"));
        assert_eq!(short_label(13, 2023), None);
    }
}
