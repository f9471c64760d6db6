use chrono::{Datelike, Months, NaiveDate};

/// Length of the historical window: 4 fiscal years of monthly revenue.
pub const HISTORY_MONTHS: usize = 48;
/// Length of the forecast horizon.
pub const FORECAST_MONTHS: usize = 12;

/// Monthly revenue of a single product, aligned to the series start.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub name: String,
    pub monthly: Vec<f64>,
}

/// The full historical input: one 48-month series per product.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesHistory {
    pub products: Vec<ProductSales>,
    /// Whether every product actually supplied all 48 months.
    pub complete_48: bool,
}

impl SalesHistory {
    /// Sums all products into one 48-month series.
    pub fn aggregate(&self) -> Vec<f64> {
        let mut out = vec![0.0; HISTORY_MONTHS];
        for product in &self.products {
            for (i, value) in product.monthly.iter().enumerate().take(HISTORY_MONTHS) {
                out[i] += value;
            }
        }
        out
    }
}

/// First day of the forecast fiscal year (April-start accounting year).
pub fn fiscal_year_start(fiscal_year: i32) -> NaiveDate {
    first_of_month(fiscal_year, 4)
}

/// First month of the historical window: April, four fiscal years back.
pub fn series_start(fiscal_year: i32) -> NaiveDate {
    first_of_month(fiscal_year - 4, 4)
}

/// The month preceding the run date is the last closed month; the
/// current month and everything after it is provisional.
pub fn last_closed_month_start(run_date: NaiveDate) -> NaiveDate {
    first_of_month(run_date.year(), run_date.month()) - Months::new(1)
}

pub fn add_months(date: NaiveDate, count: usize) -> NaiveDate {
    date + Months::new(count as u32)
}

/// Whole months between the first-of-month of `start` and of `date`.
/// Negative when `date` precedes `start`.
pub fn month_index_from(start: NaiveDate, date: NaiveDate) -> i64 {
    (date.year() as i64 - start.year() as i64) * 12 + (date.month() as i64 - start.month() as i64)
}

/// One flag per series index: true when that month is closed.
pub fn closed_flags(start: NaiveDate, len: usize, last_closed: NaiveDate) -> Vec<bool> {
    (0..len).map(|i| add_months(start, i) <= last_closed).collect()
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_sums_across_products() {
        let history = SalesHistory {
            products: vec![
                ProductSales {
                    name: "A".to_string(),
                    monthly: vec![1.0; HISTORY_MONTHS],
                },
                ProductSales {
                    name: "B".to_string(),
                    monthly: vec![2.0; HISTORY_MONTHS],
                },
            ],
            complete_48: true,
        };

        let total = history.aggregate();
        assert_eq!(total.len(), HISTORY_MONTHS);
        assert!(total.iter().all(|v| (*v - 3.0).abs() < f64::EPSILON));
    }

    #[test]
    fn series_start_is_four_fiscal_years_before_april() {
        assert_eq!(
            series_start(2026),
            NaiveDate::from_ymd_opt(2022, 4, 1).unwrap()
        );
        assert_eq!(
            fiscal_year_start(2026),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
        );
    }

    #[test]
    fn last_closed_month_is_the_month_before_the_run_date() {
        let run_date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            last_closed_month_start(run_date),
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );

        let january = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(
            last_closed_month_start(january),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );
    }

    #[test]
    fn month_index_counts_whole_months() {
        let start = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        assert_eq!(month_index_from(start, start), 0);
        assert_eq!(
            month_index_from(start, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()),
            12
        );
        assert_eq!(
            month_index_from(start, NaiveDate::from_ymd_opt(2022, 3, 1).unwrap()),
            -1
        );
    }

    #[test]
    fn closed_flags_split_the_series_at_the_boundary() {
        let start = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        let last_closed = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let flags = closed_flags(start, 5, last_closed);
        assert_eq!(flags, vec![true, true, true, false, false]);
    }
}
