use chrono::NaiveDate;

const SUFFIX_LEN: usize = 6;

/// `<app>-<YYYY-MM-DD>-<suffix>.<ext>`
pub fn export_file_name(app: &str, date: NaiveDate, suffix: &str, ext: &str) -> String {
    format!("{app}-{}-{suffix}.{ext}", date.format("%Y-%m-%d"))
}

/// Short random lowercase alphanumeric suffix that keeps same-day exports apart.
pub fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(SUFFIX_LEN);
    suffix
}
