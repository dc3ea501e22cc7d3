/// Static map from caller-facing field names to storage column names.
///
/// Lookup is total: a name with no entry resolves to itself.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMapping {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnMapping {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn resolve<'a>(&self, external: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(from, _)| *from == external)
            .map(|(_, to)| *to)
            .unwrap_or(external)
    }
}

pub const COMPANY_COLUMNS: ColumnMapping =
    ColumnMapping::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

pub const JOB_COLUMNS: ColumnMapping = ColumnMapping::new(&[("companyHandle", "company_handle")]);

pub const USER_COLUMNS: ColumnMapping = ColumnMapping::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);
