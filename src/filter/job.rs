use serde_json::json;

use super::error::FilterError;
use super::types::{contains_pattern, ensure_unique, parse_count, parse_flag, Predicate, SearchFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum JobCriterion {
    Title(String),
    MinSalary(i64),
    HasEquity(bool),
}

/// Job search: `title`, `minSalary`, `hasEquity`.
///
/// `hasEquity=true` narrows to jobs with equity above zero; `false` adds no
/// condition at all, so a filter holding only `hasEquity=false` builds an
/// empty predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    criteria: Vec<JobCriterion>,
}

impl JobFilter {
    pub fn new(criteria: Vec<JobCriterion>) -> Self {
        Self { criteria }
    }
}

impl SearchFilter for JobFilter {
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FilterError> {
        let mut seen = Vec::new();
        let mut criteria = Vec::new();
        for (key, value) in pairs {
            let criterion = match key.as_str() {
                "title" => {
                    ensure_unique(&mut seen, "title")?;
                    JobCriterion::Title(value.clone())
                }
                "minSalary" => {
                    ensure_unique(&mut seen, "minSalary")?;
                    JobCriterion::MinSalary(parse_count(key, value)?)
                }
                "hasEquity" => {
                    ensure_unique(&mut seen, "hasEquity")?;
                    JobCriterion::HasEquity(parse_flag(key, value)?)
                }
                _ => continue,
            };
            criteria.push(criterion);
        }
        Ok(Self { criteria })
    }

    fn build(&self) -> Result<Predicate, FilterError> {
        if self.criteria.is_empty() {
            return Err(FilterError::NoCriteria);
        }

        let mut predicate = Predicate::new();
        for c in &self.criteria {
            match c {
                JobCriterion::Title(title) => {
                    let condition = format!("\"title\" ILIKE {}", predicate.param(contains_pattern(title)));
                    predicate.push(condition);
                }
                JobCriterion::MinSalary(n) => {
                    let condition = format!("\"salary\" >= {}", predicate.param(json!(n)));
                    predicate.push(condition);
                }
                JobCriterion::HasEquity(true) => predicate.push("\"equity\" > 0".to_string()),
                JobCriterion::HasEquity(false) => {}
            }
        }
        Ok(predicate)
    }
}
