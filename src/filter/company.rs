use serde_json::json;

use super::error::FilterError;
use super::types::{contains_pattern, ensure_unique, parse_count, Predicate, SearchFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum CompanyCriterion {
    NameLike(String),
    MinEmployees(i64),
    MaxEmployees(i64),
}

/// Company search: `nameLike`, `minEmployees`, `maxEmployees`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    criteria: Vec<CompanyCriterion>,
}

impl CompanyFilter {
    pub fn new(criteria: Vec<CompanyCriterion>) -> Self {
        Self { criteria }
    }

    fn bounds(&self) -> (Option<i64>, Option<i64>) {
        let mut min = None;
        let mut max = None;
        for c in &self.criteria {
            match c {
                CompanyCriterion::MinEmployees(n) => min = Some(*n),
                CompanyCriterion::MaxEmployees(n) => max = Some(*n),
                CompanyCriterion::NameLike(_) => {}
            }
        }
        (min, max)
    }
}

impl SearchFilter for CompanyFilter {
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FilterError> {
        let mut seen = Vec::new();
        let mut criteria = Vec::new();
        for (key, value) in pairs {
            let criterion = match key.as_str() {
                "nameLike" => {
                    ensure_unique(&mut seen, "nameLike")?;
                    CompanyCriterion::NameLike(value.clone())
                }
                "minEmployees" => {
                    ensure_unique(&mut seen, "minEmployees")?;
                    CompanyCriterion::MinEmployees(parse_count(key, value)?)
                }
                "maxEmployees" => {
                    ensure_unique(&mut seen, "maxEmployees")?;
                    CompanyCriterion::MaxEmployees(parse_count(key, value)?)
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
        if let (Some(min), Some(max)) = self.bounds() {
            if min > max {
                return Err(FilterError::InvertedRange {
                    min_key: "minEmployees",
                    max_key: "maxEmployees",
                });
            }
        }

        let mut predicate = Predicate::new();
        for c in &self.criteria {
            let condition = match c {
                CompanyCriterion::NameLike(name) => format!("\"name\" ILIKE {}", predicate.param(contains_pattern(name))),
                CompanyCriterion::MinEmployees(n) => format!("\"num_employees\" >= {}", predicate.param(json!(n))),
                CompanyCriterion::MaxEmployees(n) => format!("\"num_employees\" <= {}", predicate.param(json!(n))),
            };
            predicate.push(condition);
        }
        Ok(predicate)
    }
}
