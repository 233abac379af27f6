//! Selection-widget options derived from catalog reference data.
use futures::try_join;
use serde::Serialize;
use std::collections::HashMap;

use super::model::{Brand, Category, DeptCategories, Department, Label, PriceLevel, ReportCode, TaxCode};
use super::CatalogApi;
use crate::http::ApiError;

/// De-duplicate by label: a repeated label keeps its first position but takes
/// the last value seen.
fn unique_by_label(pairs: impl IntoIterator<Item = (String, String)>) -> Vec<Label> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Label> = Vec::new();
    for (label, value) in pairs {
        match index.get(&label) {
            Some(&pos) => out[pos].value = value,
            None => {
                index.insert(label.clone(), out.len());
                out.push(Label { label, value });
            }
        }
    }
    out
}

pub fn department_labels(departments: &[Department]) -> Vec<Label> {
    unique_by_label(
        departments
            .iter()
            .map(|d| (d.department_name.clone(), d.department_id.to_string())),
    )
}

/// Categories grouped per department, in order of first appearance.
pub fn category_labels(categories: &[Category]) -> Vec<DeptCategories> {
    let mut dept_order: Vec<i64> = Vec::new();
    for c in categories {
        if !dept_order.contains(&c.department_id) {
            dept_order.push(c.department_id);
        }
    }
    dept_order
        .into_iter()
        .map(|dept| DeptCategories {
            department_id: dept.to_string(),
            categories: unique_by_label(
                categories
                    .iter()
                    .filter(|c| c.department_id == dept)
                    .map(|c| (c.category_name.clone(), c.category_id.to_string())),
            ),
        })
        .collect()
}

pub fn tax_code_labels(codes: &[TaxCode]) -> Vec<Label> {
    unique_by_label(
        codes
            .iter()
            .map(|c| (c.tax_code_name.clone(), c.tax_code_id.to_string())),
    )
}

/// Items reference brands by name, so the value is the name too.
pub fn brand_labels(brands: &[Brand]) -> Vec<Label> {
    unique_by_label(
        brands
            .iter()
            .map(|b| (b.brand_name.clone(), b.brand_name.clone())),
    )
}

pub fn report_code_labels(codes: &[ReportCode]) -> Vec<Label> {
    unique_by_label(
        codes
            .iter()
            .map(|c| (c.report_code_name.clone(), c.report_code_id.to_string())),
    )
}

pub fn price_level_labels(levels: &[PriceLevel]) -> Vec<Label> {
    levels
        .iter()
        .map(|l| Label::new(l.price_level_name.clone(), l.price_level.to_string()))
        .collect()
}

pub fn plain_labels(values: &[String]) -> Vec<Label> {
    values.iter().map(|v| Label::new(v.clone(), v.clone())).collect()
}

/// Every option list the item grids need for one head office.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceData {
    pub departments: Vec<Label>,
    pub categories: Vec<DeptCategories>,
    pub tax_codes: Vec<Label>,
    pub brands: Vec<Label>,
    pub report_codes: Vec<Label>,
    pub item_types: Vec<Label>,
    pub item_statuses: Vec<Label>,
    pub price_levels: Vec<Label>,
}

impl ReferenceData {
    /// Category options of one department; empty when the department is unknown.
    pub fn categories_for(&self, department_id: &str) -> &[Label] {
        self.categories
            .iter()
            .find(|d| d.department_id == department_id)
            .map(|d| d.categories.as_slice())
            .unwrap_or(&[])
    }
}

pub async fn load_reference_data(
    catalog: &dyn CatalogApi,
    public_token: &str,
) -> Result<ReferenceData, ApiError> {
    let (departments, categories, tax_codes, brands, report_codes, item_types, item_statuses, price_levels) = try_join!(
        catalog.departments(public_token),
        catalog.categories(public_token),
        catalog.tax_codes(public_token),
        catalog.brands(public_token),
        catalog.report_codes(public_token),
        catalog.item_types(),
        catalog.item_statuses(),
        catalog.price_levels(public_token),
    )?;

    Ok(ReferenceData {
        departments: department_labels(&departments),
        categories: category_labels(&categories),
        tax_codes: tax_code_labels(&tax_codes),
        brands: brand_labels(&brands),
        report_codes: report_code_labels(&report_codes),
        item_types: plain_labels(&item_types),
        item_statuses: plain_labels(&item_statuses),
        price_levels: price_level_labels(&price_levels),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: i64, name: &str) -> Department {
        Department {
            department_id: id,
            department_name: name.into(),
            ..Default::default()
        }
    }

    fn cat(id: i64, dept: i64, name: &str) -> Category {
        Category {
            category_id: id,
            department_id: dept,
            category_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn repeated_names_keep_position_take_last_value() {
        let labels = department_labels(&[dept(1, "Drinks"), dept(2, "Snacks"), dept(3, "Drinks")]);
        assert_eq!(
            labels,
            vec![Label::new("Drinks", "3"), Label::new("Snacks", "2")]
        );
    }

    #[test]
    fn categories_grouped_by_department() {
        let grouped = category_labels(&[
            cat(10, 2, "Chips"),
            cat(11, 1, "Soda"),
            cat(12, 2, "Nuts"),
            cat(13, 2, "Chips"),
        ]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].department_id, "2");
        assert_eq!(
            grouped[0].categories,
            vec![Label::new("Chips", "13"), Label::new("Nuts", "12")]
        );
        assert_eq!(grouped[1].categories, vec![Label::new("Soda", "11")]);

        let data = ReferenceData {
            categories: grouped,
            ..Default::default()
        };
        assert_eq!(data.categories_for("1").len(), 1);
        assert!(data.categories_for("99").is_empty());
    }

    #[test]
    fn brand_value_is_name() {
        let labels = brand_labels(&[Brand {
            brand_id: 4,
            brand_name: "Acme".into(),
            brand_desc: String::new(),
        }]);
        assert_eq!(labels, vec![Label::new("Acme", "Acme")]);
    }
}
