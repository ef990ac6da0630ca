//! SQL generation for Find

use super::builder::Find;
use super::types::RenderedQuery;
use crate::criteria::QueryOptions;

impl Find {
    /// Render the data and count statements from the current state
    ///
    /// Rendering does not mutate the builder, so repeated calls without
    /// further extension produce identical text.
    pub fn render(&self) -> RenderedQuery {
        let columns = self.structure.combined_columns();
        let joins = self.structure.combined_joins();
        let where_clause = self.structure.combined_where();
        let options = self.effective_options();

        let query = assemble(&[
            format!("SELECT {} FROM {}", columns, self.table),
            joins.clone(),
            where_sql(&where_clause),
            options.to_sql(),
        ]);
        let count = assemble(&[
            format!("SELECT COUNT(0) FROM {}", self.table),
            joins,
            where_sql(&where_clause),
        ]);

        let rendered = RenderedQuery {
            query,
            count,
            params: self.criteria.values.clone(),
        };

        if self.config.log_sql {
            tracing::debug!(
                target: "trainhub::sql",
                model = %self.model_name,
                query = %rendered.interpolated(),
                count = %rendered.interpolated_count(),
                total_only = self.total_only,
                "Rendered list query"
            );
        }

        rendered
    }

    /// Request options with the configured limit policy applied
    pub fn effective_options(&self) -> QueryOptions {
        let mut options = self.criteria.options.clone();
        options.limit = self.config.effective_limit(options.limit);
        options
    }
}

fn where_sql(where_clause: &str) -> String {
    if where_clause.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clause)
    }
}

fn assemble(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::DatabaseValue;
    use crate::criteria::QueryParams;
    use crate::metadata::{FieldType, ModelDefinition};
    use crate::find::PLACEHOLDER;
    use trainhub_core::QueryConfig;

    /// Every `$n` used refers to a bound value, and every bound value is used
    fn placeholders_align(rendered: &RenderedQuery) -> bool {
        let mut used = vec![false; rendered.params.len()];

        for captures in PLACEHOLDER.captures_iter(&rendered.query) {
            match captures[1].parse::<usize>() {
                Ok(n) if n >= 1 && n <= used.len() => used[n - 1] = true,
                _ => return false,
            }
        }

        used.into_iter().all(|seen| seen)
    }

    fn training() -> ModelDefinition {
        ModelDefinition::new("training")
            .field("title", FieldType::String)
            .field("startDate", FieldType::Date)
            .association("company", "company")
    }

    #[test]
    fn test_render_example() {
        let params = QueryParams::new()
            .with("company", "5")
            .with("title__like", "%safety%");
        let rendered = Find::new("training", &training(), &params).unwrap().render();

        assert_eq!(
            rendered.query,
            "SELECT training.* FROM training LEFT JOIN company company ON training.company = company.id WHERE training.company = $1 AND training.title LIKE $2"
        );
        assert_eq!(
            rendered.count,
            "SELECT COUNT(0) FROM training LEFT JOIN company company ON training.company = company.id WHERE training.company = $1 AND training.title LIKE $2"
        );
        assert_eq!(
            rendered.interpolated(),
            "SELECT training.* FROM training LEFT JOIN company company ON training.company = company.id WHERE training.company = 5 AND training.title LIKE '%safety%'"
        );
    }

    #[test]
    fn test_render_without_filters_omits_where() {
        let rendered = Find::new("training", &training(), &QueryParams::new())
            .unwrap()
            .render();

        assert_eq!(rendered.query, "SELECT training.* FROM training");
        assert_eq!(rendered.count, "SELECT COUNT(0) FROM training");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_options_only_on_data_query() {
        let params = QueryParams::new()
            .with("sort", "-startDate")
            .with("limit", "5000")
            .with("skip", "10");
        let rendered = Find::new("training", &training(), &params)
            .unwrap()
            .with_config(QueryConfig {
                max_limit: 100,
                default_limit: None,
                log_sql: true,
            })
            .render();

        assert_eq!(
            rendered.query,
            "SELECT training.* FROM training ORDER BY training.startDate DESC LIMIT 100 OFFSET 10"
        );
        assert_eq!(rendered.count, "SELECT COUNT(0) FROM training");
    }

    #[test]
    fn test_default_limit_applies() {
        let rendered = Find::new("training", &training(), &QueryParams::new())
            .unwrap()
            .with_config(QueryConfig {
                max_limit: 100,
                default_limit: Some(25),
                log_sql: false,
            })
            .render();

        assert_eq!(rendered.query, "SELECT training.* FROM training LIMIT 25");
    }

    #[test]
    fn test_bound_extension() {
        let find = Find::new(
            "training",
            &training(),
            &QueryParams::new().with("title", "Safety"),
        )
        .unwrap();
        let fragment = format!("training.startDate >= {}", find.next_placeholder());
        let rendered = find
            .add_where(fragment)
            .bind(DatabaseValue::from("2024-01-01"))
            .render();

        assert_eq!(
            rendered.query,
            "SELECT training.* FROM training WHERE training.title = $1, training.startDate >= $2"
        );
        assert_eq!(rendered.params.len(), 2);
        assert!(placeholders_align(&rendered));
    }

    #[test]
    fn test_dollar_literals_render_untouched() {
        let params = QueryParams::new().with("title", "Safety");
        let rendered = Find::new("training", &training(), &params)
            .unwrap()
            .add_where("training.title <> 'Costs $5 each'")
            .render();

        assert_eq!(
            rendered.query,
            "SELECT training.* FROM training WHERE training.title = $1, training.title <> 'Costs $5 each'"
        );
        assert_eq!(rendered.params, vec![DatabaseValue::from("Safety")]);
        assert_eq!(
            rendered.interpolated(),
            "SELECT training.* FROM training WHERE training.title = 'Safety', training.title <> 'Costs $5 each'"
        );
    }

    #[test]
    fn test_placeholders_align() {
        let aligned = RenderedQuery {
            query: "SELECT * FROM t WHERE a = $1 AND b IN ($2, $3)".to_string(),
            count: String::new(),
            params: vec![DatabaseValue::Int64(1); 3],
        };
        assert!(placeholders_align(&aligned));

        let missing_value = RenderedQuery {
            params: vec![DatabaseValue::Int64(1); 2],
            ..aligned.clone()
        };
        assert!(!placeholders_align(&missing_value));

        let unused_value = RenderedQuery {
            params: vec![DatabaseValue::Int64(1); 4],
            ..aligned
        };
        assert!(!placeholders_align(&unused_value));
    }
}
