mod common;

use std::time::Duration;

use common::{registry, training_row, MockPool};
use serde_json::json;
use trainhub_core::QueryConfig;
use trainhub_orm::{
    CriteriaParser, DatabaseValue, Find, FindError, FindOutput, ModelError, ModelMetadataProvider,
    ParseError, QueryParams,
};

fn find(params: QueryParams) -> Find {
    Find::from_provider(&registry(), "training", &params).unwrap()
}

#[tokio::test]
async fn test_page_returns_rows_and_count() {
    let pool = MockPool::new(vec![
        training_row(1, "Safety at height", 5),
        training_row(2, "Fire safety", 5),
    ]);

    let params = QueryParams::new()
        .with("company", "5")
        .with("title__like", "%safety%");
    let output = find(params).execute(&pool).await.unwrap();

    assert_eq!(output.count(), 2);
    assert_eq!(
        output.data()[0],
        json!({ "id": 1, "title": "Safety at height", "company": 5 })
    );

    let recorded = pool.recorded();
    assert_eq!(recorded.len(), 2);
    for statement in &recorded {
        assert_eq!(
            statement.params,
            vec![DatabaseValue::Int64(5), DatabaseValue::from("%safety%")]
        );
        // Values are bound, never spliced into the text
        assert!(!statement.sql.contains("%safety%"));
    }

    let sqls: Vec<_> = recorded.iter().map(|r| r.sql.as_str()).collect();
    assert!(sqls.contains(
        &"SELECT training.* FROM training LEFT JOIN company company ON training.company = company.id WHERE training.company = $1 AND training.title LIKE $2"
    ));
    assert!(sqls.contains(
        &"SELECT COUNT(0) FROM training LEFT JOIN company company ON training.company = company.id WHERE training.company = $1 AND training.title LIKE $2"
    ));
}

#[tokio::test]
async fn test_request_total_skips_data_statement() {
    let pool = MockPool::new(vec![training_row(1, "Safety", 5)]);

    let output = find(QueryParams::new().with("company", "5"))
        .request_total()
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(output, FindOutput::Total { count: 1 });
    assert_eq!(serde_json::to_value(&output).unwrap(), json!({ "count": 1 }));

    let recorded = pool.recorded();
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0].sql.starts_with("SELECT COUNT(0) FROM training"));
}

#[tokio::test]
async fn test_statements_run_concurrently() {
    let pool = MockPool::new(vec![training_row(1, "Safety", 5)])
        .with_delay(Duration::from_millis(50));

    find(QueryParams::new()).execute(&pool).await.unwrap();

    assert_eq!(pool.max_in_flight(), 2);
}

#[tokio::test]
async fn test_count_failure_fails_whole_call() {
    let pool = MockPool::new(vec![training_row(1, "Safety", 5)]).failing_when("COUNT(0)");

    let err = find(QueryParams::new()).execute(&pool).await.unwrap_err();

    match err {
        FindError::Execution(execution) => {
            assert_eq!(execution.statement, "SELECT COUNT(0) FROM training");
            assert!(matches!(execution.source, ModelError::Database(_)));
        }
        other => panic!("expected an execution error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_data_failure_is_not_a_client_error() {
    let pool = MockPool::new(vec![]).failing_when("training.*");

    let err = find(QueryParams::new()).execute(&pool).await.unwrap_err();

    assert!(!err.is_client_error());
    assert!(err.to_string().contains("SELECT training.* FROM training"));
}

#[tokio::test]
async fn test_count_matches_rows_without_pagination() {
    let rows: Vec<_> = (1..=7).map(|id| training_row(id, "Safety", 5)).collect();
    let pool = MockPool::new(rows);

    let output = find(QueryParams::new().with("company", "5"))
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(output.count(), output.data().len() as i64);
}

#[tokio::test]
async fn test_replaced_where_drops_parsed_values() {
    let pool = MockPool::new(vec![training_row(1, "Safety", 5)]);

    let find = find(QueryParams::new().with("company", "5")).where_clause("training.deleted = false");
    let rendered = find.render();

    assert!(rendered.params.is_empty());
    assert_eq!(
        rendered.query,
        "SELECT training.* FROM training LEFT JOIN company company ON training.company = company.id \
         WHERE training.deleted = false"
    );

    let output = find.execute(&pool).await.unwrap();
    assert_eq!(output.count(), 1);
    for statement in pool.recorded() {
        assert!(statement.params.is_empty());
        assert!(!statement.sql.contains('$'));
    }
}

#[tokio::test]
async fn test_replaced_where_keeps_bound_values_aligned() {
    let pool = MockPool::new(vec![training_row(1, "Safety", 5)]);

    let find = find(QueryParams::new().with("company", "5").with("title", "Safety"));
    let cost = find.next_placeholder();
    let find = find
        .add_where(format!("training.cost > {}", cost))
        .bind(100_i64)
        .where_clause_with("training.startDate >= $1", ["2024-01-01"]);

    let rendered = find.render();
    assert_eq!(
        rendered.count,
        "SELECT COUNT(0) FROM training LEFT JOIN company company ON training.company = company.id \
         WHERE training.startDate >= $1, training.cost > $2"
    );
    assert_eq!(
        rendered.params,
        vec![DatabaseValue::from("2024-01-01"), DatabaseValue::Int64(100)]
    );

    find.execute(&pool).await.unwrap();
    for statement in pool.recorded() {
        assert_eq!(statement.params, rendered.params);
    }
}

#[test]
fn test_render_is_idempotent() {
    let find = find(QueryParams::new().with("company.name", "Acme"))
        .add_columns("company.name AS companyName")
        .add_where("training.cost > 0");

    assert_eq!(find.render(), find.render());
}

#[test]
fn test_extension_monotonicity() {
    let find = find(QueryParams::new())
        .where_clause("training.deleted = false")
        .add_where("training.cost > 0")
        .add_where("training.startDate IS NOT NULL");

    assert_eq!(
        find.render().query,
        "SELECT training.* FROM training WHERE training.deleted = false, training.cost > 0, training.startDate IS NOT NULL"
    );

    let replaced = find.where_clause("training.archived = false");
    assert_eq!(
        replaced.render().query,
        "SELECT training.* FROM training WHERE training.archived = false, training.cost > 0, training.startDate IS NOT NULL"
    );
}

#[test]
fn test_join_extensions() {
    let find = find(QueryParams::new().with("company", "5"))
        .add_joins("LEFT JOIN user instructor ON training.instructor = instructor.id")
        .add_joins("LEFT JOIN room room ON training.room = room.id");

    let rendered = find.render();
    assert_eq!(
        rendered.query,
        "SELECT training.* FROM training \
         LEFT JOIN company company ON training.company = company.id, \
         LEFT JOIN user instructor ON training.instructor = instructor.id, \
         LEFT JOIN room room ON training.room = room.id \
         WHERE training.company = $1"
    );
    assert!(rendered.count.contains("LEFT JOIN room room ON training.room = room.id WHERE"));

    // Replacing the base keeps the appended fragments in call order
    let replaced = find.joins("INNER JOIN company company ON training.company = company.id");
    assert_eq!(
        replaced.render().query,
        "SELECT training.* FROM training \
         INNER JOIN company company ON training.company = company.id, \
         LEFT JOIN user instructor ON training.instructor = instructor.id, \
         LEFT JOIN room room ON training.room = room.id \
         WHERE training.company = $1"
    );

    let dropped = replaced.joins("");
    assert_eq!(
        dropped.structure().combined_joins(),
        "LEFT JOIN user instructor ON training.instructor = instructor.id, \
         LEFT JOIN room room ON training.room = room.id"
    );
}

#[test]
fn test_add_columns_appends_after_comma() {
    let rendered = find(QueryParams::new().with("company", "5"))
        .add_columns("company.name AS companyName")
        .render();

    assert!(rendered
        .query
        .starts_with("SELECT training.*, company.name AS companyName FROM training"));
    assert!(rendered.count.starts_with("SELECT COUNT(0) FROM training"));
}

#[test]
fn test_join_deduplication_across_filters() {
    let params = QueryParams::new()
        .with("user", "3")
        .with("user.name__like", "%Ana%")
        .with("training.title", "Safety")
        .with("presence", "true");
    let rendered = Find::from_provider(&registry(), "TrainingPresence", &params)
        .unwrap()
        .render();

    assert_eq!(
        rendered.query,
        "SELECT trainingpresence.* FROM trainingpresence \
         LEFT JOIN user user ON trainingpresence.user = user.id \
         LEFT JOIN training training ON trainingpresence.training = training.id \
         WHERE trainingpresence.user = $1 AND user.name LIKE $2 AND training.title = $3 \
         AND trainingpresence.presence = $4"
    );
    assert_eq!(rendered.params.len(), 4);
}

#[test]
fn test_aliased_joins() {
    let registry = registry();
    let definition = registry.fields_of("training").unwrap();
    let parser = CriteriaParser::new("training", definition).alias("instructor", "lecturer");

    let params = QueryParams::from_query_string("instructor.name=Ana&instructor__ne=9").unwrap();
    let rendered = Find::with_parser(&parser, &params).unwrap().render();

    assert_eq!(
        rendered.query,
        "SELECT training.* FROM training LEFT JOIN user lecturer ON training.instructor = lecturer.id \
         WHERE lecturer.name = $1 AND training.instructor <> $2"
    );
    assert_eq!(
        rendered.params,
        vec![DatabaseValue::from("Ana"), DatabaseValue::Int64(9)]
    );
}

#[test]
fn test_pagination_and_config() {
    let params = QueryParams::from_query_string("sort=startDate%20DESC&limit=500&skip=20").unwrap();
    let rendered = find(params)
        .with_config(QueryConfig {
            max_limit: 100,
            default_limit: Some(25),
            log_sql: false,
        })
        .render();

    assert_eq!(
        rendered.query,
        "SELECT training.* FROM training ORDER BY training.startDate DESC LIMIT 100 OFFSET 20"
    );
    assert_eq!(rendered.count, "SELECT COUNT(0) FROM training");
}

#[test]
fn test_parse_errors_are_client_errors() {
    let err = Find::from_provider(
        &registry(),
        "training",
        &QueryParams::new().with("cost__between", "1,2"),
    )
    .unwrap_err();

    assert_eq!(
        err,
        FindError::Parse(ParseError::unknown_operator("cost", "between"))
    );
    assert!(err.is_client_error());
}
