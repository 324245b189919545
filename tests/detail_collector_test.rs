mod common;

#[cfg(test)]
mod detail_collection {
    use std::collections::HashSet;

    use aptinfo::{
        collector::state::RunState,
        config::{create_test_config, Config, FailurePolicy},
        models::{
            apartment::{DetailRecord, ListRecord},
            detail_failure::DetailFailure,
        },
        table, CollectError, DetailCollector,
    };

    use crate::common::{list_record, FakePortal};

    fn config_with_list(dir: &tempfile::TempDir, codes: &[&str]) -> Config {
        let config = create_test_config().with_output_dir(dir.path());
        let rows: Vec<ListRecord> = codes.iter().map(|code| list_record(code, "11110")).collect();
        table::write_table(&config.list_table, &rows).unwrap();
        config
    }

    #[tokio::test]
    async fn skip_policy_logs_the_failed_identifier_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_list(&dir, &["A1", "A2", "A3", "A4", "A5"]);
        let portal = FakePortal::new().failing_detail_request(3);

        let outcome = DetailCollector::new(&portal, &config)
            .with_policy(FailurePolicy::Skip)
            .run(None)
            .await
            .unwrap();

        let fetched: Vec<&str> = outcome.records.iter().map(|r| r.kapt_code.as_str()).collect();
        assert_eq!(fetched, vec!["A1", "A2", "A4", "A5"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kapt_code, "A3");
        assert_eq!(outcome.failures[0].kind, "network");

        let written: Vec<DetailRecord> = table::read_table(&config.detail_table).unwrap();
        assert_eq!(written, outcome.records);
        let logged: Vec<DetailFailure> = table::read_table(&config.failure_log).unwrap();
        assert_eq!(logged, outcome.failures);
    }

    #[tokio::test]
    async fn abort_policy_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_list(&dir, &["A1", "A2", "A3", "A4", "A5"]);
        let portal = FakePortal::new().failing_detail_request(3);

        let mut collector =
            DetailCollector::new(&portal, &config).with_policy(FailurePolicy::Abort);
        let result = collector.run(None).await;

        assert!(matches!(result, Err(CollectError::TransientNetwork(_))));
        assert_eq!(collector.state(), &RunState::Failed);
        assert_eq!(portal.detail_requests(), vec!["A1", "A2", "A3"]);
        assert!(!config.detail_table.exists());
        assert!(!config.failure_log.exists());
    }

    #[tokio::test]
    async fn requests_each_listed_identifier_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_list(&dir, &["A1", "A2", "A1", "A3", "A2"]);
        let portal = FakePortal::new();

        let outcome = DetailCollector::new(&portal, &config)
            .run(None)
            .await
            .unwrap();

        assert_eq!(portal.detail_requests(), vec!["A1", "A2", "A3"]);
        assert_eq!(outcome.records.len(), 3);
        assert!(outcome.failures.is_empty());

        // header-only failure log marks a run without failures
        let logged: Vec<DetailFailure> = table::read_table(&config.failure_log).unwrap();
        assert!(logged.is_empty());
    }

    #[tokio::test]
    async fn limit_truncates_the_identifier_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_list(&dir, &["A1", "A2", "A3", "A4"]);
        let portal = FakePortal::new();

        let outcome = DetailCollector::new(&portal, &config)
            .run(Some(2))
            .await
            .unwrap();

        assert_eq!(portal.detail_requests(), vec!["A1", "A2"]);
        assert_eq!(outcome.records.len(), 2);
    }

    #[tokio::test]
    async fn never_emits_an_identifier_missing_from_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_list(&dir, &["A1", "A2", "A3"]);
        let portal = FakePortal::new().mismatching_detail("A2");

        let outcome = DetailCollector::new(&portal, &config)
            .run(None)
            .await
            .unwrap();

        let listed: HashSet<String> = table::read_column(&config.list_table, "kaptCode")
            .unwrap()
            .into_iter()
            .collect();
        assert!(outcome
            .records
            .iter()
            .all(|record| listed.contains(&record.kapt_code)));
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failures[0].kapt_code, "A2");
        assert_eq!(outcome.failures[0].kind, "api");
    }

    #[tokio::test]
    async fn missing_list_table_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config().with_output_dir(dir.path());
        let portal = FakePortal::new();

        let mut collector = DetailCollector::new(&portal, &config);
        let result = collector.run(None).await;

        assert!(matches!(result, Err(CollectError::Table { .. })));
        assert_eq!(collector.state(), &RunState::Failed);
        assert!(portal.detail_requests().is_empty());
    }

    #[tokio::test]
    async fn collect_reports_state_per_identifier() {
        let config = create_test_config();
        let portal = FakePortal::new();
        let mut collector = DetailCollector::new(&portal, &config);
        assert_eq!(collector.state(), &RunState::NotStarted);

        let outcome = collector
            .collect(&["A1".to_string(), "A2".to_string()])
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert!(collector.state().is_finished());
    }
}
