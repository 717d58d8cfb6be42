use crate::core::error::RowError;
use crate::input::csv_rows::ParsedRow;
use crate::models::decision::{ActionDecision, Thresholds};
use crate::models::user::UserRecord;
use crate::pipeline::executor::{ActionExecutor, DeletionNotice, Effect};
use crate::policy::classifier::classify_and_log;
use crate::policy::ignore_list::IgnoreList;
use tracing::{error, info, warn};

/// What happened to one data row
#[derive(Debug)]
pub struct RowOutcome {
    pub line: u64,
    /// `None` when the row could not be parsed
    pub record: Option<UserRecord>,
    /// `None` when the row could not be parsed
    pub decision: Option<ActionDecision>,
    pub result: Result<Effect, RowError>,
}

/// Per-run tallies, for the closing log line
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub ignored: usize,
    pub no_action: usize,
    pub warned: usize,
    pub deleted: usize,
    /// Deleted users whose deletion email failed, also counted in `deleted`
    pub deletion_notice_failed: usize,
    pub not_found: usize,
    pub dry_run: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match &outcome.result {
            Err(_) => self.failed += 1,
            Ok(Effect::DryRun) => self.dry_run += 1,
            Ok(Effect::WarningSent) => self.warned += 1,
            Ok(Effect::Deleted { notice }) => {
                self.deleted += 1;
                if *notice == DeletionNotice::Failed {
                    self.deletion_notice_failed += 1;
                }
            }
            Ok(Effect::NotFound) => self.not_found += 1,
            Ok(Effect::None) => match outcome.decision {
                Some(ActionDecision::Ignored) => self.ignored += 1,
                _ => self.no_action += 1,
            },
        }
    }
}

/// Drives rows through classification and execution, one at a time
///
/// Without an executor the pipeline runs dry: decisions are logged and no
/// external API is called.
pub struct RowPipeline {
    thresholds: Thresholds,
    ignore_list: IgnoreList,
    executor: Option<ActionExecutor>,
}

impl RowPipeline {
    pub fn new(thresholds: Thresholds, ignore_list: IgnoreList, executor: ActionExecutor) -> Self {
        Self {
            thresholds,
            ignore_list,
            executor: Some(executor),
        }
    }

    pub fn dry_run(thresholds: Thresholds, ignore_list: IgnoreList) -> Self {
        Self {
            thresholds,
            ignore_list,
            executor: None,
        }
    }

    /// Process a single row. Failures are captured in the outcome.
    pub async fn process_row(&self, row: ParsedRow) -> RowOutcome {
        let record = match row.record {
            Ok(record) => record,
            Err(e) => {
                warn!(line = row.line, error = %e, "Skipping malformed row");
                return RowOutcome {
                    line: row.line,
                    record: None,
                    decision: None,
                    result: Err(e.into()),
                };
            }
        };

        let decision = classify_and_log(&record, &self.thresholds, &self.ignore_list);

        let result = match &self.executor {
            None if matches!(decision, ActionDecision::Warn | ActionDecision::Delete) => {
                info!(
                    line = row.line,
                    username = %record.username,
                    decision = %decision,
                    "Dry run, no action taken"
                );
                Ok(Effect::DryRun)
            }
            None => Ok(Effect::None),
            Some(executor) => executor.execute(&record, decision).await.map_err(|e| {
                error!(
                    line = row.line,
                    username = %record.username,
                    account_id = %record.account_id,
                    decision = %decision,
                    error = %e,
                    "Action failed, moving on to next row"
                );
                RowError::from(e)
            }),
        };

        RowOutcome {
            line: row.line,
            record: Some(record),
            decision: Some(decision),
            result,
        }
    }

    /// Consume the rows in order, handing each outcome to `on_outcome`
    ///
    /// Each row finishes before the next one is pulled from the source, and
    /// outcomes are not kept once the sink has seen them. Row failures never
    /// abort the run.
    pub async fn run<I, F>(&self, rows: I, mut on_outcome: F) -> RunSummary
    where
        I: IntoIterator<Item = ParsedRow>,
        F: FnMut(RowOutcome),
    {
        if self.thresholds.warning >= self.thresholds.deletion {
            warn!(
                warning_threshold = self.thresholds.warning,
                deletion_threshold = self.thresholds.deletion,
                "Warning threshold is not below deletion threshold, no user will be warned"
            );
        }

        let mut summary = RunSummary::default();

        for row in rows {
            let outcome = self.process_row(row).await;
            summary.record(&outcome);
            on_outcome(outcome);
        }

        info!(
            rows = summary.rows,
            ignored = summary.ignored,
            no_action = summary.no_action,
            warned = summary.warned,
            deleted = summary.deleted,
            deletion_notice_failed = summary.deletion_notice_failed,
            not_found = summary.not_found,
            dry_run = summary.dry_run,
            failed = summary.failed,
            "Inactive user run completed"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CollaboratorError, ParseError};
    use crate::input::csv_rows::CsvRows;
    use crate::pipeline::executor::fakes::*;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn pipeline(
        ignore: &str,
        accounts: &Arc<FakeAccounts>,
        notifier: &Arc<FakeNotifier>,
    ) -> RowPipeline {
        let thresholds = Thresholds::new(80, 90);
        let executor = ActionExecutor::new(accounts.clone(), notifier.clone(), templates(), thresholds.deletion);
        RowPipeline::new(thresholds, IgnoreList::parse(ignore), executor)
    }

    fn csv(input: &str) -> CsvRows<&[u8]> {
        CsvRows::from_reader(input.as_bytes(), true)
    }

    async fn collect(pipeline: &RowPipeline, input: &str) -> (Vec<RowOutcome>, RunSummary) {
        let mut outcomes = Vec::new();
        let summary = pipeline.run(csv(input), |o| outcomes.push(o)).await;
        (outcomes, summary)
    }

    #[tokio::test]
    async fn test_warn_scenario() {
        let accounts = Arc::new(FakeAccounts::default());
        let notifier = Arc::new(FakeNotifier::default());

        let (outcomes, _) = collect(
            &pipeline("", &accounts, &notifier),
            "account_id,username,inactivity\nacct-1,alice,85 days\n",
        )
        .await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].decision, Some(ActionDecision::Warn));
        assert!(matches!(outcomes[0].result, Ok(Effect::WarningSent)));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].2.inactive_number_of_days, 85);
    }

    #[tokio::test]
    async fn test_delete_scenario_without_email() {
        let accounts = Arc::new(FakeAccounts::default());
        let notifier = Arc::new(FakeNotifier::default());

        let (outcomes, _) = collect(
            &pipeline("", &accounts, &notifier),
            "account_id,username,inactivity\nacct-1,bob,95 days\n",
        )
        .await;

        assert_eq!(outcomes[0].decision, Some(ActionDecision::Delete));
        assert!(matches!(
            outcomes[0].result,
            Ok(Effect::Deleted {
                notice: DeletionNotice::NoEmailAddress
            })
        ));
        assert_eq!(accounts.calls.lock().unwrap().len(), 1);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_scenario() {
        let accounts = Arc::new(FakeAccounts::default());
        let notifier = Arc::new(FakeNotifier::default());

        let (outcomes, summary) = collect(
            &pipeline("carol", &accounts, &notifier),
            "account_id,username,inactivity\nacct-2,carol,999 days\n",
        )
        .await;

        assert_eq!(outcomes[0].decision, Some(ActionDecision::Ignored));
        assert!(matches!(outcomes[0].result, Ok(Effect::None)));
        assert_eq!(summary.ignored, 1);
        assert!(accounts.calls.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_row_failures_do_not_stop_the_run() {
        let accounts = Arc::new(FakeAccounts {
            failing: HashSet::from(["bob@example.com".to_string()]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier {
            failing: HashSet::from(["dave@example.com".to_string()]),
            ..Default::default()
        });

        let input = "account_id,username,inactivity\n\
                     acct-1,bob@example.com,120 days\n\
                     acct-1,eve,unknown\n\
                     acct-1,dave@example.com,85 days\n\
                     acct-1,alice@example.com,85 days\n";

        let (outcomes, summary) = collect(&pipeline("", &accounts, &notifier), input).await;

        assert_eq!(outcomes.len(), 4);
        assert!(matches!(
            outcomes[0].result,
            Err(RowError::Collaborator(CollaboratorError::Iam(_)))
        ));
        assert!(matches!(outcomes[1].result, Err(RowError::Parse(ParseError::NoDigits(_)))));
        assert!(outcomes[1].record.is_none());
        assert!(matches!(
            outcomes[2].result,
            Err(RowError::Collaborator(CollaboratorError::Notify(_)))
        ));
        assert!(matches!(outcomes[3].result, Ok(Effect::WarningSent)));

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.warned, 1);
    }

    #[tokio::test]
    async fn test_rows_processed_in_file_order() {
        let accounts = Arc::new(FakeAccounts::default());
        let notifier = Arc::new(FakeNotifier::default());

        let input = "account_id,username,inactivity\n\
                     acct-1,zed@example.com,100\n\
                     acct-2,amy@example.com,150\n\
                     acct-3,zed@example.com,91\n";

        let (outcomes, _) = collect(&pipeline("", &accounts, &notifier), input).await;

        let lines: Vec<u64> = outcomes.iter().map(|o| o.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);

        let calls = accounts.calls.lock().unwrap();
        let accounts_hit: Vec<&str> = calls.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(accounts_hit, vec!["acct-1", "acct-2", "acct-3"]);
    }

    #[tokio::test]
    async fn test_dry_run_calls_nothing() {
        let input = "account_id,username,inactivity\n\
                     acct-1,alice,85 days\n\
                     acct-1,bob,95 days\n\
                     acct-1,carol,10 days\n";

        let pipeline = RowPipeline::dry_run(Thresholds::new(80, 90), IgnoreList::parse(""));
        let (outcomes, summary) = collect(&pipeline, input).await;

        assert_eq!(outcomes[0].decision, Some(ActionDecision::Warn));
        assert_eq!(outcomes[1].decision, Some(ActionDecision::Delete));
        assert!(matches!(outcomes[0].result, Ok(Effect::DryRun)));
        assert!(matches!(outcomes[1].result, Ok(Effect::DryRun)));
        assert!(matches!(outcomes[2].result, Ok(Effect::None)));
        assert_eq!(summary.dry_run, 2);
        assert_eq!(summary.no_action, 1);
    }

    #[tokio::test]
    async fn test_identical_input_gives_identical_decisions() {
        let input = "account_id,username,inactivity\n\
                     acct-1,alice,85 days\n\
                     acct-1,bob,95 days\n\
                     acct-2,carol,999 days\n\
                     acct-2,dan,3 days\n";

        let pipeline = RowPipeline::dry_run(Thresholds::new(80, 90), IgnoreList::parse("carol"));
        let (first, _) = collect(&pipeline, input).await;
        let (second, _) = collect(&pipeline, input).await;

        let decisions = |o: &[RowOutcome]| o.iter().map(|r| r.decision).collect::<Vec<_>>();
        assert_eq!(decisions(&first[..]), decisions(&second[..]));
        assert_eq!(
            decisions(&first[..]),
            vec![
                Some(ActionDecision::Warn),
                Some(ActionDecision::Delete),
                Some(ActionDecision::Ignored),
                Some(ActionDecision::NoAction),
            ]
        );
    }

    #[tokio::test]
    async fn test_deleted_user_with_failed_email_is_tallied_as_deleted() {
        let accounts = Arc::new(FakeAccounts::default());
        let notifier = Arc::new(FakeNotifier {
            failing: HashSet::from(["bob@example.com".to_string()]),
            ..Default::default()
        });

        let (outcomes, summary) = collect(
            &pipeline("", &accounts, &notifier),
            "account_id,username,inactivity\nacct-1,bob@example.com,120 days\n",
        )
        .await;

        assert!(matches!(
            outcomes[0].result,
            Ok(Effect::Deleted {
                notice: DeletionNotice::Failed
            })
        ));
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.deletion_notice_failed, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_outcomes_are_streamed_one_row_at_a_time() {
        let input = "account_id,username,inactivity\n\
                     acct-1,alice,85 days\n\
                     acct-1,bob,95 days\n\
                     acct-1,carol,10 days\n";

        let pulled = Cell::new(0usize);
        let mut pulled_when_seen = Vec::new();
        let rows = csv(input).inspect(|_| pulled.set(pulled.get() + 1));

        let pipeline = RowPipeline::dry_run(Thresholds::new(80, 90), IgnoreList::parse(""));
        let summary = pipeline
            .run(rows, |outcome| pulled_when_seen.push((outcome.line, pulled.get())))
            .await;

        // Each outcome reaches the sink before the next row is read
        assert_eq!(pulled_when_seen, vec![(2, 1), (3, 2), (4, 3)]);
        assert_eq!(summary.rows, 3);
    }
}
