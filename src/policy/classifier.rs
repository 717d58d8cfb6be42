use crate::models::decision::{ActionDecision, Thresholds};
use crate::models::user::UserRecord;
use crate::policy::ignore_list::IgnoreList;
use tracing::info;

/// Decide what to do with a user
///
/// Checks run in a fixed order: ignore list, deletion threshold, warning
/// threshold. Both thresholds are inclusive, so a user sitting exactly on a
/// boundary breaches it.
pub fn classify(user: &UserRecord, thresholds: &Thresholds, ignore_list: &IgnoreList) -> ActionDecision {
    if ignore_list.contains(&user.username) {
        return ActionDecision::Ignored;
    }

    classify_days(user.inactivity_days, thresholds)
}

fn classify_days(days: u32, thresholds: &Thresholds) -> ActionDecision {
    if days >= thresholds.deletion {
        ActionDecision::Delete
    } else if days >= thresholds.warning {
        ActionDecision::Warn
    } else {
        ActionDecision::NoAction
    }
}

/// Same as [`classify`], with a log line describing the outcome
pub fn classify_and_log(user: &UserRecord, thresholds: &Thresholds, ignore_list: &IgnoreList) -> ActionDecision {
    let decision = classify(user, thresholds, ignore_list);

    match decision {
        ActionDecision::Ignored => info!(
            username = %user.username,
            account_id = %user.account_id,
            "User is in the ignore list, no action required"
        ),
        ActionDecision::Delete => info!(
            username = %user.username,
            inactivity_days = user.inactivity_days,
            deletion_threshold = thresholds.deletion,
            "User has breached the deletion threshold"
        ),
        ActionDecision::Warn => info!(
            username = %user.username,
            inactivity_days = user.inactivity_days,
            warning_threshold = thresholds.warning,
            "User has breached the warning threshold"
        ),
        ActionDecision::NoAction => info!(
            username = %user.username,
            inactivity_days = user.inactivity_days,
            "User is within the activity window, no action needed"
        ),
    }

    decision
}
