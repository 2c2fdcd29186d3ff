//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use gh_sync::adapters::mock::{MockSourceTracker, MockTargetTracker};
use gh_sync::domain::models::{
    IssueState, LookupFailurePolicy, RepositoryRef, SourceComment, SourceIssue, TrackedIssue,
    UserRef,
};
use gh_sync::services::{EngineSettings, ReconciliationEngine};

pub const AREA_PATH: &str = r"Widgets\Triage";
pub const TRACKING_LABEL: &str = "tracking";

pub fn user(login: &str) -> UserRef {
    UserRef {
        login: login.to_string(),
        html_url: format!("https://github.com/{login}"),
    }
}

pub fn tracked_issue(
    repo: &str,
    number: u64,
    title: &str,
    state: IssueState,
    labels: &[&str],
) -> TrackedIssue {
    let repository: RepositoryRef = repo.parse().expect("fixture repository slug");
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    TrackedIssue::new(
        repository,
        SourceIssue {
            number,
            title: title.to_string(),
            body: "It **crashes** when the widget loads.".to_string(),
            state,
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            author: user("octocat"),
            html_url: format!("https://github.com/{repo}/issues/{number}"),
            created_at: created,
            updated_at: created,
        },
    )
}

pub fn source_comment(issue: &TrackedIssue, id: u64, body: &str) -> SourceComment {
    SourceComment {
        id,
        body: body.to_string(),
        author: user("hubot"),
        html_url: format!("{}#issuecomment-{id}", issue.html_url()),
        created_at: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
    }
}

pub fn settings(policy: LookupFailurePolicy) -> EngineSettings {
    EngineSettings {
        area_path: AREA_PATH.to_string(),
        tracking_label: TRACKING_LABEL.to_string(),
        lookup_failure_policy: policy,
    }
}

pub fn engine(
    source: &MockSourceTracker,
    target: &MockTargetTracker,
    policy: LookupFailurePolicy,
) -> ReconciliationEngine {
    ReconciliationEngine::new(
        Arc::new(source.clone()),
        Arc::new(target.clone()),
        settings(policy),
    )
}
