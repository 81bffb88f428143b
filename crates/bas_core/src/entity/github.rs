//! GitHub issues and pull requests, linked to people by external person id.

use super::people::Person;
use super::Entity;
use crate::store::relations::Relation;

pub struct GithubIssue;

impl Entity for GithubIssue {
    const NAME: &'static str = "GithubIssue";
    const TABLE: &'static str = "github_issues";
    const ATTRIBUTES: &'static [&'static str] = &[
        "issue_id",
        "title",
        "status",
        "url",
        "repository_url",
        "labels",
        "person_id",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::to::<Person>("external_person_id", "person_id")];
}

pub struct GithubPullRequest;

impl Entity for GithubPullRequest {
    const NAME: &'static str = "GithubPullRequest";
    const TABLE: &'static str = "github_pull_requests";
    const ATTRIBUTES: &'static [&'static str] = &[
        "external_github_pull_request_id",
        "title",
        "status",
        "url",
        "repository_url",
        "merged_at",
        "related_issue_ids",
        "person_id",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::to::<Person>("external_person_id", "person_id")];
}
