//! Integration tests for GitHub write operations
//!
//! Each write resolves its references with one batched GraphQL query and
//! then issues REST calls; these tests pin both halves against mock servers.

mod common;

use common::fixtures::{
    comment_node, label_node, milestone_node, node_id, not_found_error, resolved_node,
    resolved_node_in, rest_comment, rest_issue,
};
use common::{graphql, graphql_matching, manager, rest};
use mockito::{Matcher, Server};
use serde_json::json;
use tasklink::{NewTicket, TaskManager, TaskManagerError, TicketStatus};

fn resolved_by_number(number: u64) -> serde_json::Value {
    json!({ "data": { "repository": { "t0": resolved_node(number) } } })
}

#[tokio::test]
async fn test_closing_twice_is_idempotent() {
    let mut server = Server::new_async().await;
    let resolve = graphql(&mut server, "ResolveTickets", &resolved_by_number(42))
        .expect(2)
        .create_async()
        .await;
    let patch = rest(&mut server, "PATCH", "issues/42")
        .match_body(Matcher::Json(json!({ "state": "closed" })))
        .with_status(200)
        .with_body(rest_issue(42, "closed").to_string())
        .expect(2)
        .create_async()
        .await;

    let manager = manager(&server);
    let first = manager.update_status("42", TicketStatus::Closed).await.unwrap();
    let second = manager.update_status("42", TicketStatus::Closed).await.unwrap();

    resolve.assert_async().await;
    patch.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(second.status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_write_to_missing_ticket_sends_no_mutation() {
    let mut server = Server::new_async().await;
    let response = json!({
        "data": { "repository": { "t0": null } },
        "errors": [not_found_error(&["repository", "t0"], "Could not resolve to an Issue")]
    });
    let _resolve = graphql(&mut server, "ResolveTickets", &response)
        .create_async()
        .await;
    let patch = rest(&mut server, "PATCH", "issues/404")
        .expect(0)
        .create_async()
        .await;

    let err = manager(&server)
        .update_status("404", TicketStatus::Open)
        .await
        .unwrap_err();

    patch.assert_async().await;
    assert!(matches!(
        err,
        TaskManagerError::TicketNotFound { ref reference } if reference == "#404"
    ));
}

#[tokio::test]
async fn test_comment_added_by_opaque_id_is_listed_by_number() {
    let mut server = Server::new_async().await;
    let _resolve = graphql_matching(
        &mut server,
        "ResolveTickets",
        &json!({ "data": { "t0": resolved_node(42) } }),
        Matcher::PartialJson(json!({ "variables": { "id0": node_id(42) } })),
    )
    .create_async()
    .await;
    let post = rest(&mut server, "POST", "issues/42/comments")
        .match_body(Matcher::Json(json!({ "body": "Shipped in v1.2" })))
        .with_status(201)
        .with_body(rest_comment(501, "Shipped in v1.2").to_string())
        .expect(1)
        .create_async()
        .await;
    let _list = graphql(
        &mut server,
        "CommentsByNumber",
        &json!({
            "data": { "repository": { "issue": {
                "id": node_id(42),
                "repository": { "nameWithOwner": "octo/widgets" },
                "comments": { "nodes": [comment_node(500, "earlier"), comment_node(501, "Shipped in v1.2")] }
            } } }
        }),
    )
    .create_async()
    .await;

    let manager = manager(&server);
    let added = manager
        .add_comment(&node_id(42), "Shipped in v1.2")
        .await
        .unwrap();
    let comments = manager.list_comments("42").await.unwrap();

    post.assert_async().await;
    assert_eq!(added.ticket_id, node_id(42));
    assert_eq!(added.author, "mona");
    assert_eq!(comments.iter().filter(|c| c.id == added.id).count(), 1);
}

#[tokio::test]
async fn test_empty_comment_is_rejected_locally() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = manager(&server).add_comment("42", "  \n").await.unwrap_err();

    any.assert_async().await;
    assert!(matches!(err, TaskManagerError::InvalidReference { .. }));
}

#[tokio::test]
async fn test_add_label_requires_existing_label() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(
        &mut server,
        "ResolveTickets",
        &json!({ "data": { "repository": {
            "t0": resolved_node(7),
            "labels": { "nodes": [label_node("bug"), label_node("docs")] }
        } } }),
    )
    .expect(2)
    .create_async()
    .await;
    let post = rest(&mut server, "POST", "issues/7/labels")
        .match_body(Matcher::Json(json!({ "labels": ["docs"] })))
        .with_status(200)
        .with_body(json!([{ "name": "docs" }]).to_string())
        .expect(1)
        .create_async()
        .await;

    let manager = manager(&server);
    let err = manager.add_label("7", "no-such-label").await.unwrap_err();
    manager.add_label("7", "docs").await.unwrap();

    post.assert_async().await;
    assert!(matches!(err, TaskManagerError::LabelNotFound(ref name) if name == "no-such-label"));
}

#[tokio::test]
async fn test_remove_unattached_label_is_label_not_found() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(&mut server, "ResolveTickets", &resolved_by_number(7))
        .create_async()
        .await;
    let _delete = rest(&mut server, "DELETE", "issues/7/labels/wontfix")
        .with_status(404)
        .with_body(r#"{"message":"Label does not exist"}"#)
        .create_async()
        .await;

    let err = manager(&server).remove_label("7", "wontfix").await.unwrap_err();

    assert!(matches!(err, TaskManagerError::LabelNotFound(ref name) if name == "wontfix"));
}

#[tokio::test]
async fn test_add_to_milestone_uses_milestone_number() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(
        &mut server,
        "ResolveTickets",
        &json!({ "data": { "repository": {
            "t0": resolved_node(8),
            "milestones": { "nodes": [milestone_node(1, "v1.0"), milestone_node(2, "v2.0")] }
        } } }),
    )
    .expect(2)
    .create_async()
    .await;
    let mut updated = rest_issue(8, "open");
    updated["milestone"] = json!({ "title": "v2.0" });
    let patch = rest(&mut server, "PATCH", "issues/8")
        .match_body(Matcher::Json(json!({ "milestone": 2 })))
        .with_status(200)
        .with_body(updated.to_string())
        .expect(1)
        .create_async()
        .await;

    let manager = manager(&server);
    let missing = manager.add_to_milestone("8", "v9.9").await.unwrap_err();
    let ticket = manager.add_to_milestone("8", "v2.0").await.unwrap();

    patch.assert_async().await;
    assert!(matches!(missing, TaskManagerError::MilestoneNotFound(ref t) if t == "v9.9"));
    assert_eq!(ticket.milestone.as_deref(), Some("v2.0"));
}

#[tokio::test]
async fn test_create_ticket() {
    let mut server = Server::new_async().await;
    let post = rest(&mut server, "POST", "issues")
        .match_body(Matcher::Json(json!({
            "title": "Issue 50",
            "body": "Steps to reproduce",
            "labels": ["bug"]
        })))
        .with_status(201)
        .with_body(rest_issue(50, "open").to_string())
        .create_async()
        .await;

    let ticket = manager(&server)
        .create_ticket(
            &NewTicket::new("Issue 50")
                .with_body("Steps to reproduce")
                .with_label("bug"),
        )
        .await
        .unwrap();

    post.assert_async().await;
    assert_eq!(ticket.number, 50);
    assert_eq!(ticket.id, node_id(50));
    assert_eq!(ticket.status, TicketStatus::Open);
}

#[tokio::test]
async fn test_create_rejected_is_remote_write_error_with_body() {
    let mut server = Server::new_async().await;
    let _post = rest(&mut server, "POST", "issues")
        .with_status(410)
        .with_body(r#"{"message":"Issues are disabled for this repo"}"#)
        .create_async()
        .await;

    let err = manager(&server)
        .create_ticket(&NewTicket::new("Anything"))
        .await
        .unwrap_err();

    match &err {
        TaskManagerError::RemoteWriteError { status, body } => {
            assert_eq!(*status, 410);
            assert!(body.contains("Issues are disabled"));
        }
        other => panic!("expected RemoteWriteError, got {other:?}"),
    }
    assert!(!err.is_retryable(false));
}

#[tokio::test]
async fn test_create_subtask_reports_partial_application() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(&mut server, "ResolveTickets", &resolved_by_number(12))
        .create_async()
        .await;
    let create = rest(&mut server, "POST", "issues")
        .match_body(Matcher::Json(json!({
            "title": "Write docs",
            "body": "Part of #12\n\nCover the new flags"
        })))
        .with_status(201)
        .with_body(rest_issue(43, "open").to_string())
        .expect(1)
        .create_async()
        .await;
    let link = rest(&mut server, "POST", "issues/12/sub_issues")
        .match_body(Matcher::Json(json!({ "sub_issue_id": 1043 })))
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create_async()
        .await;

    let err = manager(&server)
        .create_subtask("12", &NewTicket::new("Write docs").with_body("Cover the new flags"))
        .await
        .unwrap_err();

    create.assert_async().await;
    link.assert_async().await;
    match err {
        TaskManagerError::PartiallyApplied { applied, source } => {
            assert!(applied.contains("#43"));
            assert!(matches!(*source, TaskManagerError::RemoteWriteError { status: 422, .. }));
        }
        other => panic!("expected PartiallyApplied, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_subtask_with_missing_parent_creates_nothing() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(
        &mut server,
        "ResolveTickets",
        &json!({
            "data": { "repository": { "t0": null } },
            "errors": [not_found_error(&["repository", "t0"], "Could not resolve to an Issue")]
        }),
    )
    .create_async()
    .await;
    let create = rest(&mut server, "POST", "issues")
        .expect(0)
        .create_async()
        .await;

    let err = manager(&server)
        .create_subtask("999", &NewTicket::new("Orphan"))
        .await
        .unwrap_err();

    create.assert_async().await;
    assert!(matches!(err, TaskManagerError::TicketNotFound { .. }));
}

#[tokio::test]
async fn test_blocked_by_and_blocking_hit_the_same_endpoint() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(
        &mut server,
        "ResolveTickets",
        &json!({ "data": {
            "repository": { "t0": resolved_node(3) },
            "t1": resolved_node(4)
        } }),
    )
    .create_async()
    .await;
    let link = rest(&mut server, "POST", "issues/3/dependencies/blocked_by")
        .match_body(Matcher::Json(json!({ "issue_id": 1004 })))
        .with_status(201)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    manager(&server)
        .add_blocked_by("3", &node_id(4))
        .await
        .unwrap();

    link.assert_async().await;
}

#[tokio::test]
async fn test_linking_a_ticket_to_itself_is_rejected() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(
        &mut server,
        "ResolveTickets",
        &json!({ "data": { "repository": { "t0": resolved_node(5) }, "t1": resolved_node(5) } }),
    )
    .create_async()
    .await;
    let link = rest(&mut server, "POST", "issues/5/sub_issues")
        .expect(0)
        .create_async()
        .await;

    let err = manager(&server)
        .add_subtask("5", &node_id(5))
        .await
        .unwrap_err();

    link.assert_async().await;
    assert!(matches!(err, TaskManagerError::InvalidReference { .. }));
}

#[tokio::test]
async fn test_opaque_id_outside_repository_is_not_linked() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(
        &mut server,
        "ResolveTickets",
        &json!({ "data": { "t0": resolved_node_in(6, "someone/else") } }),
    )
    .create_async()
    .await;
    let comment = rest(&mut server, "POST", "issues/6/comments")
        .expect(0)
        .create_async()
        .await;

    let err = manager(&server)
        .add_branch(&node_id(6), "feature/login")
        .await
        .unwrap_err();

    comment.assert_async().await;
    assert!(matches!(err, TaskManagerError::TicketNotFound { .. }));
}

#[tokio::test]
async fn test_branch_link_is_recorded_as_comment() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(&mut server, "ResolveTickets", &resolved_by_number(6))
        .create_async()
        .await;
    let comment = rest(&mut server, "POST", "issues/6/comments")
        .match_body(Matcher::Json(json!({ "body": "Linked branch: `feature/login`" })))
        .with_status(201)
        .with_body(rest_comment(77, "Linked branch: `feature/login`").to_string())
        .create_async()
        .await;

    manager(&server)
        .add_branch("6", "feature/login")
        .await
        .unwrap();

    comment.assert_async().await;
}

#[tokio::test]
async fn test_assign_to_self_uses_viewer_login() {
    let mut server = Server::new_async().await;
    let _resolve = graphql_matching(
        &mut server,
        "ResolveTickets",
        &json!({ "data": {
            "repository": { "t0": resolved_node(9) },
            "viewer": { "login": "mona" }
        } }),
        Matcher::Regex("viewer".to_string()),
    )
    .create_async()
    .await;
    let mut assigned = rest_issue(9, "open");
    assigned["assignees"] = json!([{ "login": "mona" }]);
    let patch = rest(&mut server, "PATCH", "issues/9")
        .match_body(Matcher::Json(json!({ "assignees": ["mona"] })))
        .with_status(200)
        .with_body(assigned.to_string())
        .create_async()
        .await;

    let ticket = manager(&server).assign_to_self("9").await.unwrap();

    patch.assert_async().await;
    assert_eq!(ticket.assignee.as_deref(), Some("mona"));
}

#[tokio::test]
async fn test_assign_reports_new_assignee_over_existing_one() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(&mut server, "ResolveTickets", &resolved_by_number(9))
        .create_async()
        .await;
    let mut assigned = rest_issue(9, "open");
    assigned["assignees"] = json!([{ "login": "mona" }, { "login": "Hubot" }]);
    let patch = rest(&mut server, "PATCH", "issues/9")
        .match_body(Matcher::Json(json!({ "assignees": ["hubot"] })))
        .with_status(200)
        .with_body(assigned.to_string())
        .expect(1)
        .create_async()
        .await;

    let ticket = manager(&server).assign("9", "hubot").await.unwrap();

    patch.assert_async().await;
    assert_eq!(ticket.assignee.as_deref(), Some("Hubot"));
}

#[tokio::test]
async fn test_assignee_dropped_by_remote_is_invalid_reference() {
    let mut server = Server::new_async().await;
    let _resolve = graphql(&mut server, "ResolveTickets", &resolved_by_number(9))
        .create_async()
        .await;
    let _patch = rest(&mut server, "PATCH", "issues/9")
        .with_status(200)
        .with_body(rest_issue(9, "open").to_string())
        .create_async()
        .await;

    let err = manager(&server).assign("9", "outsider").await.unwrap_err();

    assert!(matches!(
        err,
        TaskManagerError::InvalidReference { ref reference, .. } if reference == "outsider"
    ));
}
