
use async_trait::async_trait;
use mockall::mock;
use std::time::Duration;
use test_utils::*;
use volunteer_match::{
    entities::relationship::{
        ApplicationUpdate, NewRelationship, Relationship, RelationshipChange, RelationshipStatus,
        RelationshipUpsert,
    },
    errors::AppError,
    repositories::relationship::RelationshipRepository,
    use_cases::relationship::RelationshipHandler,
};

mock! {
    pub RelationshipRepo {}

    #[async_trait]
    impl RelationshipRepository for RelationshipRepo {
        async fn upsert(&self, relationship: &RelationshipUpsert) -> Result<Relationship, AppError>;
        async fn update(&self, change: &RelationshipChange) -> Result<Relationship, AppError>;
        async fn list_by_project(&self, project_id: i64) -> Result<Vec<Relationship>, AppError>;
        async fn list_by_user_and_status(
            &self,
            user_id: i64,
            status: Option<RelationshipStatus>,
        ) -> Result<Vec<Relationship>, AppError>;
    }
}

fn request(user_id: i64, project_id: i64, status: &str) -> NewRelationship {
    NewRelationship {
        user_id,
        project_id,
        status: status.to_string(),
        comment: None,
        resume_flag: false,
    }
}

fn application(user_id: i64, project_id: i64, status: &str, comment: &str) -> NewRelationship {
    NewRelationship {
        comment: Some(comment.to_string()),
        resume_flag: true,
        ..request(user_id, project_id, status)
    }
}

fn status_update(user_id: i64, project_id: i64, status: &str) -> ApplicationUpdate {
    ApplicationUpdate {
        user_id,
        project_id,
        status: status.to_string(),
        comment: Some("reviewed".to_string()),
        resume_flag: true,
    }
}

/// Keeps `created_at` strictly increasing between writes.
async fn tick() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}

#[tokio::test]
async fn bookmarking_twice_keeps_a_single_record() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let first = handler.create(request(ALICE, WATER, "B")).await.unwrap();
    let second = handler.create(request(ALICE, WATER, "B")).await.unwrap();

    assert_eq!(store.relationship_count(), 1);
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, RelationshipStatus::Bookmarked);
}

#[tokio::test]
async fn bookmark_then_apply_overwrites_in_place() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let bookmark = handler.create(request(ALICE, WATER, "B")).await.unwrap();
    tick().await;
    let applied = handler
        .create(application(ALICE, WATER, "A", "I can help on weekends"))
        .await
        .unwrap();

    assert_eq!(store.relationship_count(), 1);
    assert_eq!(applied.id, bookmark.id);
    assert_eq!(applied.status, RelationshipStatus::Applied);
    assert_eq!(applied.comment.as_deref(), Some("I can help on weekends"));
    assert!(applied.resume_flag);
    assert!(applied.created_at > bookmark.created_at);
}

#[tokio::test]
async fn bookmark_ignores_comment_and_resume_flag() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let bookmark = handler
        .create(application(ALICE, WATER, "B", "ignored"))
        .await
        .unwrap();

    assert_eq!(bookmark.comment, None);
    assert!(!bookmark.resume_flag);
}

#[tokio::test]
async fn apply_then_accept_yields_one_accepted_record() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let applied = handler
        .create(application(BOB, EDUCATION, "A", "Former teacher"))
        .await
        .unwrap();
    tick().await;
    let accepted = handler
        .update(status_update(BOB, EDUCATION, "C"))
        .await
        .unwrap();

    assert_eq!(store.relationship_count(), 1);
    assert_eq!(accepted.id, applied.id);
    assert_eq!(accepted.status, RelationshipStatus::Accepted);
    assert_eq!(accepted.comment.as_deref(), Some("reviewed"));
    assert_eq!(accepted.created_at, applied.created_at);
    assert!(accepted.updated_at > applied.updated_at);
}

#[tokio::test]
async fn any_status_may_follow_any_other() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    handler.create(application(BOB, WATER, "A", "hi")).await.unwrap();

    for status in ["D", "C", "A", "B", "D"] {
        let updated = handler.update(status_update(BOB, WATER, status)).await.unwrap();
        assert_eq!(updated.status.code(), status);
    }
    assert_eq!(store.relationship_count(), 1);
}

#[tokio::test]
async fn invalid_status_is_rejected_and_nothing_is_written() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let err = handler.create(request(ALICE, WATER, "Z")).await.unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(store.relationship_count(), 0);
}

#[tokio::test]
async fn invalid_status_never_reaches_the_store() {
    let store = seeded_store();
    let mut repo = MockRelationshipRepo::new();
    repo.expect_upsert().never();
    repo.expect_update().never();

    let handler = RelationshipHandler::new(repo, store.clone(), store.clone());

    let create = handler.create(request(ALICE, WATER, "Z")).await.unwrap_err();
    let update = handler.update(status_update(ALICE, WATER, "")).await.unwrap_err();

    assert!(create.is_bad_request());
    assert!(update.is_bad_request());
}

#[tokio::test]
async fn unknown_user_or_project_is_not_found() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let unknown_user = handler.create(request(99, WATER, "B")).await.unwrap_err();
    let unknown_project = handler.create(request(ALICE, 99, "A")).await.unwrap_err();

    assert!(matches!(unknown_user, AppError::NotFound(_)));
    assert!(matches!(unknown_project, AppError::NotFound(_)));
    assert_eq!(store.relationship_count(), 0);
}

#[tokio::test]
async fn overlong_comment_is_a_validation_error() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let err = handler
        .create(application(ALICE, WATER, "A", &"x".repeat(2001)))
        .await
        .unwrap_err();

    match err {
        AppError::ValidationError(fields) => assert_eq!(fields[0].field, "comment"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn store_failures_propagate_unchanged() {
    let store = seeded_store();
    let mut repo = MockRelationshipRepo::new();
    repo.expect_upsert()
        .times(1)
        .returning(|_| Err(AppError::StoreError("connection reset".into())));

    let handler = RelationshipHandler::new(repo, store.clone(), store.clone());

    let err = handler.create(request(ALICE, WATER, "A")).await.unwrap_err();

    match err {
        AppError::StoreError(msg) => assert_eq!(msg, "connection reset"),
        other => panic!("expected store error, got {:?}", other),
    }
}

#[tokio::test]
async fn create_writes_exactly_once() {
    let store = seeded_store();
    let mut repo = MockRelationshipRepo::new();
    repo.expect_update().never();
    repo.expect_upsert()
        .withf(|r: &RelationshipUpsert| {
            r.user_id == ALICE
                && r.project_id == WATER
                && r.status == RelationshipStatus::Applied
                && r.created_at == r.updated_at
        })
        .times(1)
        .returning(|r| {
            Ok(Relationship {
                id: 7,
                user_id: r.user_id,
                project_id: r.project_id,
                status: r.status,
                comment: r.comment.clone(),
                resume_flag: r.resume_flag,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        });

    let handler = RelationshipHandler::new(repo, store.clone(), store.clone());

    let saved = handler
        .create(application(ALICE, WATER, "A", "ready"))
        .await
        .unwrap();

    assert_eq!(saved.id, 7);
}

#[tokio::test]
async fn updating_a_missing_relationship_is_not_found() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let err = handler.update(status_update(CAROL, WATER, "C")).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(store.relationship_count(), 0);
}

#[tokio::test]
async fn applicants_exclude_bookmarks_and_are_newest_first() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    handler.create(application(ALICE, WATER, "A", "first")).await.unwrap();
    tick().await;
    handler.create(request(BOB, WATER, "B")).await.unwrap();
    tick().await;
    handler.create(application(CAROL, WATER, "A", "third")).await.unwrap();
    handler.update(status_update(CAROL, WATER, "D")).await.unwrap();

    let applicants = handler.get_applicants(WATER).await.unwrap();

    let users: Vec<i64> = applicants.iter().map(|a| a.user_id).collect();
    assert_eq!(users, vec![CAROL, ALICE]);
    assert_eq!(applicants[0].status, RelationshipStatus::Declined);
    assert_eq!(applicants[1].comment.as_deref(), Some("first"));
}

#[tokio::test]
async fn applicants_of_unknown_project_is_not_found() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let err = handler.get_applicants(99).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn bookmark_listing_never_contains_applied_projects() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    handler.create(request(ALICE, WATER, "B")).await.unwrap();
    handler.create(application(ALICE, EDUCATION, "A", "hi")).await.unwrap();

    let bookmarks = handler.get_user_projects(ALICE, Some("B")).await.unwrap();
    let applied = handler.get_user_projects(ALICE, Some("A")).await.unwrap();

    assert_eq!(bookmarks.iter().map(|p| p.id).collect::<Vec<_>>(), vec![WATER]);
    assert_eq!(applied.iter().map(|p| p.id).collect::<Vec<_>>(), vec![EDUCATION]);
}

#[tokio::test]
async fn user_projects_are_most_recently_bound_first() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    handler.create(request(ALICE, WATER, "B")).await.unwrap();
    tick().await;
    handler.create(request(ALICE, EDUCATION, "B")).await.unwrap();
    tick().await;
    handler.create(request(ALICE, ARCHIVE, "B")).await.unwrap();
    tick().await;
    // Re-bookmarking refreshes the binding time
    handler.create(request(ALICE, WATER, "B")).await.unwrap();

    let projects = handler.get_user_projects(ALICE, None).await.unwrap();

    let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![WATER, ARCHIVE, EDUCATION]);
}

#[tokio::test]
async fn omitted_status_lists_every_linked_project() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    handler.create(request(BOB, WATER, "B")).await.unwrap();
    handler.create(application(BOB, EDUCATION, "A", "hi")).await.unwrap();

    let all = handler.get_user_projects(BOB, None).await.unwrap();
    let none_for_carol = handler.get_user_projects(CAROL, None).await.unwrap();

    assert_eq!(all.len(), 2);
    assert!(none_for_carol.is_empty());
}

#[tokio::test]
async fn user_projects_rejects_blank_or_unknown_status() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    let blank = handler.get_user_projects(ALICE, Some("")).await.unwrap_err();
    let unknown = handler.get_user_projects(ALICE, Some("Q")).await.unwrap_err();
    let missing_user = handler.get_user_projects(99, Some("B")).await.unwrap_err();

    assert!(matches!(blank, AppError::BadRequest(_)));
    assert!(matches!(unknown, AppError::BadRequest(_)));
    assert!(matches!(missing_user, AppError::NotFound(_)));
}

#[tokio::test]
async fn moving_back_to_bookmark_clears_application_details() {
    let store = seeded_store();
    let handler = relationship_handler(&store);

    handler.create(application(ALICE, WATER, "A", "Evenings only")).await.unwrap();
    let bookmarked = handler.update(status_update(ALICE, WATER, "B")).await.unwrap();

    assert_eq!(bookmarked.status, RelationshipStatus::Bookmarked);
    assert_eq!(bookmarked.comment, None);
    assert!(!bookmarked.resume_flag);
}

#[tokio::test]
async fn update_of_a_vanished_record_never_recreates_it() {
    let store = seeded_store();
    let mut repo = MockRelationshipRepo::new();
    repo.expect_upsert().never();
    repo.expect_update()
        .withf(|c: &RelationshipChange| {
            c.user_id == BOB && c.project_id == WATER && c.status == RelationshipStatus::Accepted
        })
        .times(1)
        .returning(|c| {
            Err(AppError::NotFound(format!(
                "No relationship of user {} for project {}",
                c.user_id, c.project_id
            )))
        });

    let handler = RelationshipHandler::new(repo, store.clone(), store.clone());

    let err = handler.update(status_update(BOB, WATER, "C")).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}
