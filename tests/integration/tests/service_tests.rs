//! Service-level tests over the in-memory store
//!
//! Run with: cargo test -p integration-tests --test service_tests

use chrono::{Duration, Utc};
use integration_tests::{TestContext, TEST_PASSWORD};
use microblog_common::mail::MailKind;
use microblog_common::{authenticated, generate_token};
use microblog_core::{DomainError, MicropostId, PageQuery, TokenKind, UserId, UserRepository};
use microblog_service::dto::{
    CreateMicropostRequest, FollowRequest, LoginRequest, MicropostResponse, PaginatedResponse,
    PasswordResetRequest, ResetPasswordRequest, SignupRequest, UpdateUserRequest,
};
use microblog_service::{
    AccountService, FeedService, MicropostService, PasswordResetService, RelationshipService,
    ServiceError, SessionService, UserService,
};

fn domain(err: &ServiceError) -> Option<&DomainError> {
    err.domain()
}

fn login(email: &str, remember_me: bool) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        remember_me,
    }
}

fn post(content: &str) -> CreateMicropostRequest {
    CreateMicropostRequest {
        content: content.to_string(),
    }
}

fn post_ids(page: &PaginatedResponse<MicropostResponse>) -> Vec<MicropostId> {
    page.items.iter().map(|p| p.id).collect()
}

fn reset_form(email: &str, password: &str) -> ResetPasswordRequest {
    ResetPasswordRequest {
        email: email.to_string(),
        password: password.to_string(),
        password_confirmation: password.to_string(),
    }
}

// ============================================================================
// Token digests
// ============================================================================

#[tokio::test]
async fn test_remember_token_authenticates_until_forgotten() {
    let t = TestContext::new();
    let user = t.activated_user("remember").await;
    let sessions = SessionService::new(&t.ctx);

    let token = sessions.remember(user.id).await.unwrap();
    let stored = t.user(user.id).await;
    assert!(authenticated(&stored, TokenKind::Remember, &token));
    assert!(!authenticated(&stored, TokenKind::Remember, &generate_token()));
    assert!(!authenticated(&stored, TokenKind::Remember, ""));

    sessions.restore(user.id, &token).await.unwrap();

    sessions.forget(user.id).await.unwrap();
    let stored = t.user(user.id).await;
    assert!(stored.remember_digest.is_none());
    assert!(!authenticated(&stored, TokenKind::Remember, &token));

    let err = sessions.restore(user.id, &token).await.unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_activation_token_authenticates_after_signup() {
    let t = TestContext::new();
    let (user, token) = t.signup("activation").await;

    assert!(!user.activated);
    assert!(authenticated(&user, TokenKind::Activation, &token));
    assert!(!authenticated(&user, TokenKind::Activation, &generate_token()));
    assert!(!authenticated(&user, TokenKind::Remember, &token));

    let message = t.outbox.last().unwrap();
    assert_eq!(message.kind, MailKind::AccountActivation);
    assert_eq!(message.to, user.email);
}

#[tokio::test]
async fn test_reset_token_authenticates_and_is_fresh() {
    let t = TestContext::new();
    let user = t.activated_user("reset").await;

    PasswordResetService::new(&t.ctx)
        .request_reset(PasswordResetRequest {
            email: user.email.clone(),
        })
        .await
        .unwrap();
    let token = t.last_mailed_token();
    assert_eq!(t.outbox.last().unwrap().kind, MailKind::PasswordReset);

    let stored = t.user(user.id).await;
    assert!(authenticated(&stored, TokenKind::Reset, &token));
    assert!(!authenticated(&stored, TokenKind::Reset, &generate_token()));
    assert!(!stored.password_reset_expired());
    assert!(stored.password_reset_expired_at(Utc::now() + Duration::hours(2) + Duration::seconds(1)));
}

// ============================================================================
// Activation
// ============================================================================

#[tokio::test]
async fn test_login_requires_activation() {
    let t = TestContext::new();
    let (user, token) = t.signup("pending").await;
    let sessions = SessionService::new(&t.ctx);

    let err = sessions.login(login(&user.email, false)).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::AccountNotActivated)));
    assert_eq!(err.status_code(), 403);

    let auth = AccountService::new(&t.ctx)
        .activate(&token, &user.email)
        .await
        .unwrap();
    assert!(auth.user.activated);
    assert!(auth.message.is_some());

    let outcome = sessions.login(login(&user.email, false)).await.unwrap();
    assert_eq!(outcome.user_id(), user.id);
    assert!(outcome.remember_token.is_none());
}

#[tokio::test]
async fn test_activation_rejects_wrong_token_wrong_email_and_reuse() {
    let t = TestContext::new();
    let (user, token) = t.signup("link").await;
    let accounts = AccountService::new(&t.ctx);

    let err = accounts.activate(&generate_token(), &user.email).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::InvalidActivationLink)));

    let err = accounts.activate(&token, "wrong@example.com").await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::InvalidActivationLink)));
    assert!(!t.user(user.id).await.activated);

    accounts.activate(&token, &user.email.to_uppercase()).await.unwrap();
    let activated = t.user(user.id).await;
    assert!(activated.activated);
    assert!(activated.activated_at.is_some());
    assert!(activated.activation_digest.is_some());

    let err = accounts.activate(&token, &user.email).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::InvalidActivationLink)));
}

#[tokio::test]
async fn test_signup_succeeds_when_mail_fails() {
    let t = TestContext::with_failing_mail();
    let response = AccountService::new(&t.ctx)
        .signup(SignupRequest {
            name: "Unlucky".to_string(),
            email: "unlucky@example.com".to_string(),
            password: TEST_PASSWORD.to_string(),
            password_confirmation: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap();

    let stored = t.user(response.user.id).await;
    assert!(!stored.activated);
    assert!(stored.activation_digest.is_some());
}

#[tokio::test]
async fn test_signup_reports_field_errors() {
    let t = TestContext::new();
    let err = AccountService::new(&t.ctx)
        .signup(SignupRequest {
            name: "   ".to_string(),
            email: "user@example,com".to_string(),
            password: "foo".to_string(),
            password_confirmation: "bar".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    let fields = err.field_errors().unwrap().field_errors();
    assert!(fields.contains_key("name"));
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
    assert!(t.outbox.is_empty());
}

// ============================================================================
// Email uniqueness
// ============================================================================

#[tokio::test]
async fn test_email_uniqueness_ignores_case() {
    let t = TestContext::new();
    let accounts = AccountService::new(&t.ctx);
    let form = |email: &str| SignupRequest {
        name: "Twin".to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        password_confirmation: TEST_PASSWORD.to_string(),
    };

    let first = accounts.signup(form("Twin@Example.com")).await.unwrap();
    assert_eq!(first.user.email, "twin@example.com");

    let err = accounts.signup(form("TWIN@EXAMPLE.COM")).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::EmailAlreadyExists)));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_update_rejects_email_taken_in_other_case() {
    let t = TestContext::new();
    let alice = t.activated_user("alice").await;
    let bob = t.activated_user("bob").await;

    let err = UserService::new(&t.ctx)
        .update_user(
            bob.id,
            bob.id,
            UpdateUserRequest {
                email: Some(alice.email.to_uppercase()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::EmailAlreadyExists)));
}

// ============================================================================
// Login and remember-me
// ============================================================================

#[tokio::test]
async fn test_login_with_remember_me_and_logout() {
    let t = TestContext::new();
    let user = t.activated_user("persistent").await;
    let sessions = SessionService::new(&t.ctx);

    let outcome = sessions.login(login(&user.email, true)).await.unwrap();
    let token = outcome.remember_token.clone().unwrap();
    assert_eq!(outcome.auth.token_type, "Bearer");

    let current = sessions.current_user(&outcome.auth.access_token).await.unwrap();
    assert_eq!(current.id, user.id);

    let restored = sessions.restore(user.id, &token).await.unwrap();
    assert_eq!(restored.user.id, user.id);

    sessions.logout(user.id).await.unwrap();
    assert!(sessions.restore(user.id, &token).await.is_err());
}

#[tokio::test]
async fn test_login_without_remember_me_forgets_previous_token() {
    let t = TestContext::new();
    let user = t.activated_user("forgetful").await;
    let sessions = SessionService::new(&t.ctx);

    let token = sessions.remember(user.id).await.unwrap();
    sessions.login(login(&user.email, false)).await.unwrap();

    assert!(sessions.restore(user.id, &token).await.is_err());
}

#[tokio::test]
async fn test_login_rejects_bad_password_and_unknown_email() {
    let t = TestContext::new();
    let user = t.activated_user("guarded").await;
    let sessions = SessionService::new(&t.ctx);

    let mut bad = login(&user.email, false);
    bad.password = "wrong-password".to_string();
    assert_eq!(sessions.login(bad).await.unwrap_err().status_code(), 401);

    let err = sessions
        .login(login("nobody@example.com", false))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn test_password_reset_flow() {
    let t = TestContext::new();
    let user = t.activated_user("resetter").await;
    let resets = PasswordResetService::new(&t.ctx);

    resets
        .request_reset(PasswordResetRequest {
            email: user.email.to_uppercase(),
        })
        .await
        .unwrap();
    let token = t.last_mailed_token();

    let checked = resets.check_link(&token, &user.email).await.unwrap();
    assert_eq!(checked.id, user.id);

    let err = resets
        .reset(&token, reset_form(&user.email, ""))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let auth = resets
        .reset(&token, reset_form(&user.email, "new-secret"))
        .await
        .unwrap();
    assert_eq!(auth.user.id, user.id);
    assert!(auth.message.is_some());

    let stored = t.user(user.id).await;
    assert!(stored.reset_digest.is_none());
    assert!(stored.reset_sent_at.is_none());

    let err = resets.check_link(&token, &user.email).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::InvalidResetLink)));

    let sessions = SessionService::new(&t.ctx);
    assert!(sessions.login(login(&user.email, false)).await.is_err());
    sessions
        .login(LoginRequest {
            email: user.email.clone(),
            password: "new-secret".to_string(),
            remember_me: false,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_password_reset_expires_after_two_hours() {
    let t = TestContext::new();
    let user = t.activated_user("slow").await;
    let resets = PasswordResetService::new(&t.ctx);

    resets
        .request_reset(PasswordResetRequest {
            email: user.email.clone(),
        })
        .await
        .unwrap();
    let token = t.last_mailed_token();

    let stored = t.user(user.id).await;
    t.users()
        .update_reset_digest(
            user.id,
            stored.reset_digest.as_deref(),
            Some(Utc::now() - Duration::hours(3)),
        )
        .await
        .unwrap();

    let stale = t.user(user.id).await;
    assert!(authenticated(&stale, TokenKind::Reset, &token));
    assert!(stale.password_reset_expired());

    let err = resets.check_link(&token, &user.email).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::PasswordResetExpired)));

    let err = resets
        .reset(&token, reset_form(&user.email, "new-secret"))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::PasswordResetExpired)));
}

#[tokio::test]
async fn test_password_reset_rejects_unknown_email_and_wrong_token() {
    let t = TestContext::new();
    let user = t.activated_user("careful").await;
    let resets = PasswordResetService::new(&t.ctx);

    let err = resets
        .request_reset(PasswordResetRequest {
            email: "missing@example.com".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::EmailNotFound)));
    assert_eq!(err.status_code(), 404);

    resets
        .request_reset(PasswordResetRequest {
            email: user.email.clone(),
        })
        .await
        .unwrap();

    let err = resets
        .check_link(&generate_token(), &user.email)
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::InvalidResetLink)));
}

#[tokio::test]
async fn test_password_reset_link_requires_activated_account() {
    let t = TestContext::new();
    let (user, _) = t.signup("dormant").await;
    let resets = PasswordResetService::new(&t.ctx);

    resets
        .request_reset(PasswordResetRequest {
            email: user.email.clone(),
        })
        .await
        .unwrap();
    let token = t.last_mailed_token();

    let err = resets.check_link(&token, &user.email).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::InvalidResetLink)));
}

// ============================================================================
// Microposts
// ============================================================================

#[tokio::test]
async fn test_micropost_content_bounds() {
    let t = TestContext::new();
    let user = t.activated_user("poster").await;
    let posts = MicropostService::new(&t.ctx);

    for content in ["", "   ", "\n\t"] {
        let err = posts.create(user.id, post(content)).await.unwrap_err();
        assert_eq!(err.status_code(), 400, "content {content:?}");
    }

    let longest = "a".repeat(140);
    let created = posts.create(user.id, post(&longest)).await.unwrap();
    assert_eq!(created.content, longest);

    let err = posts.create(user.id, post(&"a".repeat(141))).await.unwrap_err();
    assert_eq!(err.status_code(), 400);

    assert_eq!(t.store.microposts_referencing(user.id), 1);
}

#[tokio::test]
async fn test_micropost_delete_is_author_only() {
    let t = TestContext::new();
    let author = t.activated_user("author").await;
    let other = t.activated_user("other").await;
    let posts = MicropostService::new(&t.ctx);

    let created = posts.create(author.id, post("mine")).await.unwrap();

    let err = posts.delete(other.id, created.id).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::NotMicropostAuthor)));
    assert_eq!(err.status_code(), 403);

    posts.delete(author.id, created.id).await.unwrap();

    let err = posts.delete(author.id, created.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = posts
        .delete(author.id, MicropostId::new(9_999))
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::MicropostNotFound(_))));
}

#[tokio::test]
async fn test_user_posts_are_newest_first() {
    let t = TestContext::new();
    let user = t.activated_user("chronicler").await;
    let posts = MicropostService::new(&t.ctx);

    for content in ["first", "second", "third"] {
        posts.create(user.id, post(content)).await.unwrap();
    }

    let page = posts.list_for_user(user.id, PageQuery::default()).await.unwrap();
    let contents: Vec<&str> = page.items.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, ["third", "second", "first"]);
    assert_eq!(page.total, 3);

    let window = posts.list_for_user(user.id, PageQuery::new(2, 2)).await.unwrap();
    assert_eq!(window.items.len(), 1);
    assert_eq!(window.items[0].content, "first");
    assert_eq!(window.total_pages, 2);
}

// ============================================================================
// Follow graph and feed
// ============================================================================

#[tokio::test]
async fn test_feed_tracks_follow_graph() {
    let t = TestContext::new();
    let a = t.activated_user("a").await;
    let b = t.activated_user("b").await;
    let c = t.activated_user("c").await;

    let posts = MicropostService::new(&t.ctx);
    let a_post = posts.create(a.id, post("from a")).await.unwrap();
    let b_post = posts.create(b.id, post("from b")).await.unwrap();
    let c_post = posts.create(c.id, post("from c")).await.unwrap();

    let relationships = RelationshipService::new(&t.ctx);
    relationships
        .follow(a.id, FollowRequest { followed_id: Some(b.id) })
        .await
        .unwrap();

    let feed = FeedService::new(&t.ctx);

    let page = feed.feed(a.id, PageQuery::default()).await.unwrap();
    let seen = post_ids(&page);
    assert!(seen.contains(&a_post.id));
    assert!(seen.contains(&b_post.id));
    assert!(!seen.contains(&c_post.id));
    assert_eq!(seen, [b_post.id, a_post.id]);
    assert_eq!(page.total, 2);

    relationships.unfollow(a.id, b.id).await.unwrap();

    let seen = post_ids(&feed.feed(a.id, PageQuery::default()).await.unwrap());
    assert_eq!(seen, [a_post.id]);
}

#[tokio::test]
async fn test_follow_is_idempotent_and_unfollow_tolerates_absence() {
    let t = TestContext::new();
    let a = t.activated_user("fan").await;
    let b = t.activated_user("star").await;
    let relationships = RelationshipService::new(&t.ctx);

    let first = relationships
        .follow(a.id, FollowRequest { followed_id: Some(b.id) })
        .await
        .unwrap();
    let second = relationships
        .follow(a.id, FollowRequest { followed_id: Some(b.id) })
        .await
        .unwrap();
    assert!(first.following && second.following);
    assert_eq!(second.followers_count, 1);
    assert!(relationships.is_following(a.id, b.id).await.unwrap());
    assert!(!relationships.is_following(b.id, a.id).await.unwrap());

    let users = UserService::new(&t.ctx);
    let following = users.following(a.id, PageQuery::default()).await.unwrap();
    assert_eq!(following.items.len(), 1);
    assert_eq!(following.items[0].id, b.id);
    let followers = users.followers(b.id, PageQuery::default()).await.unwrap();
    assert_eq!(followers.items[0].id, a.id);

    let gone = relationships.unfollow(a.id, b.id).await.unwrap();
    assert!(!gone.following);
    assert_eq!(gone.followers_count, 0);

    let again = relationships.unfollow(a.id, b.id).await.unwrap();
    assert!(!again.following);
}

#[tokio::test]
async fn test_follow_rejects_self_and_missing_users() {
    let t = TestContext::new();
    let a = t.activated_user("loner").await;
    let relationships = RelationshipService::new(&t.ctx);

    let err = relationships
        .follow(a.id, FollowRequest { followed_id: Some(a.id) })
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::CannotFollowSelf)));
    assert_eq!(err.status_code(), 400);

    let err = relationships
        .follow(
            a.id,
            FollowRequest {
                followed_id: Some(UserId::new(9_999)),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = relationships
        .follow(a.id, FollowRequest { followed_id: None })
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::ValidationError(_))));
    assert_eq!(err.status_code(), 400);
    assert_eq!(t.store.edges_touching(a.id), 0);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_destroying_user_removes_all_their_microposts() {
    for n in [0_usize, 1, 7] {
        let t = TestContext::new();
        let admin = t.admin_user("admin").await;
        let victim = t.activated_user("victim").await;
        let bystander = t.activated_user("bystander").await;

        let posts = MicropostService::new(&t.ctx);
        for i in 0..n {
            posts
                .create(victim.id, post(&format!("post {i}")))
                .await
                .unwrap();
        }
        let kept = posts.create(bystander.id, post("still here")).await.unwrap();

        let relationships = RelationshipService::new(&t.ctx);
        relationships
            .follow(bystander.id, FollowRequest { followed_id: Some(victim.id) })
            .await
            .unwrap();
        relationships
            .follow(victim.id, FollowRequest { followed_id: Some(bystander.id) })
            .await
            .unwrap();
        assert_eq!(t.store.microposts_referencing(victim.id), n);

        UserService::new(&t.ctx)
            .delete_user(admin.id, victim.id)
            .await
            .unwrap();

        assert_eq!(t.store.microposts_referencing(victim.id), 0, "n = {n}");
        assert_eq!(t.store.edges_touching(victim.id), 0, "n = {n}");
        assert_eq!(t.store.microposts_referencing(bystander.id), 1);

        let feed = FeedService::new(&t.ctx)
            .feed(bystander.id, PageQuery::default())
            .await
            .unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].id, kept.id);
    }
}

#[tokio::test]
async fn test_delete_user_requires_admin_and_forbids_self() {
    let t = TestContext::new();
    let admin = t.admin_user("boss").await;
    let user = t.activated_user("member").await;
    let users = UserService::new(&t.ctx);

    let err = users.delete_user(user.id, admin.id).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::NotAdmin)));

    let err = users.delete_user(admin.id, admin.id).await.unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::CannotDeleteSelf)));

    let err = users
        .delete_user(admin.id, UserId::new(9_999))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_update_user_is_owner_only_and_changes_password() {
    let t = TestContext::new();
    let owner = t.activated_user("owner").await;
    let intruder = t.activated_user("intruder").await;
    let users = UserService::new(&t.ctx);

    let err = users
        .update_user(
            intruder.id,
            owner.id,
            UpdateUserRequest {
                name: Some("Hacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(&err), Some(DomainError::NotAccountOwner)));

    let updated = users
        .update_user(
            owner.id,
            owner.id,
            UpdateUserRequest {
                name: Some("  Renamed  ".to_string()),
                password: Some("changed".to_string()),
                password_confirmation: Some("changed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(t.user(owner.id).await.name, "Renamed");

    SessionService::new(&t.ctx)
        .login(LoginRequest {
            email: owner.email.clone(),
            password: "changed".to_string(),
            remember_me: false,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unactivated_users_are_hidden() {
    let t = TestContext::new();
    let visible = t.activated_user("visible").await;
    let (hidden, _) = t.signup("hidden").await;
    let users = UserService::new(&t.ctx);

    let page = users.list_users(PageQuery::default()).await.unwrap();
    let ids: Vec<UserId> = page.items.iter().map(|u| u.id).collect();
    assert_eq!(ids, [visible.id]);
    assert_eq!(page.total, 1);

    let profile = users.get_profile(visible.id).await.unwrap();
    assert_eq!(profile.user.id, visible.id);
    assert_eq!(profile.microposts_count, 0);

    let err = users.get_profile(hidden.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}
