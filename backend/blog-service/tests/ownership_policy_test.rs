//! Ownership and role scenarios exercised through the services
//!
//! Run with:
//!   cargo test -p blog-service --test ownership_policy_test

mod common;

use blog_service::models::{
    ArticleDto, BlogDto, CommentDto, LoginDto, PasswordDto, TagDto, UserDto,
};
use blog_service::AppError;
use common::*;

#[tokio::test]
async fn test_blog_delete_requires_owner() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let bob = regular_user(&services, "bob").await;
    let blog = blog(&services, &alice, "Alice writes").await;
    let blog_id = blog.id.unwrap();

    let err = services
        .blogs
        .delete_blog(blog_id, bob.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {:?}", err);

    services
        .blogs
        .delete_blog(blog_id, alice.token())
        .await
        .unwrap();

    let err = services.blogs.get_blog_by_id(blog_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_staff_cannot_delete_or_rename_foreign_blogs() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let moderator = moderator(&services, "mod").await;
    let admin = admin(&services).await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();

    for actor in [&moderator, &admin] {
        let err = services
            .blogs
            .delete_blog(blog_id, actor.token())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = services
            .blogs
            .update_blog_name(
                blog_id,
                BlogDto {
                    name: Some("Taken over".to_string()),
                    ..Default::default()
                },
                actor.token(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

#[tokio::test]
async fn test_missing_blog_is_not_found_before_token_is_checked() {
    let services = services().await;

    let err = services.blogs.delete_blog(9999, None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    let err = services.blogs.delete_blog(blog_id, None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken(_)));

    let err = services
        .blogs
        .delete_blog(blog_id, Some("Bearer garbage"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidToken(_)));
}

#[tokio::test]
async fn test_moderator_deletes_article_but_cannot_edit_it() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let moderator = moderator(&services, "mod").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    let article_id = article(&services, &alice, blog_id, "First", &[])
        .await
        .id
        .unwrap();

    let err = services
        .articles
        .update_article(
            article_id,
            ArticleDto {
                name: Some("Edited".to_string()),
                content: Some("By a moderator".to_string()),
                ..Default::default()
            },
            moderator.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    services
        .articles
        .delete_article(article_id, moderator.token())
        .await
        .unwrap();

    let err = services
        .articles
        .get_article_by_id(article_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_regular_user_cannot_publish_in_foreign_blog() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let bob = regular_user(&services, "bob").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();

    let err = services
        .articles
        .create_article(
            ArticleDto {
                name: Some("Intruder".to_string()),
                content: Some("Should not land".to_string()),
                blog_id: Some(blog_id),
                ..Default::default()
            },
            bob.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(services.articles.get_all_articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_rules_follow_author_and_staff() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let bob = regular_user(&services, "bob").await;
    let moderator = moderator(&services, "mod").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    let article_id = article(&services, &alice, blog_id, "First", &[])
        .await
        .id
        .unwrap();

    let first = comment(&services, &bob, article_id, "Nice").await;
    assert_eq!(first.creator_id, Some(bob.id));
    assert_eq!(first.creator_username.as_deref(), Some("bob"));

    // The article owner is not the comment author
    let err = services
        .comments
        .update_comment(
            first.id.unwrap(),
            CommentDto {
                content: Some("Rewritten".to_string()),
                ..Default::default()
            },
            alice.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated = services
        .comments
        .update_comment(
            first.id.unwrap(),
            CommentDto {
                content: Some("Very nice".to_string()),
                ..Default::default()
            },
            bob.token(),
        )
        .await
        .unwrap();
    assert_eq!(updated.content.as_deref(), Some("Very nice"));

    services
        .comments
        .delete_comment(first.id.unwrap(), moderator.token())
        .await
        .unwrap();
    assert!(services
        .articles
        .get_comments_by_article_id(article_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_comment_on_missing_article_is_not_found() {
    let services = services().await;
    let bob = regular_user(&services, "bob").await;

    let err = services
        .comments
        .add_comment(
            CommentDto {
                content: Some("Hello?".to_string()),
                article_id: Some(404),
                ..Default::default()
            },
            bob.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_tag_filter_returns_union_without_duplicates() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();

    let both = article(&services, &alice, blog_id, "Both", &["rust", "web"]).await;
    let rust = article(&services, &alice, blog_id, "Rust only", &["rust"]).await;
    let web = article(&services, &alice, blog_id, "Web only", &["web"]).await;
    article(&services, &alice, blog_id, "Untagged", &[]).await;

    let found = services
        .articles
        .get_articles_with_tag_filter("rust,web")
        .await
        .unwrap();
    let mut ids: Vec<i64> = found.iter().filter_map(|a| a.id).collect();
    ids.sort_unstable();

    let mut expected = vec![both.id.unwrap(), rust.id.unwrap(), web.id.unwrap()];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    let rust_only = services
        .articles
        .get_articles_with_tags(&[TagDto::named("rust")])
        .await
        .unwrap();
    assert_eq!(rust_only.len(), 2);
}

#[tokio::test]
async fn test_unknown_tag_is_not_found() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    article(&services, &alice, blog_id, "Tagged", &["rust"]).await;

    let err = services
        .articles
        .get_articles_with_tag_filter("nonexistent")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services
        .articles
        .get_articles_with_tag_filter("rust,nonexistent")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_tags_are_shared_between_articles() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();

    let first = article(&services, &alice, blog_id, "One", &["rust"]).await;
    let second = article(&services, &alice, blog_id, "Two", &[" rust ", "rust"]).await;

    let all_tags = services.tags.get_all_tags().await.unwrap();
    assert_eq!(all_tags.len(), 1);

    let first_tags = first.tags.unwrap();
    let second_tags = second.tags.unwrap();
    assert_eq!(first_tags, second_tags);
    assert_eq!(first_tags[0].name.as_deref(), Some("rust"));
}

#[tokio::test]
async fn test_text_filter_is_case_sensitive() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    article(&services, &alice, blog_id, "Ownership in Rust", &[]).await;
    article(&services, &alice, blog_id, "Gardening", &[]).await;

    let hits = services
        .articles
        .get_articles_with_text_filter("Rust")
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let misses = services
        .articles
        .get_articles_with_text_filter("rust")
        .await
        .unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn test_wrong_old_password_keeps_the_old_one() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;

    let err = services
        .accounts
        .change_password(
            alice.id,
            PasswordDto {
                old_password: Some("NotMine1".to_string()),
                new_password: Some("Changed123".to_string()),
            },
            alice.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    login(&services, "alice", PASSWORD).await;

    services
        .accounts
        .change_password(
            alice.id,
            PasswordDto {
                old_password: Some(PASSWORD.to_string()),
                new_password: Some("Changed123".to_string()),
            },
            alice.token(),
        )
        .await
        .unwrap();

    let err = services
        .auth
        .authenticate(LoginDto {
            user_name: "alice".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
    login(&services, "alice@example.com", "Changed123").await;
}

#[tokio::test]
async fn test_nobody_changes_another_users_password() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let admin = admin(&services).await;

    let err = services
        .accounts
        .change_password(
            alice.id,
            PasswordDto {
                old_password: Some(PASSWORD.to_string()),
                new_password: Some("Changed123".to_string()),
            },
            admin.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_moderator_reads_regular_users_only() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let other = moderator(&services, "mod2").await;
    let moderator = moderator(&services, "mod").await;
    let admin = admin(&services).await;

    let profile = services
        .accounts
        .get_user_by_id(alice.id, moderator.token())
        .await
        .unwrap();
    assert_eq!(profile.user_name.as_deref(), Some("alice"));

    let err = services
        .accounts
        .get_user_by_id(other.id, moderator.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = services
        .accounts
        .get_user_by_id(admin.id, moderator.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Regular users see only themselves
    let err = services
        .accounts
        .get_user_by_id(moderator.id, alice.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    services
        .accounts
        .get_user_by_id(alice.id, alice.token())
        .await
        .unwrap();

    services
        .accounts
        .get_user_by_id(other.id, admin.token())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_only_admin_registers_moderators() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let moderator = moderator(&services, "mod").await;

    for actor in [&alice, &moderator] {
        let err = services
            .accounts
            .register_moderator(user_dto("sneaky"), actor.token())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    let listed = services.accounts.get_all_moderators().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_user_listing_excludes_admins() {
    let services = services().await;
    regular_user(&services, "alice").await;
    moderator(&services, "mod").await;

    let users = services.accounts.get_all_users().await.unwrap();
    let names: Vec<_> = users.iter().filter_map(|u| u.user_name.as_deref()).collect();
    assert_eq!(names, vec!["alice", "mod"]);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let services = services().await;
    regular_user(&services, "alice").await;

    let err = services
        .accounts
        .register_regular_user(user_dto("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let mut weak = user_dto("carol");
    weak.password = Some("weak".to_string());
    let err = services
        .accounts
        .register_regular_user(weak)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_registrations_admit_one() {
    let services = services().await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let accounts = services.accounts.clone();
            tokio::spawn(async move { accounts.register_regular_user(user_dto("dup")).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err),
        }
    }
    assert_eq!(created, 1);

    let dups = services
        .accounts
        .get_all_regular_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.user_name.as_deref() == Some("dup"))
        .count();
    assert_eq!(dups, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_articles_share_a_new_tag() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let articles = services.articles.clone();
            let token = alice.token.clone();
            tokio::spawn(async move {
                let dto = ArticleDto {
                    name: Some(format!("Post {}", i)),
                    content: Some("body".to_string()),
                    blog_id: Some(blog_id),
                    tags: Some(vec![TagDto::named("fresh")]),
                    ..Default::default()
                };
                articles.create_article(dto, Some(token.as_str())).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let tags = services.tags.get_all_tags().await.unwrap();
    let fresh: Vec<_> = tags
        .iter()
        .filter(|t| t.name.as_deref() == Some("fresh"))
        .collect();
    assert_eq!(fresh.len(), 1);

    let tagged = services
        .articles
        .get_articles_with_tag_filter("fresh")
        .await
        .unwrap();
    assert_eq!(tagged.len(), 4);
}

#[tokio::test]
async fn test_admin_deletes_user_and_their_content() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let bob = regular_user(&services, "bob").await;
    let moderator = moderator(&services, "mod").await;
    let admin = admin(&services).await;

    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    let article_id = article(&services, &alice, blog_id, "First", &["rust"])
        .await
        .id
        .unwrap();
    let bob_blog = blog(&services, &bob, "Bob writes").await.id.unwrap();
    let bob_article = article(&services, &bob, bob_blog, "Bob's", &[])
        .await
        .id
        .unwrap();
    comment(&services, &alice, bob_article, "From alice").await;
    comment(&services, &bob, article_id, "From bob").await;

    let err = services
        .accounts
        .delete_user(alice.id, moderator.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    services
        .accounts
        .delete_user(alice.id, admin.token())
        .await
        .unwrap();

    let err = services
        .accounts
        .get_user_by_id(alice.id, admin.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(matches!(
        services.blogs.get_blog_by_id(blog_id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        services.articles.get_article_by_id(article_id).await.unwrap_err(),
        AppError::NotFound(_)
    ));

    // Alice's comment on Bob's article is gone, Bob's content survives
    assert!(services
        .articles
        .get_comments_by_article_id(bob_article)
        .await
        .unwrap()
        .is_empty());
    assert!(services
        .accounts
        .get_all_comments_by_user_id(bob.id)
        .await
        .unwrap()
        .is_empty());
    services.blogs.get_blog_by_id(bob_blog).await.unwrap();

    // Tags outlive the articles that used them
    assert_eq!(services.tags.get_all_tags().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_users_delete_themselves() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;

    services
        .accounts
        .delete_user(alice.id, alice.token())
        .await
        .unwrap();

    let err = services
        .auth
        .authenticate(LoginDto {
            user_name: "alice".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_blog_detail_lists_articles_with_author() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    article(&services, &alice, blog_id, "First", &[]).await;
    article(&services, &alice, blog_id, "Second", &[]).await;

    let blog = services.blogs.get_blog_by_id(blog_id).await.unwrap();
    assert_eq!(blog.owner_username.as_deref(), Some("alice"));

    let articles = blog.articles.unwrap();
    assert_eq!(articles.len(), 2);
    assert!(articles
        .iter()
        .all(|a| a.author_username.as_deref() == Some("alice")));

    let blogs = services
        .accounts
        .get_all_blogs_by_user_id(alice.id)
        .await
        .unwrap();
    assert_eq!(blogs.len(), 1);
}

#[tokio::test]
async fn test_blog_names_are_unique() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let bob = regular_user(&services, "bob").await;
    blog(&services, &alice, "Shared name").await;

    let err = services
        .blogs
        .create_blog(
            BlogDto {
                name: Some("Shared name".to_string()),
                ..Default::default()
            },
            bob.token(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_profile_update_is_self_only_and_checks_conflicts() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    regular_user(&services, "bob").await;
    let admin = admin(&services).await;

    let rename = UserDto {
        user_name: Some("alicia".to_string()),
        email: Some("alicia@example.com".to_string()),
        ..Default::default()
    };

    let err = services
        .accounts
        .update_user(alice.id, rename.clone(), admin.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let taken = UserDto {
        user_name: Some("bob".to_string()),
        ..Default::default()
    };
    let err = services
        .accounts
        .update_user(alice.id, taken, alice.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let updated = services
        .accounts
        .update_user(alice.id, rename, alice.token())
        .await
        .unwrap();
    assert_eq!(updated.user_name.as_deref(), Some("alicia"));
    assert_eq!(updated.email.as_deref(), Some("alicia@example.com"));

    login(&services, "alicia", PASSWORD).await;

    let blank = UserDto {
        user_name: Some("   ".to_string()),
        ..Default::default()
    };
    let err = services
        .accounts
        .update_user(alice.id, blank, alice.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)), "got {:?}", err);
    login(&services, "alicia", PASSWORD).await;

    let err = services
        .accounts
        .update_user(alice.id, UserDto::default(), alice.token())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_comment_listings_carry_creator_usernames() {
    let services = services().await;
    let alice = regular_user(&services, "alice").await;
    let bob = regular_user(&services, "bob").await;
    let blog_id = blog(&services, &alice, "Alice writes").await.id.unwrap();
    let article_id = article(&services, &alice, blog_id, "First", &[])
        .await
        .id
        .unwrap();
    let first = comment(&services, &bob, article_id, "First!").await;
    comment(&services, &alice, article_id, "Thanks").await;

    let all = services.comments.get_all_comments().await.unwrap();
    let creators: Vec<_> = all
        .iter()
        .filter_map(|c| c.creator_username.as_deref())
        .collect();
    assert_eq!(creators, vec!["bob", "alice"]);

    let fetched = services
        .comments
        .get_comment_by_id(first.id.unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.creator_username.as_deref(), Some("bob"));

    let bobs = services
        .accounts
        .get_all_comments_by_user_id(bob.id)
        .await
        .unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].content.as_deref(), Some("First!"));
}
